//! Local file artifacts.
//!
//! [`FileWriter`] creates a new file and appends to it through a buffer;
//! sealing flushes and syncs it. [`FileReader`] serves positional reads of an
//! existing file.

use std::{
    fs::File,
    io::{BufWriter, Write},
    ops::Range,
    path::Path,
};

use bytes::{Bytes, BytesMut};

use crate::{ReadAt, SealingWrite, StorageProfile, utils::clamp_range, verify};

/// Positional reader over a local file.
///
/// The file size is captured on open; a file that grows afterwards is still
/// read as its original length.
pub struct FileReader {
    file: File,
    len: u64,
}

impl FileReader {
    pub fn new(file: File) -> std::io::Result<FileReader> {
        let len = file.metadata()?.len();
        Ok(FileReader { file, len })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<FileReader> {
        FileReader::new(File::open(path)?)
    }

    #[cfg(unix)]
    fn fill(&self, pos: u64, buf: &mut [u8]) -> std::io::Result<()> {
        use std::os::unix::fs::FileExt;

        self.file.read_exact_at(buf, pos)
    }

    #[cfg(windows)]
    fn fill(&self, mut pos: u64, mut buf: &mut [u8]) -> std::io::Result<()> {
        use std::os::windows::fs::FileExt;

        while !buf.is_empty() {
            let n = self.file.seek_read(buf, pos)?;
            if n == 0 {
                return Err(std::io::ErrorKind::UnexpectedEof.into());
            }
            buf = &mut buf[n..];
            pos += n as u64;
        }
        Ok(())
    }
}

impl ReadAt for FileReader {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.len)
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes> {
        verify!(range.end >= range.start);
        let range = clamp_range(range, self.len);
        let mut buf = BytesMut::zeroed((range.end - range.start) as usize);
        if !buf.is_empty() {
            self.fill(range.start, &mut buf)?;
        }
        Ok(buf.freeze())
    }

    fn storage_profile(&self) -> StorageProfile {
        StorageProfile {
            min_io_size: 16 * 1024,
            max_io_size: 1024 * 1024,
        }
    }
}

/// Writer of a new local file.
///
/// Creation fails if the file exists. The file is complete on disk only once
/// [`seal`](SealingWrite::seal) returns.
pub struct FileWriter {
    out: Option<BufWriter<File>>,
}

impl FileWriter {
    pub fn new(file: File) -> FileWriter {
        FileWriter {
            out: Some(BufWriter::with_capacity(256 * 1024, file)),
        }
    }

    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<FileWriter> {
        Ok(FileWriter::new(File::create_new(path)?))
    }

    fn out(&mut self) -> std::io::Result<&mut BufWriter<File>> {
        self.out
            .as_mut()
            .ok_or_else(|| std::io::Error::other("file is sealed"))
    }
}

impl SealingWrite for FileWriter {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.out()?.write_all(buf)
    }

    fn seal(&mut self) -> std::io::Result<()> {
        self.out()?;
        if let Some(out) = self.out.take() {
            let file = out.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        Ok(())
    }

    fn storage_profile(&self) -> StorageProfile {
        StorageProfile::default()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ReadAt, SealingWrite,
        file::{FileReader, FileWriter},
    };

    #[test]
    fn test_sealed_file_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part-0.strata");
        let mut writer = FileWriter::create(&path).unwrap();
        writer.write_all(b"group-0|").unwrap();
        writer.write_all(b"group-1|").unwrap();
        writer.write_all(b"footer").unwrap();
        writer.seal().unwrap();

        let reader = FileReader::open(&path).unwrap();
        assert_eq!(reader.size().unwrap(), 22);
        assert_eq!(reader.read_at(8..15).unwrap().as_ref(), b"group-1");
        assert_eq!(reader.read_at(16..64).unwrap().as_ref(), b"footer");
        assert!(reader.read_at(22..30).unwrap().is_empty());
    }

    #[test]
    fn test_sealed_writer_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileWriter::create(dir.path().join("sealed.strata")).unwrap();
        writer.seal().unwrap();
        assert!(writer.write_all(b"late").is_err());
        assert!(writer.seal().is_err());
    }

    #[test]
    fn test_create_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("existing.strata");
        std::fs::write(&path, b"STR1").unwrap();
        let err = FileWriter::create(&path).err().unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&path).unwrap(), b"STR1");
    }
}
