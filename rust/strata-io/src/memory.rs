//! Memory buffers as storage artifacts.
//!
//! `Vec<u8>` is both a `SealingWrite` target and a `ReadAt` source, which is
//! how files are built and read back without touching storage. `Bytes` reads
//! are zero-copy slices.

use std::ops::Range;

use bytes::Bytes;

use crate::{ReadAt, SealingWrite, StorageProfile, utils::clamp_range, verify};

/// Resolves `range` against a buffer of `len` bytes.
fn buffer_range(range: Range<u64>, len: usize) -> std::io::Result<Range<usize>> {
    verify!(range.end >= range.start);
    let range = clamp_range(range, len as u64);
    Ok(range.start as usize..range.end as usize)
}

/// Memory reads have no per-request cost.
fn buffer_profile(len: usize) -> StorageProfile {
    StorageProfile {
        min_io_size: 1,
        max_io_size: len.clamp(1, StorageProfile::default().max_io_size),
    }
}

impl ReadAt for Bytes {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes> {
        Ok(self.slice(buffer_range(range, self.len())?))
    }

    fn storage_profile(&self) -> StorageProfile {
        buffer_profile(self.len())
    }
}

impl ReadAt for Vec<u8> {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes> {
        let range = buffer_range(range, self.len())?;
        Ok(Bytes::copy_from_slice(&self[range]))
    }

    fn storage_profile(&self) -> StorageProfile {
        buffer_profile(self.len())
    }
}

impl SealingWrite for Vec<u8> {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.extend_from_slice(buf);
        Ok(())
    }

    /// A memory buffer is visible as soon as it is written; sealing is a
    /// no-op.
    fn seal(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn storage_profile(&self) -> StorageProfile {
        buffer_profile(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use crate::{ReadAt, SealingWrite};

    #[test]
    fn test_buffer_as_artifact() {
        let mut artifact = Vec::<u8>::new();
        artifact.write_all(b"row-group").unwrap();
        artifact.write_all(&[]).unwrap();
        artifact.write_all(b"footer").unwrap();
        artifact.seal().unwrap();

        let source: Arc<dyn ReadAt> = Arc::new(artifact);
        assert_eq!(source.size().unwrap(), 15);
        assert_eq!(&source.read_at(9..15).unwrap()[..], b"footer");
        assert_eq!(&source.read_at(4..1000).unwrap()[..], b"groupfooter");
        assert!(source.read_at(15..20).unwrap().is_empty());
        assert_eq!(source.storage_profile().min_io_size, 1);
    }

    #[test]
    fn test_bytes_reads_are_slices() {
        let data = Bytes::from_static(b"0123456789");
        let slice = data.read_at(2..6).unwrap();
        assert_eq!(&slice[..], b"2345");
        assert_eq!(slice.as_ptr(), data[2..].as_ptr());
        assert_eq!(data.storage_profile().max_io_size, 10);
    }

    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn test_reversed_range_is_rejected() {
        let err = b"abcd".to_vec().read_at(3..1).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(Bytes::from_static(b"abcd").read_at(3..1).is_err());
    }
}
