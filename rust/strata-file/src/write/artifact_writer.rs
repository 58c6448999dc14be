//! A position-tracking writer over a storage artifact.

use std::ops::Range;

use strata_format::defs::{footer::FileFooter, footer_ext::encode_trailer};
use strata_io::{SealingWrite, StorageProfile};

/// Appends data to a storage artifact, tracking the current write position.
///
/// The writer never seals the underlying `SealingWrite`: committing the
/// object is the caller's responsibility once the file is complete (see
/// [`into_inner`](Self::into_inner)).
pub struct ArtifactWriter<W> {
    inner: W,
    pos: u64,
}

impl<W: SealingWrite> ArtifactWriter<W> {
    pub fn new(inner: W) -> ArtifactWriter<W> {
        ArtifactWriter { inner, pos: 0 }
    }

    /// Returns the current position of the writer.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Appends the entire buffer, returning the range it occupies in the
    /// artifact.
    pub fn write_all(&mut self, buf: &[u8]) -> std::io::Result<Range<u64>> {
        let start = self.pos;
        self.inner.write_all(buf)?;
        self.pos += buf.len() as u64;
        Ok(start..self.pos)
    }

    /// Appends the footer (message and checksum) followed by the trailer.
    ///
    /// Returns the range of the footer, excluding the trailer.
    pub fn write_footer(&mut self, footer: &FileFooter) -> std::io::Result<Range<u64>> {
        let buf = footer.encode_with_checksum();
        let footer_len = u32::try_from(buf.len()).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("footer of {} bytes exceeds the trailer limit", buf.len()),
            )
        })?;
        let range = self.write_all(&buf)?;
        self.write_all(&encode_trailer(footer_len))?;
        Ok(range)
    }

    pub fn storage_profile(&self) -> StorageProfile {
        self.inner.storage_profile()
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
