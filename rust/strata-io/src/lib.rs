//! Storage I/O abstractions used by the Strata file writer and reader:
//! - `ReadAt`: positional reader able to fetch a byte range from an object
//!   (a local file, an in-memory buffer or a remote blob).
//! - `SealingWrite`: sequential append-only writer with a `seal()` operation
//!   that commits the object and makes it visible to readers.
//!
//! Provides simple memory-based and file-based implementations, and a
//! suffix-caching reader wrapper used when opening files.

use std::{ops::Range, sync::Arc};

use bytes::Bytes;

pub mod file;
pub mod memory;
pub mod precached_read;
pub mod utils;

pub use precached_read::PrecachedReadAt;

/// A storage object (local file, memory buffer, remote blob) readable at
/// arbitrary offsets.
pub trait ReadAt: Send + Sync + 'static {
    /// Size of the object in bytes.
    fn size(&self) -> std::io::Result<u64>;

    /// Fetches `range` of the object.
    ///
    /// The part of `range` past the end of the object is dropped, so the
    /// result is shorter than requested only at end-of-object. A reversed
    /// range is an `InvalidInput` error.
    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes>;

    fn storage_profile(&self) -> StorageProfile;
}

/// Append-only writer of a storage object that becomes visible on `seal`.
///
/// Readers must not rely on anything appended with
/// [`write_all`](SealingWrite::write_all) before [`seal`](SealingWrite::seal)
/// returns: a remote store completes its multipart upload there, a local
/// file is flushed and synced.
///
/// `&mut self` receivers make a writer single-owner; implementations need
/// [`Send`] but not [`Sync`].
pub trait SealingWrite: Send {
    /// Appends `buf` in full or fails. After a failure the writer is
    /// poisoned and later calls, `seal()` included, fail too.
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()>;

    /// Commits the object. A sealed writer rejects further writes.
    fn seal(&mut self) -> std::io::Result<()>;

    fn storage_profile(&self) -> StorageProfile;
}

/// Request sizing hints of a storage backend.
#[derive(Debug, Clone)]
pub struct StorageProfile {
    /// Requests below this size mostly pay for the round trip.
    pub min_io_size: usize,

    /// Largest request worth issuing at once.
    pub max_io_size: usize,
}

impl StorageProfile {
    /// Brings `size` within `min_io_size..=max_io_size`. Both bounds are at
    /// least 1, and a minimum above the maximum is lowered to it.
    pub fn clamp_io_size(&self, size: usize) -> usize {
        let min = self.min_io_size.max(1).min(self.max_io_size.max(1));
        let max = self.max_io_size.max(min);
        size.clamp(min, max)
    }
}

impl Default for StorageProfile {
    fn default() -> StorageProfile {
        Self {
            min_io_size: 4 * 1024,
            max_io_size: 4 * 1024 * 1024,
        }
    }
}

impl<T> ReadAt for Arc<T>
where
    T: ReadAt + ?Sized,
{
    fn size(&self) -> std::io::Result<u64> {
        self.as_ref().size()
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes> {
        self.as_ref().read_at(range)
    }

    fn storage_profile(&self) -> StorageProfile {
        self.as_ref().storage_profile()
    }
}

impl<T> SealingWrite for Box<T>
where
    T: SealingWrite + ?Sized,
{
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.as_mut().write_all(buf)
    }

    fn seal(&mut self) -> std::io::Result<()> {
        self.as_mut().seal()
    }

    fn storage_profile(&self) -> StorageProfile {
        self.as_ref().storage_profile()
    }
}

impl<T> SealingWrite for &mut T
where
    T: SealingWrite + ?Sized,
{
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        (**self).write_all(buf)
    }

    fn seal(&mut self) -> std::io::Result<()> {
        (**self).seal()
    }

    fn storage_profile(&self) -> StorageProfile {
        (**self).storage_profile()
    }
}

#[cfg(test)]
mod tests {
    use super::StorageProfile;

    #[test]
    fn test_clamp_io_size() {
        let profile = StorageProfile {
            min_io_size: 1024,
            max_io_size: 8192,
        };
        assert_eq!(profile.clamp_io_size(10), 1024);
        assert_eq!(profile.clamp_io_size(4000), 4000);
        assert_eq!(profile.clamp_io_size(100_000), 8192);

        let degenerate = StorageProfile {
            min_io_size: 0,
            max_io_size: 0,
        };
        assert_eq!(degenerate.clamp_io_size(0), 1);
    }
}
