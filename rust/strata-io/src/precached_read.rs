//! Suffix caching for the open path of the file reader.

use std::ops::Range;

use bytes::Bytes;

use crate::{ReadAt, StorageProfile, utils::clamp_range};

/// Wraps a reader and keeps the last bytes of its object in memory.
///
/// Opening a Strata file reads the trailer and then the footer, both at the
/// tail of the object. With a suffix that covers them, the open costs a
/// single request against the wrapped reader. Reads that are not fully
/// inside the suffix go to the wrapped reader.
pub struct PrecachedReadAt<R> {
    inner: R,
    size: u64,
    suffix_start: u64,
    suffix: Bytes,
}

impl<R: ReadAt> PrecachedReadAt<R> {
    /// Reads the last `suffix_size` bytes of `inner`, or the whole object if
    /// it is shorter. A zero `suffix_size` caches nothing.
    pub fn from_suffix(inner: R, suffix_size: u64) -> std::io::Result<Self> {
        let size = inner.size()?;
        let suffix_start = size.saturating_sub(suffix_size);
        let suffix = if suffix_start < size {
            inner.read_at(suffix_start..size)?
        } else {
            Bytes::new()
        };
        log::trace!("cached {} tail bytes of a {size} byte object", suffix.len());
        Ok(PrecachedReadAt {
            inner,
            size,
            suffix_start,
            suffix,
        })
    }

    pub fn object_size(&self) -> u64 {
        self.size
    }

    /// Object range held in memory.
    pub fn precached_range(&self) -> Range<u64> {
        self.suffix_start..self.suffix_start + self.suffix.len() as u64
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn covers_object(&self) -> bool {
        self.suffix.len() as u64 == self.size
    }
}

impl<R: ReadAt> ReadAt for PrecachedReadAt<R> {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.size)
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes> {
        let range = clamp_range(range, self.size);
        if range.is_empty() {
            return Ok(Bytes::new());
        }
        match range.start.checked_sub(self.suffix_start) {
            Some(rel) if range.end <= self.precached_range().end => {
                let len = range.end - range.start;
                Ok(self.suffix.slice(rel as usize..(rel + len) as usize))
            }
            _ => self.inner.read_at(range),
        }
    }

    fn storage_profile(&self) -> StorageProfile {
        if self.covers_object() {
            StorageProfile {
                min_io_size: 1,
                ..StorageProfile::default()
            }
        } else {
            self.inner.storage_profile()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        ops::Range,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use bytes::Bytes;

    use super::PrecachedReadAt;
    use crate::{ReadAt, StorageProfile};

    /// Records every range requested from the underlying object.
    struct RecordingReader {
        data: Bytes,
        requests: Mutex<Vec<Range<u64>>>,
        sizes: AtomicUsize,
    }

    impl RecordingReader {
        fn new(len: usize) -> Arc<RecordingReader> {
            Arc::new(RecordingReader {
                data: (0..len).map(|i| (i % 251) as u8).collect::<Vec<_>>().into(),
                requests: Mutex::new(Vec::new()),
                sizes: AtomicUsize::new(0),
            })
        }

        fn requests(&self) -> Vec<Range<u64>> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl ReadAt for RecordingReader {
        fn size(&self) -> std::io::Result<u64> {
            self.sizes.fetch_add(1, Ordering::Relaxed);
            Ok(self.data.len() as u64)
        }

        fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes> {
            self.requests.lock().unwrap().push(range.clone());
            self.data.read_at(range)
        }

        fn storage_profile(&self) -> StorageProfile {
            StorageProfile::default()
        }
    }

    #[test]
    fn test_trailer_and_footer_from_one_request() {
        let object = RecordingReader::new(4096);
        let reader = PrecachedReadAt::from_suffix(object.clone(), 1024).unwrap();
        assert_eq!(reader.precached_range(), 3072..4096);

        // Trailer, then a footer located through it.
        let trailer = reader.read_at(4088..4096).unwrap();
        assert_eq!(trailer, object.data.slice(4088..));
        let footer = reader.read_at(3500..4088).unwrap();
        assert_eq!(footer, object.data.slice(3500..4088));

        assert_eq!(object.requests(), vec![3072..4096]);
        assert_eq!(object.sizes.load(Ordering::Relaxed), 1);
        assert_eq!(reader.object_size(), 4096);
    }

    #[test]
    fn test_reads_outside_suffix_are_forwarded() {
        let object = RecordingReader::new(4096);
        let reader = PrecachedReadAt::from_suffix(object.clone(), 1024).unwrap();
        reader.read_at(0..100).unwrap();
        // Straddles the suffix start.
        let straddling = reader.read_at(3000..3100).unwrap();
        assert_eq!(straddling, object.data.slice(3000..3100));
        assert_eq!(object.requests(), vec![3072..4096, 0..100, 3000..3100]);
        assert_eq!(reader.storage_profile().min_io_size, 4 * 1024);
    }

    #[test]
    fn test_small_object_is_fully_cached() {
        let object = RecordingReader::new(40);
        let reader = PrecachedReadAt::from_suffix(object.clone(), 64 * 1024).unwrap();
        assert_eq!(reader.precached_range(), 0..40);
        assert_eq!(reader.read_at(0..1000).unwrap(), object.data);
        assert!(reader.read_at(40..48).unwrap().is_empty());
        assert_eq!(reader.storage_profile().min_io_size, 1);
        assert_eq!(object.requests().len(), 1);
    }

    #[test]
    fn test_zero_suffix_caches_nothing() {
        let object = RecordingReader::new(100);
        let reader = PrecachedReadAt::from_suffix(object.clone(), 0).unwrap();
        assert!(reader.precached_range().is_empty());
        assert!(object.requests().is_empty());
        reader.read_at(92..100).unwrap();
        assert_eq!(object.requests(), vec![92..100]);
    }

    #[test]
    fn test_empty_object() {
        let object = RecordingReader::new(0);
        let reader = PrecachedReadAt::from_suffix(object.clone(), 64).unwrap();
        assert_eq!(reader.object_size(), 0);
        assert!(reader.read_at(0..8).unwrap().is_empty());
        assert!(object.requests().is_empty());
    }
}
