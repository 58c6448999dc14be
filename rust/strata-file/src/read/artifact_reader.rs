//! Exact-length ranged reads over a storage artifact.

use std::{ops::Range, sync::Arc};

use bytes::Bytes;
use strata_common::error::Error;
use strata_io::{ReadAt, StorageProfile};

/// Wraps a [`ReadAt`] source and turns its failures into Strata errors.
///
/// A range that the source cannot fully satisfy means the file is shorter
/// than its footer claims, so short reads are reported as `CorruptFile`.
#[derive(Clone)]
pub struct ArtifactReader {
    inner: Arc<dyn ReadAt>,
}

impl ArtifactReader {
    pub fn new(inner: Arc<dyn ReadAt>) -> ArtifactReader {
        ArtifactReader { inner }
    }

    pub fn size(&self) -> strata_common::Result<u64> {
        self.inner.size().map_err(|e| Error::io("size", e))
    }

    /// Reads exactly `range`; `element` names what is being read.
    pub fn read_at(&self, range: Range<u64>, element: &str) -> strata_common::Result<Bytes> {
        let expected = range.end.saturating_sub(range.start);
        let bytes = self
            .inner
            .read_at(range.clone())
            .map_err(|e| Error::io(element, e))?;
        if bytes.len() as u64 != expected {
            return Err(Error::corrupt_file(
                element,
                format!(
                    "expected {expected} bytes at offset {}, got {}",
                    range.start,
                    bytes.len()
                ),
            ));
        }
        Ok(bytes)
    }

    pub fn storage_profile(&self) -> StorageProfile {
        self.inner.storage_profile()
    }

    pub fn inner(&self) -> &Arc<dyn ReadAt> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::ArtifactReader;

    #[test]
    fn test_exact_reads() {
        let reader = ArtifactReader::new(Arc::new(b"0123456789".to_vec()));
        assert_eq!(reader.size().unwrap(), 10);
        assert_eq!(&reader.read_at(2..5, "x").unwrap()[..], b"234");
        assert!(reader.read_at(3..3, "x").unwrap().is_empty());
        let err = reader.read_at(8..12, "row_group").unwrap_err();
        assert!(err.is_corrupt_file());
        assert!(err.to_string().contains("row_group"));
    }
}
