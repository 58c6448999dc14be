use std::{ops::Range, sync::Arc};

use bytes::Bytes;
use strata_io::{ReadAt, StorageProfile, utils::clamp_range};

use super::{ObjectMetadata, RemoteObjectClient};

/// A [`ReadAt`] over a finalized remote object, issuing one ranged `GET` per
/// read.
///
/// The object size is obtained with a `HEAD` request when the reader is
/// opened; remote objects are immutable once completed, so it is never
/// refreshed.
pub struct RangedReader {
    client: Arc<dyn RemoteObjectClient>,
    bucket: String,
    key: String,
    metadata: ObjectMetadata,
}

impl RangedReader {
    /// Opens the reader, failing with `NotFound` if the object does not exist.
    pub fn open(
        client: Arc<dyn RemoteObjectClient>,
        bucket: &str,
        key: &str,
    ) -> std::io::Result<RangedReader> {
        let metadata = client.head_object(bucket, key)?;
        Ok(RangedReader {
            client,
            bucket: bucket.to_string(),
            key: key.to_string(),
            metadata,
        })
    }

    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }
}

impl ReadAt for RangedReader {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.metadata.size)
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes> {
        let range = clamp_range(range, self.metadata.size);
        if range.is_empty() {
            return Ok(Bytes::new());
        }
        log::trace!("ranged read {}/{} {range:?}", self.bucket, self.key);
        let expected = range.end - range.start;
        let data = self.client.get_range(&self.bucket, &self.key, range)?;
        if data.len() as u64 != expected {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "short ranged read of {}/{}: expected {expected} bytes, got {}",
                    self.bucket,
                    self.key,
                    data.len()
                ),
            ));
        }
        Ok(data)
    }

    fn storage_profile(&self) -> StorageProfile {
        StorageProfile {
            min_io_size: 256 * 1024,
            max_io_size: 8 * 1024 * 1024,
        }
    }
}
