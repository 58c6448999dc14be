//! In-process S3-style object service.
//!
//! Models the parts of the service contract the remote store depends on:
//! buckets, objects that become visible only when their multipart upload
//! completes, part bookkeeping, credential checks at connect time, and
//! ranged reads. Fault injection hooks and request counters make it usable
//! as a transport double in tests.

use std::{
    collections::BTreeMap,
    ops::Range,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use ahash::AHashMap;
use bytes::{Bytes, BytesMut};

use super::{
    Credentials, ObjectMetadata, PartReceipt, RemoteConnector, RemoteObjectClient,
    RemoteStoreConfig, UploadId,
};

/// Request counters of an [`InMemoryObjectService`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub head_requests: u64,
    pub range_reads: u64,
    pub bytes_read: u64,
    pub parts_uploaded: u64,
    pub uploads_completed: u64,
    pub uploads_aborted: u64,
}

/// A shared, cloneable handle to an in-memory object service.
#[derive(Clone, Default)]
pub struct InMemoryObjectService {
    inner: Arc<ServiceInner>,
}

#[derive(Default)]
struct ServiceInner {
    required_credentials: Option<Credentials>,
    state: Mutex<ServiceState>,
}

#[derive(Default)]
struct ServiceState {
    buckets: AHashMap<String, AHashMap<String, StoredObject>>,
    uploads: AHashMap<String, PendingUpload>,
    next_upload_id: u64,
    stats: ServiceStats,
    /// Number of part uploads that still succeed before every following one
    /// fails.
    part_upload_budget: Option<u64>,
    fail_range_reads: bool,
}

struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
}

struct PendingUpload {
    bucket: String,
    key: String,
    content_type: Option<String>,
    parts: BTreeMap<u32, (String, Bytes)>,
}

impl InMemoryObjectService {
    pub fn new() -> InMemoryObjectService {
        Default::default()
    }

    /// Creates a service that accepts only connections presenting `credentials`.
    pub fn with_required_credentials(credentials: Credentials) -> InMemoryObjectService {
        InMemoryObjectService {
            inner: Arc::new(ServiceInner {
                required_credentials: Some(credentials),
                state: Default::default(),
            }),
        }
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.state().buckets.entry(bucket.to_string()).or_default();
    }

    /// Stores a complete object directly, creating the bucket if needed.
    pub fn put_object(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        self.state()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(
                key.to_string(),
                StoredObject {
                    data: data.into(),
                    content_type: None,
                },
            );
    }

    /// Returns the contents of a visible object.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.state()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|object| object.data.clone())
    }

    /// Lists the keys of visible objects in the bucket, sorted.
    pub fn object_keys(&self, bucket: &str) -> Vec<String> {
        let mut keys = self
            .state()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn pending_upload_count(&self) -> usize {
        self.state().uploads.len()
    }

    pub fn stats(&self) -> ServiceStats {
        self.state().stats
    }

    /// Lets the next `n` part uploads succeed and fails all subsequent ones.
    pub fn fail_upload_part_after(&self, n: u64) {
        self.state().part_upload_budget = Some(n);
    }

    /// Removes the part upload fault, if any.
    pub fn clear_upload_faults(&self) {
        self.state().part_upload_budget = None;
    }

    /// Makes every ranged read fail (or succeed again).
    pub fn set_fail_range_reads(&self, fail: bool) {
        self.state().fail_range_reads = fail;
    }

    /// A poisoned lock is recovered, so the service keeps serving after a
    /// caller panicked while holding it.
    fn state(&self) -> MutexGuard<'_, ServiceState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ServiceState {
    fn find_object(&self, bucket: &str, key: &str) -> std::io::Result<&StoredObject> {
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| not_found(format!("bucket '{bucket}' does not exist")))?;
        objects
            .get(key)
            .ok_or_else(|| not_found(format!("object '{bucket}/{key}' does not exist")))
    }

    fn find_upload(&mut self, upload: &UploadId) -> std::io::Result<&mut PendingUpload> {
        self.uploads
            .get_mut(&upload.id)
            .filter(|pending| pending.bucket == upload.bucket && pending.key == upload.key)
            .ok_or_else(|| not_found(format!("no such upload '{}'", upload.id)))
    }
}

impl RemoteObjectClient for InMemoryObjectService {
    fn head_object(&self, bucket: &str, key: &str) -> std::io::Result<ObjectMetadata> {
        let mut state = self.state();
        state.stats.head_requests += 1;
        let object = state.find_object(bucket, key)?;
        Ok(ObjectMetadata {
            size: object.data.len() as u64,
            content_type: object.content_type.clone(),
        })
    }

    fn get_range(&self, bucket: &str, key: &str, range: Range<u64>) -> std::io::Result<Bytes> {
        let mut state = self.state();
        if state.fail_range_reads {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                format!("injected failure reading '{bucket}/{key}'"),
            ));
        }
        let data = state.find_object(bucket, key)?.data.clone();
        if range.start > range.end || range.end > data.len() as u64 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "range {range:?} is not satisfiable for object of size {}",
                    data.len()
                ),
            ));
        }
        state.stats.range_reads += 1;
        state.stats.bytes_read += range.end - range.start;
        Ok(data.slice(range.start as usize..range.end as usize))
    }

    fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<&str>,
    ) -> std::io::Result<UploadId> {
        let mut state = self.state();
        if !state.buckets.contains_key(bucket) {
            return Err(not_found(format!("bucket '{bucket}' does not exist")));
        }
        state.next_upload_id += 1;
        let id = format!("upload-{}", state.next_upload_id);
        state.uploads.insert(
            id.clone(),
            PendingUpload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                content_type: content_type.map(String::from),
                parts: BTreeMap::new(),
            },
        );
        Ok(UploadId {
            bucket: bucket.to_string(),
            key: key.to_string(),
            id,
        })
    }

    fn upload_part(
        &self,
        upload: &UploadId,
        part_number: u32,
        data: Bytes,
    ) -> std::io::Result<PartReceipt> {
        let mut state = self.state();
        if part_number == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "part numbers start at 1",
            ));
        }
        if let Some(budget) = state.part_upload_budget.as_mut() {
            if *budget == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    format!("injected failure uploading part {part_number}"),
                ));
            }
            *budget -= 1;
        }
        let pending = state.find_upload(upload)?;
        let etag = format!("{}-{part_number}-{}", upload.id, data.len());
        pending.parts.insert(part_number, (etag.clone(), data));
        state.stats.parts_uploaded += 1;
        Ok(PartReceipt { part_number, etag })
    }

    fn complete_multipart_upload(
        &self,
        upload: &UploadId,
        parts: &[PartReceipt],
    ) -> std::io::Result<()> {
        let mut state = self.state();
        let pending = state.find_upload(upload)?;
        let mut data = BytesMut::new();
        let mut last_part = 0;
        for receipt in parts {
            if receipt.part_number <= last_part {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("part {} is out of order", receipt.part_number),
                ));
            }
            last_part = receipt.part_number;
            match pending.parts.get(&receipt.part_number) {
                Some((etag, part)) if *etag == receipt.etag => data.extend_from_slice(part),
                _ => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("invalid part {}", receipt.part_number),
                    ));
                }
            }
        }

        let content_type = pending.content_type.clone();
        state.uploads.remove(&upload.id);
        state
            .buckets
            .entry(upload.bucket.clone())
            .or_default()
            .insert(
                upload.key.clone(),
                StoredObject {
                    data: data.freeze(),
                    content_type,
                },
            );
        state.stats.uploads_completed += 1;
        Ok(())
    }

    fn abort_multipart_upload(&self, upload: &UploadId) -> std::io::Result<()> {
        let mut state = self.state();
        state.find_upload(upload)?;
        state.uploads.remove(&upload.id);
        state.stats.uploads_aborted += 1;
        Ok(())
    }
}

impl RemoteConnector for InMemoryObjectService {
    fn connect(&self, config: &RemoteStoreConfig) -> std::io::Result<Arc<dyn RemoteObjectClient>> {
        if let Some(required) = &self.inner.required_credentials {
            if config.credentials.as_ref() != Some(required) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "the provided credentials were rejected",
                ));
            }
        }
        Ok(Arc::new(self.clone()))
    }
}

fn not_found(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::NotFound, message)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::remote::{PartReceipt, RemoteObjectClient};

    use super::InMemoryObjectService;

    #[test]
    fn test_survives_panicking_holder() {
        let service = InMemoryObjectService::new();
        service.create_bucket("b");
        let holder = service.clone();
        let result = std::thread::spawn(move || {
            let _state = holder.state();
            panic!("panic while holding the service state");
        })
        .join();
        assert!(result.is_err());

        service.put_object("b", "k", Bytes::from_static(b"data"));
        assert_eq!(service.object("b", "k"), Some(Bytes::from_static(b"data")));
        assert_eq!(service.object_keys("b"), ["k"]);
    }

    #[test]
    fn test_upload_lifecycle() {
        let service = InMemoryObjectService::new();
        assert!(service.create_multipart_upload("b", "k", None).is_err());
        service.create_bucket("b");
        let upload = service
            .create_multipart_upload("b", "k", Some("application/octet-stream"))
            .unwrap();
        let p1 = service
            .upload_part(&upload, 1, Bytes::from_static(b"hello "))
            .unwrap();
        let p2 = service
            .upload_part(&upload, 2, Bytes::from_static(b"world"))
            .unwrap();
        assert!(service.object("b", "k").is_none());
        assert!(service.head_object("b", "k").is_err());

        service.complete_multipart_upload(&upload, &[p1, p2]).unwrap();
        assert_eq!(service.object("b", "k").unwrap().as_ref(), b"hello world");
        let meta = service.head_object("b", "k").unwrap();
        assert_eq!(meta.size, 11);
        assert_eq!(meta.content_type.as_deref(), Some("application/octet-stream"));
        assert_eq!(service.object_keys("b"), vec!["k".to_string()]);
        assert_eq!(service.pending_upload_count(), 0);
    }

    #[test]
    fn test_complete_rejects_bad_parts() {
        let service = InMemoryObjectService::new();
        service.create_bucket("b");
        let upload = service.create_multipart_upload("b", "k", None).unwrap();
        let p1 = service.upload_part(&upload, 1, Bytes::from_static(b"a")).unwrap();
        let p2 = service.upload_part(&upload, 2, Bytes::from_static(b"b")).unwrap();
        let err = service
            .complete_multipart_upload(&upload, &[p2.clone(), p1.clone()])
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        let forged = PartReceipt {
            part_number: 2,
            etag: "forged".to_string(),
        };
        assert!(service.complete_multipart_upload(&upload, &[p1, forged]).is_err());
        service.abort_multipart_upload(&upload).unwrap();
        assert!(service.abort_multipart_upload(&upload).is_err());
        assert_eq!(service.stats().uploads_aborted, 1);
    }

    #[test]
    fn test_injected_part_failures() {
        let service = InMemoryObjectService::new();
        service.create_bucket("b");
        service.fail_upload_part_after(2);
        let upload = service.create_multipart_upload("b", "k", None).unwrap();
        assert!(service.upload_part(&upload, 1, Bytes::new()).is_ok());
        assert!(service.upload_part(&upload, 2, Bytes::new()).is_ok());
        assert!(service.upload_part(&upload, 3, Bytes::new()).is_err());
        service.clear_upload_faults();
        assert!(service.upload_part(&upload, 3, Bytes::new()).is_ok());
    }
}
