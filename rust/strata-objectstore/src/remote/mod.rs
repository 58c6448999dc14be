//! S3-style remote object storage.
//!
//! The store itself carries no network code: every request is delegated to a
//! [`RemoteObjectClient`], the transport collaborator that owns addressing,
//! authentication and retries. [`RemoteObjectStore`] layers the `ObjectStore`
//! contract on top of it:
//! - writers are [`MultipartWriter`]s, which buffer appended bytes and upload
//!   them as numbered parts, completing the upload on `seal()`;
//! - readers are [`RangedReader`]s, which issue one ranged fetch per read.
//!
//! [`memory_service::InMemoryObjectService`] is a complete in-process
//! implementation of the transport, used by tests and demos.

use std::{ops::Range, sync::Arc};

use bytes::Bytes;
use strata_common::error::Error;
use strata_io::{ReadAt, SealingWrite};

use crate::{ObjectStore, url::ObjectUrl};

pub mod memory_service;
mod multipart_writer;
mod ranged_reader;

pub use multipart_writer::MultipartWriter;
pub use ranged_reader::RangedReader;

/// URL schemes served by [`RemoteObjectStore`].
pub const REMOTE_SCHEMES: &[&str] = &["s3", "mem"];

/// Default size of an uploaded part.
pub const DEFAULT_PART_SIZE: usize = 5 * 1024 * 1024;

/// Access credentials handed to the transport when connecting.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Credentials {
        Credentials {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Options of a single object upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Number of buffered bytes that triggers a part upload.
    pub part_size: usize,
    /// Advisory content type stored with the object.
    pub content_type: Option<String>,
}

impl WriteOptions {
    pub fn with_part_size(mut self, part_size: usize) -> Self {
        self.part_size = part_size;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            part_size: DEFAULT_PART_SIZE,
            content_type: None,
        }
    }
}

/// Connection settings of a [`RemoteObjectStore`].
#[derive(Debug, Clone)]
pub struct RemoteStoreConfig {
    pub endpoint: String,
    pub region: String,
    pub credentials: Option<Credentials>,
    /// Defaults for objects created through [`ObjectStore::create`].
    pub write_options: WriteOptions,
}

impl RemoteStoreConfig {
    pub fn new(endpoint: impl Into<String>, region: impl Into<String>) -> RemoteStoreConfig {
        RemoteStoreConfig {
            endpoint: endpoint.into(),
            region: region.into(),
            credentials: None,
            write_options: WriteOptions::default(),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_write_options(mut self, write_options: WriteOptions) -> Self {
        self.write_options = write_options;
        self
    }

    /// Checks the settings that can be validated without contacting the
    /// service.
    pub fn validate(&self) -> strata_common::Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::config("remote store endpoint is empty"));
        }
        if self.region.trim().is_empty() {
            return Err(Error::config("remote store region is empty"));
        }
        validate_write_options(&self.write_options)?;
        if let Some(credentials) = &self.credentials {
            if credentials.access_key.is_empty() || credentials.secret_key.is_empty() {
                return Err(Error::config("remote store credentials are incomplete"));
            }
        }
        Ok(())
    }
}

fn validate_write_options(options: &WriteOptions) -> strata_common::Result<()> {
    if options.part_size == 0 {
        return Err(Error::config("part size must be positive"));
    }
    Ok(())
}

/// Metadata returned by a `HEAD` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub size: u64,
    pub content_type: Option<String>,
}

/// Identifies an in-progress multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadId {
    pub bucket: String,
    pub key: String,
    pub id: String,
}

/// Acknowledgement of an uploaded part, presented again on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartReceipt {
    pub part_number: u32,
    pub etag: String,
}

/// Transport collaborator of the remote store: a client for an S3-style
/// object service.
///
/// Errors follow `std::io::ErrorKind` conventions: `NotFound` for a missing
/// bucket, object or upload, `PermissionDenied` for rejected credentials,
/// `InvalidInput` for malformed requests. Any other kind is treated as a
/// transport failure. Implementations do not retry on behalf of the store.
pub trait RemoteObjectClient: Send + Sync + 'static {
    fn head_object(&self, bucket: &str, key: &str) -> std::io::Result<ObjectMetadata>;

    /// Fetches `range` of the object. The range is within the object bounds.
    fn get_range(&self, bucket: &str, key: &str, range: Range<u64>) -> std::io::Result<Bytes>;

    fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<&str>,
    ) -> std::io::Result<UploadId>;

    /// Uploads one part. Part numbers start at 1.
    fn upload_part(
        &self,
        upload: &UploadId,
        part_number: u32,
        data: Bytes,
    ) -> std::io::Result<PartReceipt>;

    /// Assembles the listed parts, in order, into the final object and makes
    /// it visible.
    fn complete_multipart_upload(
        &self,
        upload: &UploadId,
        parts: &[PartReceipt],
    ) -> std::io::Result<()>;

    /// Discards an upload and all of its parts.
    fn abort_multipart_upload(&self, upload: &UploadId) -> std::io::Result<()>;
}

/// Establishes authenticated [`RemoteObjectClient`] sessions.
pub trait RemoteConnector {
    fn connect(&self, config: &RemoteStoreConfig) -> std::io::Result<Arc<dyn RemoteObjectClient>>;
}

/// `ObjectStore` over a remote S3-style object service.
///
/// The store is an explicit connection object: it holds the client session
/// for its whole lifetime and is released by dropping it.
pub struct RemoteObjectStore {
    client: Arc<dyn RemoteObjectClient>,
    config: RemoteStoreConfig,
}

impl RemoteObjectStore {
    /// Validates `config` and opens a client session through `connector`.
    ///
    /// Fails with a `Config` error for unusable settings and with
    /// `AccessDenied` when the service rejects the credentials.
    pub fn connect(
        config: RemoteStoreConfig,
        connector: &dyn RemoteConnector,
    ) -> strata_common::Result<RemoteObjectStore> {
        config.validate()?;
        let client = connector
            .connect(&config)
            .map_err(|e| Error::io(config.endpoint.clone(), e))?;
        log::debug!(
            "connected to remote object store {} ({})",
            config.endpoint,
            config.region
        );
        Ok(RemoteObjectStore { client, config })
    }

    /// Wraps an already established client session.
    pub fn with_client(
        config: RemoteStoreConfig,
        client: Arc<dyn RemoteObjectClient>,
    ) -> strata_common::Result<RemoteObjectStore> {
        config.validate()?;
        Ok(RemoteObjectStore { client, config })
    }

    pub fn config(&self) -> &RemoteStoreConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<dyn RemoteObjectClient> {
        &self.client
    }

    /// Opens a ranged reader over an existing object.
    pub fn open_reader(&self, url: &ObjectUrl) -> std::io::Result<RangedReader> {
        let (bucket, key) = Self::resolve(url)?;
        RangedReader::open(self.client.clone(), bucket, key)
    }

    /// Starts a multipart upload of a new object with explicit write options.
    pub fn create_with_options(
        &self,
        url: &ObjectUrl,
        options: WriteOptions,
    ) -> std::io::Result<MultipartWriter> {
        validate_write_options(&options).map_err(|e| invalid_input(e.to_string()))?;
        let (bucket, key) = Self::resolve(url)?;
        MultipartWriter::start(self.client.clone(), bucket, key, options)
    }

    fn resolve(url: &ObjectUrl) -> std::io::Result<(&str, &str)> {
        if !REMOTE_SCHEMES.contains(&url.scheme()) {
            return Err(invalid_input(format!(
                "unsupported scheme '{}' for remote object '{url}'",
                url.scheme()
            )));
        }
        let bucket = url
            .bucket()
            .ok_or_else(|| invalid_input(format!("missing bucket in '{url}'")))?;
        if url.is_container() || url.key().is_empty() {
            return Err(invalid_input(format!("missing object key in '{url}'")));
        }
        Ok((bucket, url.key()))
    }
}

impl ObjectStore for RemoteObjectStore {
    fn open(&self, url: &ObjectUrl) -> std::io::Result<Arc<dyn ReadAt>> {
        Ok(Arc::new(self.open_reader(url)?))
    }

    fn create(&self, url: &ObjectUrl) -> std::io::Result<Box<dyn SealingWrite>> {
        Ok(Box::new(
            self.create_with_options(url, self.config.write_options.clone())?,
        ))
    }
}

fn invalid_input(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use strata_common::error::Error;

    use super::{
        Credentials, RemoteObjectStore, RemoteStoreConfig, WriteOptions,
        memory_service::InMemoryObjectService,
    };
    use crate::{ObjectStore, url::ObjectUrl};

    fn config() -> RemoteStoreConfig {
        RemoteStoreConfig::new("mem://local", "us-east-1")
    }

    #[test]
    fn test_config_validation() {
        let service = InMemoryObjectService::new();
        let err = RemoteObjectStore::connect(RemoteStoreConfig::new("", "r"), &service)
            .err()
            .unwrap();
        assert!(err.is_config());
        let err = RemoteObjectStore::connect(RemoteStoreConfig::new("e", " "), &service)
            .err()
            .unwrap();
        assert!(err.is_config());
        let err = RemoteObjectStore::connect(
            config().with_write_options(WriteOptions::default().with_part_size(0)),
            &service,
        )
        .err()
        .unwrap();
        assert!(err.is_config());
        assert!(RemoteObjectStore::connect(config(), &service).is_ok());
    }

    #[test]
    fn test_credentials_are_checked_on_connect() {
        let service =
            InMemoryObjectService::with_required_credentials(Credentials::new("ak", "sk"));
        let err: Error = RemoteObjectStore::connect(
            config().with_credentials(Credentials::new("ak", "wrong")),
            &service,
        )
        .err()
        .unwrap();
        assert!(err.is_access_denied());

        let err = RemoteObjectStore::connect(config(), &service).err().unwrap();
        assert!(err.is_access_denied());

        assert!(
            RemoteObjectStore::connect(
                config().with_credentials(Credentials::new("ak", "sk")),
                &service
            )
            .is_ok()
        );
    }

    #[test]
    fn test_rejects_foreign_urls() {
        let service = InMemoryObjectService::new();
        service.create_bucket("bbb");
        let store = RemoteObjectStore::connect(config(), &service).unwrap();
        for url in ["file:///tmp/x", "s3://bbb/", "http://bbb/x"] {
            let url = ObjectUrl::parse(url).unwrap();
            let err = store.create(&url).err().unwrap();
            assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput, "{url}");
        }
    }

    #[test]
    fn test_write_seal_then_read() {
        let service = InMemoryObjectService::new();
        service.create_bucket("bbb");
        let store = Arc::new(
            RemoteObjectStore::connect(
                config().with_write_options(WriteOptions::default().with_part_size(10)),
                &service,
            )
            .unwrap(),
        );
        let url = ObjectUrl::parse("s3://bbb/test/object").unwrap();

        let mut writer = store.create(&url).unwrap();
        writer.write_all(b"0123456789abcdef").unwrap();
        writer.write_all(b"ghijklmnop").unwrap();
        assert!(store.open(&url).is_err(), "not visible before seal");
        writer.seal().unwrap();

        let reader = store.open(&url).unwrap();
        assert_eq!(reader.size().unwrap(), 26);
        assert_eq!(reader.read_at(8..12).unwrap().as_ref(), b"89ab");
        assert_eq!(reader.read_at(20..100).unwrap().as_ref(), b"klmnop");
        assert_eq!(service.stats().parts_uploaded, 3);
        assert_eq!(service.stats().uploads_completed, 1);
    }

    #[test]
    fn test_open_missing_object_is_not_found() {
        let service = InMemoryObjectService::new();
        service.create_bucket("bbb");
        let store = RemoteObjectStore::connect(config(), &service).unwrap();
        let err = store
            .open(&ObjectUrl::parse("s3://bbb/nothing").unwrap())
            .err()
            .unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        let err = store
            .open(&ObjectUrl::parse("s3://nobucket/x").unwrap())
            .err()
            .unwrap();
        assert!(Error::io("open", err).is_not_found());
    }
}
