//! *Object Store* abstraction: a "storage service" client capable of issuing
//! readers and writers for a given object URL.
//!
//! Two families of stores are provided:
//! - [`local_store::LocalFsObjectStore`], backed by the local filesystem;
//! - [`remote::RemoteObjectStore`], an S3-style store layered over a
//!   [`remote::RemoteObjectClient`] transport. Writes are buffered and
//!   uploaded as numbered parts of a multipart upload, committed on `seal()`;
//!   reads are served by ranged fetches.

pub mod local_store;
pub mod remote;
pub mod url;

use std::sync::Arc;

use strata_io::{ReadAt, SealingWrite};
use url::ObjectUrl;

/// The `ObjectStore` trait represents a "storage service" abstraction.
///
/// Readers are issued for existing objects, writers for new ones. An object
/// created through `create` becomes visible to `open` only after its writer
/// has been sealed.
pub trait ObjectStore: Send + Sync + 'static {
    /// Opens a reader for an existing object specified by the given URL.
    ///
    /// Fails with `std::io::ErrorKind::NotFound` when the object (or its
    /// bucket/container) does not exist.
    fn open(&self, url: &ObjectUrl) -> std::io::Result<Arc<dyn ReadAt>>;

    /// Creates a writer for a new object at the specified URL.
    fn create(&self, url: &ObjectUrl) -> std::io::Result<Box<dyn SealingWrite>>;
}

impl<T> ObjectStore for Arc<T>
where
    T: ObjectStore + ?Sized,
{
    fn open(&self, url: &ObjectUrl) -> std::io::Result<Arc<dyn ReadAt>> {
        self.as_ref().open(url)
    }

    fn create(&self, url: &ObjectUrl) -> std::io::Result<Box<dyn SealingWrite>> {
        self.as_ref().create(url)
    }
}
