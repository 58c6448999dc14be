use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use strata_common::error::Error;
use strata_io::{
    ReadAt, SealingWrite,
    file::{FileReader, FileWriter},
};
use url::Url;

use crate::{ObjectStore, url::ObjectUrl};

/// An `ObjectStore` over the local filesystem, confined to a container directory.
///
/// In `Passthrough` mode, object URLs are absolute `file://` URLs of the host
/// filesystem, and must point inside the container. In `VirtualRoot` mode the
/// container acts as the filesystem root: `file:///a/b.strata` maps to
/// `<container>/a/b.strata`.
///
/// Writers create new files only; an existing file is never overwritten.
pub struct LocalFsObjectStore {
    container_path: PathBuf,
    container_url: ObjectUrl,
    mode: LocalFsMode,
}

impl LocalFsObjectStore {
    /// Creates a new `LocalFsObjectStore` with the given container directory,
    /// creating the directory if it does not exist.
    pub fn new(container_path: &Path, mode: LocalFsMode) -> strata_common::Result<LocalFsObjectStore> {
        let url = Url::from_directory_path(container_path).map_err(|()| {
            Error::invalid_arg(
                "container",
                format!("invalid path {container_path:?} for local object store"),
            )
        })?;
        let container_url = ObjectUrl::new(url)?;
        std::fs::create_dir_all(container_path)
            .map_err(|e| Error::io(container_path.display().to_string(), e))?;
        Ok(LocalFsObjectStore {
            container_path: container_path.to_path_buf(),
            container_url,
            mode,
        })
    }

    /// Creates a store that accepts any absolute `file://` URL of the host.
    pub fn new_unscoped() -> strata_common::Result<LocalFsObjectStore> {
        Ok(LocalFsObjectStore {
            container_path: PathBuf::from("/"),
            container_url: ObjectUrl::parse("file:///")?,
            mode: LocalFsMode::Passthrough,
        })
    }

    /// Returns the file system path of the store's top-level container.
    pub fn container_path(&self) -> &Path {
        &self.container_path
    }

    /// Returns the URL of the store's top-level container.
    pub fn container_url(&self) -> &ObjectUrl {
        &self.container_url
    }

    /// Converts a local filesystem path into an `ObjectUrl` usable with an
    /// unscoped (or `Passthrough`) store.
    pub fn path_to_url(path: &Path) -> strata_common::Result<ObjectUrl> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| Error::io("current_dir", e))?
                .join(path)
        };
        let url = Url::from_file_path(&path).map_err(|()| {
            Error::invalid_arg("path", format!("cannot convert {path:?} to a file url"))
        })?;
        ObjectUrl::new(url)
    }

    /// Converts an [`ObjectUrl`] to a local filesystem path within the container.
    pub fn url_to_path(&self, url: &ObjectUrl) -> strata_common::Result<PathBuf> {
        let relative_path = match self.mode {
            LocalFsMode::Passthrough => {
                self.container_url.make_relative(url).ok_or_else(|| {
                    Error::invalid_arg(
                        "url",
                        format!(
                            "object url '{url}' cannot be made relative to the local fs container"
                        ),
                    )
                })?
            }
            LocalFsMode::VirtualRoot => {
                if url.is_container() {
                    return Err(Error::invalid_arg(
                        "url",
                        format!("object url '{url}' denotes a container"),
                    ));
                }
                url.key().to_string()
            }
        };
        Ok(self.container_path.join(relative_path))
    }

    fn invalid_url(op: &str, e: Error) -> std::io::Error {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{op}: invalid url: {e}"),
        )
    }
}

impl ObjectStore for LocalFsObjectStore {
    fn open(&self, url: &ObjectUrl) -> std::io::Result<Arc<dyn ReadAt>> {
        let path = self
            .url_to_path(url)
            .map_err(|e| Self::invalid_url("open", e))?;
        Ok(Arc::new(FileReader::open(path)?))
    }

    fn create(&self, url: &ObjectUrl) -> std::io::Result<Box<dyn SealingWrite>> {
        let path = self
            .url_to_path(url)
            .map_err(|e| Self::invalid_url("create", e))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        log::debug!("creating local object {}", path.display());
        Ok(Box::new(FileWriter::create(path)?))
    }
}

/// Defines how [`LocalFsObjectStore`] interprets object URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalFsMode {
    /// URLs are physical `file://` paths of the host, confined to the container.
    Passthrough,
    /// URLs are rooted at the container directory.
    VirtualRoot,
}
