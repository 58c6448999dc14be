//! Command implementations for strata-cmd

use anyhow::{Context, Result};
use std::path::Path;
use strata_objectstore::{local_store::LocalFsObjectStore, url::ObjectUrl};

pub mod demo;
pub mod head;
pub mod inspect;

/// Converts a file path string to an `ObjectUrl`.
///
/// If the input string is already a URL, it validates and returns it.
/// If the input is a file path (absolute or relative), it converts it to a file:// URL.
pub fn file_path_to_object_url(path_or_url: &str) -> Result<ObjectUrl> {
    if let Ok(object_url) = ObjectUrl::parse(path_or_url) {
        return Ok(object_url);
    }
    LocalFsObjectStore::path_to_url(Path::new(path_or_url))
        .with_context(|| format!("Invalid file path: {path_or_url}"))
}

/// Returns the object store serving `url`.
pub fn get_object_store(url: &ObjectUrl) -> Result<LocalFsObjectStore> {
    if url.scheme() != "file" {
        anyhow::bail!(
            "Unsupported URL scheme '{}'. Only 'file://' URLs are supported.",
            url.scheme()
        );
    }
    LocalFsObjectStore::new_unscoped().context("Failed to create local object store")
}
