//! Object identifiers for the `ObjectStore`.
//!
//! An object is addressed by an absolute URL. Remote objects use the
//! `scheme://bucket/key` form (`s3://bucket/data/file.strata`), local objects
//! use `file:///path`. URLs must be clean and canonical:
//! - no credentials in the authority component,
//! - no query and no fragment,
//! - no path traversal sequences.
//!
//! A URL whose path ends with a slash denotes a "container" (folder); any
//! other URL denotes an object within its container.

use std::borrow::Cow;

use url::Url;

macro_rules! verify {
    ($expr:expr) => {{
        let result = $expr;
        verify(result, stringify!($expr), None)?;
    }};

    ($expr:expr, $url:expr) => {{
        let result = $expr;
        verify(result, stringify!($expr), Some($url))?;
    }};
}

/// A URL that has been parsed and verified according to the `ObjectStore`
/// rules above.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(Url);

impl ObjectUrl {
    /// Creates a new `ObjectUrl` from a `Url` after verifying it.
    pub fn new(url: Url) -> strata_common::Result<ObjectUrl> {
        Self::verify_url(&url)?;
        Ok(Self(url))
    }

    /// Parses a string into an `ObjectUrl` after verifying it.
    ///
    /// The parsed and reassembled URL must be identical to the input, which
    /// rules out non-canonical forms and dot-segment traversal.
    pub fn parse(url_str: &str) -> strata_common::Result<ObjectUrl> {
        let url = parse_url(url_str)?;
        Self::verify_url(&url)?;
        verify!(url.as_str() == url_str, url_str);
        Ok(Self(url))
    }

    /// Returns the URL as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the `ObjectUrl` and returns the inner `Url`.
    pub fn into_inner(self) -> Url {
        self.0
    }

    /// Bucket name of a `scheme://bucket/key` URL (the host component).
    pub fn bucket(&self) -> Option<&str> {
        self.0.host_str().filter(|host| !host.is_empty())
    }

    /// Object key of a `scheme://bucket/key` URL: the path without its
    /// leading slash.
    pub fn key(&self) -> &str {
        self.0.path().trim_start_matches('/')
    }

    /// Attempts to make a given `ObjectUrl` relative to the container of this URL.
    ///
    /// Returns `None` if `url` is outside of that container, or is a container
    /// itself.
    pub fn make_relative(&self, url: &ObjectUrl) -> Option<String> {
        if url.is_container() {
            return None;
        }

        let container = self.get_container().ok()?;
        if url.as_str().starts_with(container.as_str()) {
            container.0.make_relative(url)
        } else {
            None
        }
    }

    /// Returns the container URL for this URL (itself, if already a container).
    pub fn get_container(&self) -> strata_common::Result<Cow<'_, ObjectUrl>> {
        if self.is_container() {
            Ok(Cow::Borrowed(self))
        } else {
            let parent_url = self
                .join("./")
                .map_err(|_e| make_err("failed to determine parent", Some(self.as_str())))?;
            Ok(Cow::Owned(ObjectUrl(parent_url)))
        }
    }

    /// Checks if the URL represents a container (i.e., ends with a `/`).
    pub fn is_container(&self) -> bool {
        self.path().ends_with('/')
    }

    /// Verifies that the given `Url` is valid according to `ObjectStore` rules.
    pub fn verify_url(url: &Url) -> strata_common::Result<()> {
        verify!(url.username().is_empty(), url.as_str());
        verify!(url.password().is_none(), url.as_str());
        verify!(url.query().is_none(), url.as_str());
        verify!(url.fragment().is_none(), url.as_str());
        verify!(url.path_segments().is_some(), url.as_str());
        verify!(url.path().starts_with('/'), url.as_str());
        Ok(())
    }
}

impl std::ops::Deref for ObjectUrl {
    type Target = Url;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ObjectUrl {
    type Error = strata_common::error::Error;

    fn try_from(url_str: &str) -> Result<Self, Self::Error> {
        ObjectUrl::parse(url_str)
    }
}

fn parse_url(url: &str) -> strata_common::Result<Url> {
    Url::parse(url).map_err(|e| {
        strata_common::error::ErrorKind::ResolveUrl {
            url: url.to_string(),
            relative: None,
            reason: format!("failed to parse url, error: {e}"),
        }
        .into()
    })
}

fn verify(predicate: bool, condition: &str, url: Option<&str>) -> strata_common::Result<()> {
    if predicate {
        Ok(())
    } else {
        Err(make_err(condition, url))
    }
}

fn make_err(reason: &str, url: Option<&str>) -> strata_common::error::Error {
    strata_common::error::ErrorKind::ResolveUrl {
        url: url.map(String::from).unwrap_or_default(),
        relative: None,
        reason: reason.to_string(),
    }
    .into()
}
