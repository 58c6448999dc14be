use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_state(operation: impl Into<String>, state: impl Into<String>) -> Error {
        ErrorKind::InvalidState {
            operation: operation.into(),
            state: state.into(),
        }
        .into()
    }

    pub fn config(message: impl Into<String>) -> Error {
        ErrorKind::Config {
            message: message.into(),
        }
        .into()
    }

    pub fn encoding(column: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::Encoding {
            column: column.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn corrupt_file(element: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::CorruptFile {
            element: element.into(),
            message: message.into(),
        }
        .into()
    }

    /// Wraps a storage-layer I/O error, classifying it by its `std::io::ErrorKind`.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        let context = context.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound { context, source },
            std::io::ErrorKind::PermissionDenied => ErrorKind::AccessDenied { context, source },
            std::io::ErrorKind::InvalidInput => ErrorKind::Config {
                message: if context.is_empty() {
                    source.to_string()
                } else {
                    format!("{context}: {source}")
                },
            },
            std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
                ErrorKind::CorruptFile {
                    element: context,
                    message: source.to_string(),
                }
            }
            _ => ErrorKind::Transport { context, source },
        }
        .into()
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound { .. })
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self.kind(), ErrorKind::AccessDenied { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Config { .. } | ErrorKind::ResolveUrl { .. }
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport { .. })
    }

    pub fn is_encoding(&self) -> bool {
        matches!(self.kind(), ErrorKind::Encoding { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidState { .. })
    }

    /// Returns `true` for every failure caused by unreadable stored data,
    /// including checksum mismatches.
    pub fn is_corrupt_file(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CorruptFile { .. } | ErrorKind::ChecksumMismatch { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid state: cannot {operation} after {state}")]
    InvalidState { operation: String, state: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error(
        "failed to resolve url '{url}' (relative: {}), reason: {reason}",
        relative.as_deref().unwrap_or_default())]
    ResolveUrl {
        url: String,
        relative: Option<String>,
        reason: String,
    },

    #[error("object not found '{context}': {source}")]
    NotFound {
        context: String,
        source: std::io::Error,
    },

    #[error("access denied '{context}': {source}")]
    AccessDenied {
        context: String,
        source: std::io::Error,
    },

    #[error("transport error for '{context}': {source}")]
    Transport {
        context: String,
        source: std::io::Error,
    },

    #[error("encoding error in column '{column}': {message}")]
    Encoding { column: String, message: String },

    #[error("corrupt file, invalid '{element}': {message}")]
    CorruptFile { element: String, message: String },

    #[error("checksum mismatch for '{element}'")]
    ChecksumMismatch { element: String },

    #[error("{context}")]
    Other {
        context: String,
        source: StdErrorBoxed,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(_: std::convert::Infallible) -> Self {
        Error::invalid_state("convert", "infallible conversion")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_classification() {
        let e = Error::io("x", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(e.is_not_found());
        let e = Error::io(
            "x",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(e.is_access_denied());
        let e = Error::io("x", std::io::Error::other("connection reset"));
        assert!(e.is_transport());
        let e: Error = std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into();
        assert!(e.is_corrupt_file());
        let e: Error = std::io::Error::new(std::io::ErrorKind::InvalidInput, "bad").into();
        assert!(e.is_config());
    }

    #[test]
    fn test_error_display() {
        let e = Error::invalid_state("write", "write_stop");
        assert_eq!(e.to_string(), "invalid state: cannot write after write_stop");
        let e = Error::encoding("age", "expected Int32, got Boolean");
        assert!(e.is_encoding());
        assert!(e.to_string().contains("'age'"));
    }
}
