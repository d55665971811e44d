use thiserror::Error;

use crate::model::CollectionErrorEntry;

/// Message used when a failure carries no error records at all
const UNKNOWN_ERROR: &str = "unknown error";

/// Failures raised by the collection collaborators
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("client is not connected")]
    NotConnected,
    #[error("missing credentials: {0}")]
    Credentials(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request failed with status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("{message}")]
    Remote { code: i64, message: String },
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Malformed(err.to_string())
    }
}

/// The single error value shown to the user
///
/// Produced only through [`normalize`] so that every failure shape ends up
/// with the same representation in the list state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ViewError {
    pub code: Option<i64>,
    pub message: String,
}

/// Every shape a failure can arrive in before it is normalised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawError {
    Message(String),
    Catalog(CatalogError),
    /// Error records returned inside a collection payload. Only the first
    /// record survives normalisation.
    Records(Vec<CollectionErrorEntry>),
}

impl From<&str> for RawError {
    fn from(message: &str) -> Self {
        RawError::Message(message.to_string())
    }
}

impl From<String> for RawError {
    fn from(message: String) -> Self {
        RawError::Message(message)
    }
}

impl From<CatalogError> for RawError {
    fn from(err: CatalogError) -> Self {
        RawError::Catalog(err)
    }
}

impl From<Vec<CollectionErrorEntry>> for RawError {
    fn from(records: Vec<CollectionErrorEntry>) -> Self {
        RawError::Records(records)
    }
}

/// Collapse any failure shape into a [`ViewError`]
///
/// A list of records keeps the first record's message and code verbatim and
/// drops the rest.
pub fn normalize(raw: impl Into<RawError>) -> ViewError {
    match raw.into() {
        RawError::Message(message) => ViewError {
            code: None,
            message,
        },
        RawError::Catalog(CatalogError::Remote { code, message }) => ViewError {
            code: Some(code),
            message,
        },
        RawError::Catalog(err @ CatalogError::Status { code, .. }) => ViewError {
            code: Some(i64::from(code)),
            message: err.to_string(),
        },
        RawError::Catalog(err) => ViewError {
            code: None,
            message: err.to_string(),
        },
        RawError::Records(records) => match records.into_iter().next() {
            Some(first) => ViewError {
                code: Some(first.code),
                message: first.message,
            },
            None => ViewError {
                code: None,
                message: UNKNOWN_ERROR.to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_string() {
        let err = normalize("boom");
        assert_eq!(err.message, "boom");
        assert_eq!(err.code, None);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_normalize_single_error() {
        let err = normalize(CatalogError::Transport("connection refused".to_string()));
        assert_eq!(err.message, "transport error: connection refused");

        let remote = normalize(CatalogError::Remote {
            code: 500,
            message: "function crashed".to_string(),
        });
        assert_eq!(remote.code, Some(500));
        assert_eq!(remote.message, "function crashed");
    }

    #[test]
    fn test_normalize_records_keeps_first_message_exactly() {
        let err = normalize(vec![
            CollectionErrorEntry {
                code: 404,
                message: "object not found: all".to_string(),
            },
            CollectionErrorEntry {
                code: 500,
                message: "second".to_string(),
            },
        ]);
        assert_eq!(err.code, Some(404));
        assert_eq!(err.message, "object not found: all");
    }

    #[test]
    fn test_normalize_empty_records() {
        let err = normalize(Vec::<CollectionErrorEntry>::new());
        assert_eq!(err.message, UNKNOWN_ERROR);
    }
}
