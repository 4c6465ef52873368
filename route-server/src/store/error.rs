//! Store error types.

/// Errors from the persistence collaborator.
///
/// All of these are internal faults from the caller's point of view; the
/// store never retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record addressed by id does not exist
    #[error("{kind} {id} not found")]
    MissingRecord { kind: &'static str, id: String },

    /// A record with this id already exists
    #[error("{kind} {id} already exists")]
    Conflict { kind: &'static str, id: String },

    /// Stored data violates an invariant (bad id, dangling reference, ...)
    #[error("data integrity error: {0}")]
    Integrity(String),

    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not valid snapshot JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn missing(kind: &'static str, id: impl ToString) -> Self {
        StoreError::MissingRecord {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(kind: &'static str, id: impl ToString) -> Self {
        StoreError::Conflict {
            kind,
            id: id.to_string(),
        }
    }
}
