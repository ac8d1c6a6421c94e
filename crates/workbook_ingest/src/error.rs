use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestionError>;

/// Workbook-level failure. Row and sheet problems never end up here; they are
/// absorbed into the ingestion diagnostics.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("cannot read workbook '{origin}': {cause}")]
    WorkbookUnreadable { origin: String, cause: String },
}

impl IngestionError {
    pub(crate) fn unreadable(origin: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        IngestionError::WorkbookUnreadable {
            origin: origin.into(),
            cause: cause.to_string(),
        }
    }

    /// Human-readable reason, without the workbook name.
    pub fn cause(&self) -> &str {
        match self {
            IngestionError::WorkbookUnreadable { cause, .. } => cause,
        }
    }
}
