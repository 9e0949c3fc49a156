//! Error taxonomy of a review session.

use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::RecordId;

/// Result type alias using [`ReviewError`].
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Errors surfaced to the operator.
///
/// Session-start errors (`DirectoryNotFound`, `NoCandidates`,
/// `DuplicateIdentifier`) stop the session; every other variant is reported
/// and the session carries on.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// The records directory does not exist.
    #[error("Folder not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The directory exists but holds no numbered record files.
    #[error("No numeric CSV files found in: {}", .0.display())]
    NoCandidates(PathBuf),

    /// Two file names map to the same identifier (e.g. `4.csv` and `4.CSV`).
    #[error("Identifier {id} is claimed by both {first} and {second}")]
    DuplicateIdentifier {
        id: RecordId,
        first: String,
        second: String,
    },

    /// Listing the records directory failed for a reason other than absence.
    #[error("Failed to list records: {0:#}")]
    Listing(anyhow::Error),

    /// One record could not be read or parsed. Keep/reject still apply.
    #[error("Failed to read {id}.csv: {cause:#}")]
    RecordRead { id: RecordId, cause: anyhow::Error },

    /// A reject could not move the record; it stays in the working set.
    #[error("Failed to quarantine {id}.csv: {cause:#}")]
    Quarantine { id: RecordId, cause: anyhow::Error },

    /// Renumbering stopped part-way; re-running it resumes.
    #[error("Renumbering failed: {0:#}")]
    Renumber(anyhow::Error),

    /// A decision arrived after every record was decided.
    #[error("Review already finished")]
    SessionFinished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReviewError::DirectoryNotFound(PathBuf::from("/data/pcb"));
        assert!(err.to_string().contains("/data/pcb"));
    }

    #[test]
    fn test_record_read_keeps_cause() {
        let err = ReviewError::RecordRead {
            id: RecordId(7),
            cause: anyhow::anyhow!("Missing columns: [\"V5\"]"),
        };
        let msg = err.to_string();
        assert!(msg.contains("7.csv"));
        assert!(msg.contains("Missing columns"));
    }
}
