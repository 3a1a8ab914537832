use std::io;
use thiserror::Error;

/// Result type for aifm operations
pub type Result<T> = std::result::Result<T, AifmError>;

/// Unified error type for all aifm operations
#[derive(Debug, Error)]
pub enum AifmError {
    // Archive errors
    #[error("Invalid container archive: {0}")]
    InvalidArchive(String),

    #[error("Member not found in container: {0}")]
    MemberNotFound(String),

    #[error("Corrupt member {path}: {reason}")]
    CorruptMember { path: String, reason: String },

    #[error("Member {path} is too large: {size} bytes (limit {limit})")]
    MemberTooLarge { path: String, size: u64, limit: u64 },

    #[error("Invalid member path: {0}")]
    InvalidMemberPath(String),

    #[error("No audio found in payload/")]
    NoAudioPayload,

    // Verification errors
    #[error("External verifier failed: {0}")]
    ExternalVerifier(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(String),

    #[error("Zip error: {0}")]
    Zip(String),
}

impl AifmError {
    /// Whether this error belongs to the archive family (open/read failures on a container)
    pub fn is_archive_error(&self) -> bool {
        matches!(
            self,
            AifmError::InvalidArchive(_)
                | AifmError::MemberNotFound(_)
                | AifmError::CorruptMember { .. }
                | AifmError::MemberTooLarge { .. }
                | AifmError::Zip(_)
        )
    }
}

impl From<toml::de::Error> for AifmError {
    fn from(err: toml::de::Error) -> Self {
        AifmError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for AifmError {
    fn from(err: toml::ser::Error) -> Self {
        AifmError::Toml(err.to_string())
    }
}

impl From<zip::result::ZipError> for AifmError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::FileNotFound => {
                AifmError::MemberNotFound("<unknown>".to_string())
            }
            zip::result::ZipError::Io(e) => AifmError::Io(e),
            other => AifmError::Zip(other.to_string()),
        }
    }
}
