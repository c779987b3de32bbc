//! Application-wide error types.

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure reported by a submission sink.
///
/// A submission that ends in one of these never advances the form to the
/// success view; the message is shown to the user instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The system of record could not be reached (or kept failing).
    #[error("Pengiriman gagal, layanan tidak tersedia: {0}")]
    Unavailable(String),

    /// The system of record refused the payload.
    #[error("Pengiriman ditolak: {0}")]
    Rejected(String),
}

/// Constraint violations mean the row itself is unacceptable and retrying
/// cannot help; everything else is treated as the store being unreachable.
impl From<sqlx::Error> for SubmissionError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if !matches!(db.kind(), ErrorKind::Other) => {
                Self::Rejected(db.message().to_string())
            }
            _ => Self::Unavailable(e.to_string()),
        }
    }
}
