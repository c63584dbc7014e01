//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::SessionReportError;
use storage::bank::BankLoadError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the quiz session and its controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("no question bank loaded")]
    NoBank,
    #[error("no session is running")]
    NotRunning,
    #[error("a session is already running")]
    InProgress,
    #[error("session finished; restart to begin again")]
    Completed,
    #[error("session has not finished")]
    NotFinished,
    #[error("answer is not one of the current options")]
    UnknownOption,
    #[error(transparent)]
    Report(#[from] SessionReportError),
    #[error(transparent)]
    Load(#[from] BankLoadError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
