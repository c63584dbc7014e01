//! Question bank loading: CSV parsing, file resolution and the bank catalog.

mod catalog;
mod csv_bank;
mod loader;

use std::path::PathBuf;

use quiz_core::model::{BankId, QuestionRecord};
use thiserror::Error;

pub use catalog::{BankCatalog, CATALOG_FILE, CatalogError};
pub use csv_bank::parse_bank;
pub use loader::{DirectoryBankLoader, InMemoryBankLoader, QuestionBankLoader};

/// Errors raised while loading a question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankLoadError {
    #[error("question bank not found: {name}")]
    NotFound { name: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{column}' not found")]
    MissingColumn { column: &'static str },

    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// Questions of one bank in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBank {
    pub id: BankId,
    pub questions: Vec<QuestionRecord>,
}

impl LoadedBank {
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
