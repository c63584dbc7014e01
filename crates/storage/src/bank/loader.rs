use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_core::model::{BankId, QuestionRecord};

use super::{BankLoadError, LoadedBank, parse_bank};

/// Produces the ordered questions of a named bank.
#[async_trait]
pub trait QuestionBankLoader: Send + Sync {
    /// Load (or re-load) the bank called `name`.
    ///
    /// # Errors
    ///
    /// Returns `BankLoadError` if the bank cannot be found, read or parsed.
    async fn load(&self, name: &str) -> Result<LoadedBank, BankLoadError>;
}

/// Loads CSV banks from the filesystem.
///
/// Names are tried as given first (absolute or relative to the working
/// directory), then under the banks directory. The bank id is the file name.
#[derive(Debug, Clone)]
pub struct DirectoryBankLoader {
    root: PathBuf,
}

impl DirectoryBankLoader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn resolve(&self, name: &str) -> PathBuf {
        let direct = PathBuf::from(name);
        if direct.is_absolute() || tokio::fs::try_exists(&direct).await.unwrap_or(false) {
            return direct;
        }
        self.root.join(name)
    }
}

#[async_trait]
impl QuestionBankLoader for DirectoryBankLoader {
    async fn load(&self, name: &str) -> Result<LoadedBank, BankLoadError> {
        let path = self.resolve(name).await;
        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                BankLoadError::NotFound {
                    name: name.to_owned(),
                }
            } else {
                BankLoadError::Read {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let questions = parse_bank(bytes.as_slice())?;
        let id = path
            .file_name()
            .map_or_else(|| BankId::new(name), |f| BankId::new(f.to_string_lossy()));
        tracing::debug!(
            bank = %id,
            path = %path.display(),
            questions = questions.len(),
            "bank loaded"
        );

        Ok(LoadedBank { id, questions })
    }
}

/// In-memory banks for tests. Counts loads so reloads can be observed.
#[derive(Clone, Default)]
pub struct InMemoryBankLoader {
    banks: Arc<Mutex<HashMap<String, Vec<QuestionRecord>>>>,
    loads: Arc<Mutex<HashMap<String, usize>>>,
}

impl InMemoryBankLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a bank.
    pub fn insert(&self, name: impl Into<String>, questions: Vec<QuestionRecord>) {
        if let Ok(mut guard) = self.banks.lock() {
            guard.insert(name.into(), questions);
        }
    }

    #[must_use]
    pub fn load_count(&self, name: &str) -> usize {
        self.loads
            .lock()
            .map(|guard| guard.get(name).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl QuestionBankLoader for InMemoryBankLoader {
    async fn load(&self, name: &str) -> Result<LoadedBank, BankLoadError> {
        if let Ok(mut loads) = self.loads.lock() {
            *loads.entry(name.to_owned()).or_default() += 1;
        }
        let questions = self
            .banks
            .lock()
            .ok()
            .and_then(|guard| guard.get(name).cloned())
            .ok_or_else(|| BankLoadError::NotFound {
                name: name.to_owned(),
            })?;
        Ok(LoadedBank {
            id: BankId::new(name),
            questions,
        })
    }
}
