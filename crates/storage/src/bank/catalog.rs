use std::path::{Path, PathBuf};

use thiserror::Error;

/// File listing the predefined banks inside a banks directory.
pub const CATALOG_FILE: &str = "index.json";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Names of the predefined question banks. Display only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankCatalog {
    names: Vec<String>,
}

impl BankCatalog {
    /// Read `index.json` (a JSON array of file names) from `dir`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file is missing, unreadable or not a string array.
    pub async fn load(dir: &Path) -> Result<Self, CatalogError> {
        let path = dir.join(CATALOG_FILE);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| CatalogError::Read {
                path: path.clone(),
                source,
            })?;
        let names = serde_json::from_slice(&bytes)
            .map_err(|source| CatalogError::Parse { path, source })?;
        Ok(Self { names })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
