//! SQLite URL handling for the `--db` option.

use std::fmt;
use std::path::{Path, PathBuf};

pub const MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug)]
pub enum DbUrlError {
    Invalid { raw: String },
    Io(std::io::Error),
}

impl fmt::Display for DbUrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbUrlError::Invalid { raw } => write!(f, "invalid --db value: {raw}"),
            DbUrlError::Io(err) => write!(f, "cannot create database file: {err}"),
        }
    }
}

impl std::error::Error for DbUrlError {}

impl From<std::io::Error> for DbUrlError {
    fn from(err: std::io::Error) -> Self {
        DbUrlError::Io(err)
    }
}

/// Turn a bare path or `sqlite:` path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == MEMORY_URL || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its directory exist before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), DbUrlError> {
    if db_url == MEMORY_URL {
        return Ok(());
    }

    let invalid = || DbUrlError::Invalid {
        raw: db_url.to_owned(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_and_full_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), MEMORY_URL);
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/q.db"),
            "sqlite:///tmp/q.db"
        );
    }

    #[test]
    fn bare_paths_become_absolute() {
        assert_eq!(normalize_sqlite_url("/var/q.db"), "sqlite:///var/q.db");
        let relative = normalize_sqlite_url("sqlite:q.db");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("/q.db"));
    }

    #[test]
    fn prepare_rejects_non_sqlite_urls() {
        assert!(matches!(
            prepare_sqlite_file("postgres://x"),
            Err(DbUrlError::Invalid { .. })
        ));
        assert!(prepare_sqlite_file(MEMORY_URL).is_ok());
    }
}
