use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::MasteryPolicy;
use storage::bank::{BankCatalog, CatalogError, DirectoryBankLoader, QuestionBankLoader};
use storage::repository::Storage;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::Clock;
use crate::error::AppServicesError;
use crate::problem_tracker::ProblemTracker;
use crate::sessions::{QuizController, QuizEvent};

/// Assembles the quiz services over one storage backend and banks directory.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    banks_dir: PathBuf,
    loader: Arc<dyn QuestionBankLoader>,
    tracker: Arc<ProblemTracker>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        banks_dir: impl Into<PathBuf>,
        clock: Clock,
        policy: MasteryPolicy,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, banks_dir, clock, policy).await)
    }

    /// Build services that keep problem stats in memory only.
    pub async fn new_in_memory(
        banks_dir: impl Into<PathBuf>,
        clock: Clock,
        policy: MasteryPolicy,
    ) -> Self {
        Self::from_storage(Storage::in_memory(), banks_dir, clock, policy).await
    }

    pub async fn from_storage(
        storage: Storage,
        banks_dir: impl Into<PathBuf>,
        clock: Clock,
        policy: MasteryPolicy,
    ) -> Self {
        let banks_dir = banks_dir.into();
        let tracker = Arc::new(ProblemTracker::load(storage.problem_stats(), policy).await);
        let loader: Arc<dyn QuestionBankLoader> =
            Arc::new(DirectoryBankLoader::new(banks_dir.clone()));

        Self {
            clock,
            banks_dir,
            loader,
            tracker,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> Arc<ProblemTracker> {
        Arc::clone(&self.tracker)
    }

    #[must_use]
    pub fn loader(&self) -> Arc<dyn QuestionBankLoader> {
        Arc::clone(&self.loader)
    }

    /// Read the bank catalog of the banks directory.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if `index.json` is missing or malformed.
    pub async fn catalog(&self) -> Result<BankCatalog, CatalogError> {
        BankCatalog::load(&self.banks_dir).await
    }

    /// A fresh controller sharing this loader and tracker.
    #[must_use]
    pub fn controller(&self) -> (QuizController, UnboundedReceiver<QuizEvent>) {
        QuizController::new(self.loader(), self.tracker(), self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::BankId;
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn controllers_share_the_tracker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.csv"),
            "number,question,correct,option2,option3,option4\n1,Q1,A,B,C,D\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("index.json"), r#"["a.csv"]"#).unwrap();

        let services = AppServices::new_in_memory(
            dir.path(),
            Clock::fixed(fixed_now()),
            MasteryPolicy::default(),
        )
        .await;
        assert_eq!(services.catalog().await.unwrap().names(), ["a.csv"]);

        let (mut controller, _rx) = services.controller();
        controller.load_bank("a.csv").await.unwrap();
        controller.start(crate::StartMode::All).unwrap();
        controller.answer("B").await.unwrap();

        let (other, _rx) = services.controller();
        assert_eq!(other.tracker().count_for(&BankId::new("a.csv")), 1);
    }
}
