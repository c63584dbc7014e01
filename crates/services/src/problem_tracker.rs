use std::sync::{Mutex, MutexGuard, PoisonError};

use quiz_core::model::{
    BankId, MasteryPolicy, ProblemChange, ProblemStats, QuestionNumber, QuestionRecord,
};
use storage::repository::ProblemStatsStore;

/// Result of recording one scored answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedOutcome {
    pub change: ProblemChange,
    /// False when the write-back failed; the in-memory change still applies.
    pub persisted: bool,
}

/// Tracks repeatedly missed questions per bank and writes every change through.
///
/// Storage failures never surface as errors: an unreadable record starts the
/// tracker empty, a failed write is logged and the in-memory state is kept.
pub struct ProblemTracker {
    store: ProblemStatsStore,
    policy: MasteryPolicy,
    stats: Mutex<ProblemStats>,
}

impl ProblemTracker {
    /// Load persisted stats, degrading to an empty mapping on read failure.
    pub async fn load(store: ProblemStatsStore, policy: MasteryPolicy) -> Self {
        let stats = match store.load().await {
            Ok(stats) => stats,
            Err(err) => {
                tracing::warn!(error = %err, "problem stats unreadable, starting empty");
                ProblemStats::new()
            }
        };

        Self {
            store,
            policy,
            stats: Mutex::new(stats),
        }
    }

    #[must_use]
    pub fn policy(&self) -> MasteryPolicy {
        self.policy
    }

    /// Apply the streak rule and persist the whole mapping before returning.
    pub async fn record_outcome(
        &self,
        bank: &BankId,
        number: QuestionNumber,
        is_correct: bool,
    ) -> RecordedOutcome {
        let (change, snapshot) = {
            let mut stats = self.lock();
            let change = stats.record_outcome(bank, number, is_correct, &self.policy);
            (change, stats.clone())
        };
        tracing::debug!(%bank, %number, is_correct, ?change, "problem stats updated");

        let persisted = match self.store.save(&snapshot).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, %bank, "problem stats not persisted");
                false
            }
        };

        RecordedOutcome { change, persisted }
    }

    /// Questions of `bank` that are currently tracked, in bank order.
    #[must_use]
    pub fn problem_set_for(
        &self,
        bank: &BankId,
        questions: &[QuestionRecord],
    ) -> Vec<QuestionRecord> {
        let stats = self.lock();
        questions
            .iter()
            .filter(|q| stats.is_tracked(bank, q.number()))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn count_for(&self, bank: &BankId) -> usize {
        self.lock().count_for(bank)
    }

    #[must_use]
    pub fn snapshot(&self) -> ProblemStats {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ProblemStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
