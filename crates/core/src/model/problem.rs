use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::ids::{BankId, QuestionNumber};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MasteryPolicyError {
    #[error("mastery threshold must be > 0")]
    InvalidThreshold,
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// How many consecutive correct answers take a question out of the problem set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasteryPolicy {
    threshold: u32,
}

impl MasteryPolicy {
    pub const DEFAULT_THRESHOLD: u32 = 2;

    /// # Errors
    ///
    /// Returns `MasteryPolicyError::InvalidThreshold` if `threshold` is zero.
    pub fn new(threshold: u32) -> Result<Self, MasteryPolicyError> {
        if threshold == 0 {
            return Err(MasteryPolicyError::InvalidThreshold);
        }
        Ok(Self { threshold })
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Default for MasteryPolicy {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

//
// ─── STREAK CHANGES ────────────────────────────────────────────────────────────
//

/// What a single scored answer did to the problem set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemChange {
    /// Correct answer on a question that is not tracked.
    Untracked,
    /// First miss: the question entered the problem set.
    Tracked,
    /// Miss on a tracked question: streak back to zero.
    Reset,
    /// Correct answer on a tracked question below the threshold.
    Advanced { streak: u32 },
    /// Threshold reached: the question left the problem set.
    Mastered,
}

//
// ─── PROBLEM STATS ─────────────────────────────────────────────────────────────
//

/// Persistent mapping `bank -> (question number -> correct-answer streak)`.
///
/// A missing entry means the question is not a problem. Serializes as
/// `{ "<bank>": { "<number>": streak } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemStats {
    banks: BTreeMap<BankId, BTreeMap<QuestionNumber, u32>>,
}

impl ProblemStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the streak rule for one scored answer.
    pub fn record_outcome(
        &mut self,
        bank: &BankId,
        number: QuestionNumber,
        is_correct: bool,
        policy: &MasteryPolicy,
    ) -> ProblemChange {
        let streaks = self.banks.entry(bank.clone()).or_default();

        if !is_correct {
            return match streaks.insert(number, 0) {
                Some(_) => ProblemChange::Reset,
                None => ProblemChange::Tracked,
            };
        }

        let Some(streak) = streaks.get_mut(&number) else {
            return ProblemChange::Untracked;
        };
        *streak = streak.saturating_add(1);
        if *streak >= policy.threshold() {
            streaks.remove(&number);
            ProblemChange::Mastered
        } else {
            ProblemChange::Advanced { streak: *streak }
        }
    }

    /// Current streak for a tracked question.
    #[must_use]
    pub fn streak(&self, bank: &BankId, number: QuestionNumber) -> Option<u32> {
        self.banks.get(bank)?.get(&number).copied()
    }

    #[must_use]
    pub fn is_tracked(&self, bank: &BankId, number: QuestionNumber) -> bool {
        self.streak(bank, number).is_some()
    }

    /// Number of tracked questions for `bank`.
    #[must_use]
    pub fn count_for(&self, bank: &BankId) -> usize {
        self.banks.get(bank).map_or(0, BTreeMap::len)
    }

    /// Tracked question numbers for `bank`, ascending.
    pub fn tracked(&self, bank: &BankId) -> impl Iterator<Item = (QuestionNumber, u32)> + '_ {
        self.banks
            .get(bank)
            .into_iter()
            .flat_map(|streaks| streaks.iter().map(|(n, s)| (*n, *s)))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
