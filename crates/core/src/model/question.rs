use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionNumber;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question number must be > 0")]
    InvalidNumber,
}

//
// ─── QUESTION RECORD ───────────────────────────────────────────────────────────
//

/// One multiple-choice question from a bank.
///
/// The four answer strings are kept verbatim. If the source repeats a string,
/// it is offered twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    number: QuestionNumber,
    text: String,
    correct_answer: String,
    distractors: [String; 3],
}

impl QuestionRecord {
    /// Creates a question record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidNumber` if `number` is zero.
    pub fn new(
        number: QuestionNumber,
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        distractor1: impl Into<String>,
        distractor2: impl Into<String>,
        distractor3: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        if number.value() == 0 {
            return Err(QuestionError::InvalidNumber);
        }

        Ok(Self {
            number,
            text: text.into(),
            correct_answer: correct_answer.into(),
            distractors: [distractor1.into(), distractor2.into(), distractor3.into()],
        })
    }

    #[must_use]
    pub fn number(&self) -> QuestionNumber {
        self.number
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn distractors(&self) -> &[String; 3] {
        &self.distractors
    }

    /// All four answers in source order, correct answer first.
    #[must_use]
    pub fn answers(&self) -> [&str; 4] {
        [
            self.correct_answer.as_str(),
            self.distractors[0].as_str(),
            self.distractors[1].as_str(),
            self.distractors[2].as_str(),
        ]
    }

    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}
