use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionNumber;
use crate::model::question::QuestionRecord;

/// Record of a single answered question within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredEntry {
    pub question_number: QuestionNumber,
    pub question_text: String,
    pub correct_answer: String,
    pub selected_answer: String,
    pub is_correct: bool,
}

impl AnsweredEntry {
    /// Score `selected` against `question`.
    #[must_use]
    pub fn score(question: &QuestionRecord, selected: impl Into<String>) -> Self {
        let selected_answer = selected.into();
        Self {
            question_number: question.number(),
            question_text: question.text().to_owned(),
            correct_answer: question.correct_answer().to_owned(),
            is_correct: question.is_correct(&selected_answer),
            selected_answer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_marks_wrong_answer() {
        let q = QuestionRecord::new(QuestionNumber::new(7), "2 + 2", "4", "3", "5", "22").unwrap();
        let entry = AnsweredEntry::score(&q, "22");
        assert_eq!(entry.question_number, QuestionNumber::new(7));
        assert_eq!(entry.correct_answer, "4");
        assert_eq!(entry.selected_answer, "22");
        assert!(!entry.is_correct);
    }
}
