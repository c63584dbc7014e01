use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::answer::AnsweredEntry;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionReportError {
    #[error("finished_at is before started_at")]
    InvalidTimeRange,
}

/// Results of a finished run, derived from its answer log.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    correct_count: usize,
    total: usize,
    missed: Vec<AnsweredEntry>,
}

impl SessionReport {
    /// Build a report from the answers logged during a run.
    ///
    /// # Errors
    ///
    /// Returns `SessionReportError::InvalidTimeRange` if `finished_at` is before `started_at`.
    pub fn from_answers(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        answers: &[AnsweredEntry],
    ) -> Result<Self, SessionReportError> {
        if finished_at < started_at {
            return Err(SessionReportError::InvalidTimeRange);
        }

        let correct_count = answers.iter().filter(|a| a.is_correct).count();
        let missed = answers.iter().filter(|a| !a.is_correct).cloned().collect();

        Ok(Self {
            started_at,
            finished_at,
            correct_count,
            total: answers.len(),
            missed,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    /// Number of answered questions; less than the run length after early termination.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Percentage of correct answers, `None` when nothing was answered.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.correct_count as f64 / self.total as f64 * 100.0)
    }

    #[must_use]
    pub fn score(&self) -> Score {
        match self.percentage() {
            Some(percent) => Score::Percent(percent),
            None => Score::NoAnswers,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn elapsed_minutes(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 60_000.0
    }

    /// Wrong answers in the order they were given.
    #[must_use]
    pub fn missed(&self) -> &[AnsweredEntry] {
        &self.missed
    }
}

/// Displayable score. Renders as `66.67%` or `no answers recorded`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Percent(f64),
    NoAnswers,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Percent(percent) => write!(f, "{percent:.2}%"),
            Score::NoAnswers => f.write_str("no answers recorded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionNumber;
    use crate::time::fixed_now;

    fn entry(number: u64, is_correct: bool) -> AnsweredEntry {
        AnsweredEntry {
            question_number: QuestionNumber::new(number),
            question_text: format!("Q{number}"),
            correct_answer: "A".into(),
            selected_answer: if is_correct { "A".into() } else { "B".into() },
            is_correct,
        }
    }

    #[test]
    fn report_counts_and_orders_missed() {
        let now = fixed_now();
        let answers = vec![entry(1, false), entry(2, true), entry(3, false)];
        let report =
            SessionReport::from_answers(now, now + chrono::Duration::seconds(90), &answers)
                .unwrap();

        assert_eq!(report.correct_count(), 1);
        assert_eq!(report.total(), 3);
        let missed: Vec<_> = report.missed().iter().map(|a| a.question_number.value()).collect();
        assert_eq!(missed, vec![1, 3]);
        assert!((report.elapsed_minutes() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_log_has_no_percentage() {
        let now = fixed_now();
        let report = SessionReport::from_answers(now, now, &[]).unwrap();
        assert_eq!(report.total(), 0);
        assert_eq!(report.percentage(), None);
        assert_eq!(report.score().to_string(), "no answers recorded");
    }

    #[test]
    fn score_formats_two_decimals() {
        let now = fixed_now();
        let answers = vec![entry(1, true), entry(2, false), entry(3, true)];
        let report = SessionReport::from_answers(now, now, &answers).unwrap();
        assert_eq!(report.score().to_string(), "66.67%");
    }

    #[test]
    fn reversed_time_range_is_rejected() {
        let now = fixed_now();
        let err = SessionReport::from_answers(now, now - chrono::Duration::seconds(1), &[])
            .unwrap_err();
        assert_eq!(err, SessionReportError::InvalidTimeRange);
    }
}
