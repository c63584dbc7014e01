use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use std::fmt;

use quiz_core::model::{AnsweredEntry, BankId, QuestionRecord, SessionReport, SessionSettings};
use quiz_core::shuffle::shuffled;

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── PHASES & TRANSITION RESULTS ───────────────────────────────────────────────
//

/// Lifecycle of a started run. `Idle` lives in the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// A question is shown, no selection yet.
    Presenting,
    /// An answer was chosen and scored; the advance is pending.
    Revealing,
    /// Terminal. The report is available.
    Finished,
}

/// Identifies one scheduled advance. A ticket that no longer matches the
/// session's pending advance is stale and does nothing.
///
/// Tickets carry the run they were issued in, so an event queued by an
/// earlier run never matches an advance of a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdvanceTicket {
    run: u64,
    seq: u64,
}

impl AdvanceTicket {
    #[must_use]
    pub fn run(self) -> u64 {
        self.run
    }

    #[must_use]
    pub fn seq(self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The current question already has a selection.
    Ignored,
    /// The answer was logged; advance when `ticket` comes due.
    Scored {
        entry: AnsweredEntry,
        ticket: AdvanceTicket,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Ticket did not match the pending advance.
    Stale,
    /// Next question presented.
    Next,
    /// That was the last question.
    Finished,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through an ordered list of questions.
///
/// All state changes go through `answer`, `advance` and `terminate`; the answer
/// log gets exactly one entry per answered question.
pub struct QuizSession {
    bank_id: BankId,
    questions: Vec<QuestionRecord>,
    current: usize,
    options: Vec<String>,
    selection: Option<String>,
    answers: Vec<AnsweredEntry>,
    phase: SessionPhase,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    pending: Option<AdvanceTicket>,
    run: u64,
    next_ticket: u64,
    rng: StdRng,
}

impl QuizSession {
    /// Start a run over `questions`, already filtered and ordered.
    ///
    /// `start_from` is 1-based and clamped into `[1, len]`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn start(
        bank_id: BankId,
        questions: Vec<QuestionRecord>,
        start_from: u32,
        started_at: DateTime<Utc>,
        rng: StdRng,
    ) -> Result<Self, SessionError> {
        let settings = SessionSettings {
            start_from,
            ..SessionSettings::default()
        };
        let current = settings
            .start_index(questions.len())
            .ok_or(SessionError::Empty)?;

        let mut session = Self {
            bank_id,
            questions,
            current,
            options: Vec::new(),
            selection: None,
            answers: Vec::new(),
            phase: SessionPhase::Presenting,
            started_at,
            finished_at: None,
            pending: None,
            run: 0,
            next_ticket: 0,
            rng,
        };
        session.present_current();
        Ok(session)
    }

    /// Tag every ticket of this session with `run`.
    #[must_use]
    pub fn with_run(mut self, run: u64) -> Self {
        self.run = run;
        self
    }

    #[must_use]
    pub fn run(&self) -> u64 {
        self.run
    }

    #[must_use]
    pub fn bank_id(&self) -> &BankId {
        &self.bank_id
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Questions of this run in presentation order.
    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    /// Zero-based index of the current question.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        if self.is_finished() {
            return None;
        }
        self.questions.get(self.current)
    }

    /// Shuffled answers for the current question, fixed until it is left.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    #[must_use]
    pub fn answers(&self) -> &[AnsweredEntry] {
        &self.answers
    }

    #[must_use]
    pub fn pending_advance(&self) -> Option<AdvanceTicket> {
        self.pending
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            position: self.current + 1,
            total: self.questions.len(),
            answered: self.answers.len(),
            is_finished: self.is_finished(),
        }
    }

    /// Select an answer for the current question.
    ///
    /// A second answer before the advance is ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the run is finished and
    /// `SessionError::UnknownOption` if `answer` is not one of the options.
    pub fn answer(&mut self, answer: &str) -> Result<AnswerOutcome, SessionError> {
        match self.phase {
            SessionPhase::Finished => return Err(SessionError::Completed),
            SessionPhase::Revealing => return Ok(AnswerOutcome::Ignored),
            SessionPhase::Presenting => {}
        }
        if self.selection.is_some() {
            return Ok(AnswerOutcome::Ignored);
        }
        if !self.options.iter().any(|o| o == answer) {
            return Err(SessionError::UnknownOption);
        }
        let question = self
            .questions
            .get(self.current)
            .ok_or(SessionError::Completed)?;

        let entry = AnsweredEntry::score(question, answer);
        self.answers.push(entry.clone());
        self.selection = Some(answer.to_owned());
        self.phase = SessionPhase::Revealing;

        let ticket = AdvanceTicket {
            run: self.run,
            seq: self.next_ticket,
        };
        self.next_ticket += 1;
        self.pending = Some(ticket);

        Ok(AnswerOutcome::Scored { entry, ticket })
    }

    /// Move past a revealed question when its advance comes due.
    pub fn advance(&mut self, ticket: AdvanceTicket, now: DateTime<Utc>) -> AdvanceOutcome {
        if self.phase != SessionPhase::Revealing || self.pending != Some(ticket) {
            return AdvanceOutcome::Stale;
        }
        self.pending = None;
        self.selection = None;

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.present_current();
            self.phase = SessionPhase::Presenting;
            AdvanceOutcome::Next
        } else {
            self.finish(now);
            AdvanceOutcome::Finished
        }
    }

    /// End the run now. The unanswered current question is not logged.
    ///
    /// Returns false if the run had already finished.
    pub fn terminate(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_finished() {
            return false;
        }
        self.pending = None;
        self.finish(now);
        true
    }

    /// Build the report of a finished run.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` while the run is in progress.
    pub fn report(&self) -> Result<SessionReport, SessionError> {
        let finished_at = self.finished_at.ok_or(SessionError::NotFinished)?;
        Ok(SessionReport::from_answers(
            self.started_at,
            finished_at,
            &self.answers,
        )?)
    }

    fn present_current(&mut self) {
        self.options = match self.questions.get(self.current) {
            Some(question) => {
                let answers = question.answers().map(str::to_owned);
                shuffled(&answers, &mut self.rng)
            }
            None => Vec::new(),
        };
    }

    fn finish(&mut self, now: DateTime<Utc>) {
        self.phase = SessionPhase::Finished;
        self.finished_at = Some(now.max(self.started_at));
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("bank_id", &self.bank_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("phase", &self.phase)
            .field("answers_len", &self.answers.len())
            .field("run", &self.run)
            .field("pending", &self.pending)
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
