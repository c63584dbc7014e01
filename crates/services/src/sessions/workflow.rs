use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use quiz_core::model::{SessionReport, SessionSettings};
use quiz_core::shuffle::shuffled;
use quiz_core::{AUTO_ADVANCE_DELAY, Clock};
use storage::bank::{LoadedBank, QuestionBankLoader};

use super::service::{AdvanceOutcome, AdvanceTicket, AnswerOutcome, QuizSession, SessionPhase};
use super::timer::{AdvanceTimer, QuizEvent};
use super::view::{QuestionView, QuizState};
use crate::error::SessionError;
use crate::problem_tracker::ProblemTracker;

/// Which questions of the loaded bank a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    #[default]
    All,
    /// Only questions currently tracked as problems.
    ProblemsOnly,
}

/// Drives the quiz for one front-end: holds the loaded bank while idle, the
/// running session, and the single pending auto-advance.
///
/// Timer events arrive on the receiver returned by [`QuizController::new`]
/// and must be fed back through [`QuizController::on_advance_due`].
pub struct QuizController {
    loader: Arc<dyn QuestionBankLoader>,
    tracker: Arc<ProblemTracker>,
    clock: Clock,
    settings: SessionSettings,
    advance_delay: Duration,
    source: Option<String>,
    bank: Option<LoadedBank>,
    session: Option<QuizSession>,
    timer: AdvanceTimer,
    events: UnboundedSender<QuizEvent>,
    runs_started: u64,
    rng: StdRng,
}

impl QuizController {
    #[must_use]
    pub fn new(
        loader: Arc<dyn QuestionBankLoader>,
        tracker: Arc<ProblemTracker>,
        clock: Clock,
    ) -> (Self, UnboundedReceiver<QuizEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            loader,
            tracker,
            clock,
            settings: SessionSettings::default(),
            advance_delay: AUTO_ADVANCE_DELAY,
            source: None,
            bank: None,
            session: None,
            timer: AdvanceTimer::new(),
            events,
            runs_started: 0,
            rng: StdRng::from_rng(&mut rand::rng()),
        };
        (controller, rx)
    }

    #[must_use]
    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    /// Make question and option order reproducible.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Preferences for the next start. Kept across restarts.
    pub fn settings_mut(&mut self) -> &mut SessionSettings {
        &mut self.settings
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn tracker(&self) -> &Arc<ProblemTracker> {
        &self.tracker
    }

    #[must_use]
    pub fn bank(&self) -> Option<&LoadedBank> {
        self.bank.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        self.session
            .as_ref()
            .map_or(QuizState::Idle, |s| s.phase().into())
    }

    /// True when idle with a non-empty bank.
    #[must_use]
    pub fn can_start(&self) -> bool {
        self.state() == QuizState::Idle && self.bank.as_ref().is_some_and(|b| !b.is_empty())
    }

    /// Tracked problem questions for the loaded bank.
    #[must_use]
    pub fn problem_count(&self) -> usize {
        self.bank
            .as_ref()
            .map_or(0, |bank| self.tracker.count_for(&bank.id))
    }

    /// Load a bank, replacing the current one and returning to idle.
    ///
    /// A failed load leaves everything as it was.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InProgress` while a run is active and
    /// `SessionError::Load` if the bank cannot be loaded.
    pub async fn load_bank(&mut self, name: &str) -> Result<&LoadedBank, SessionError> {
        if self.is_running() {
            return Err(SessionError::InProgress);
        }
        let bank = self.loader.load(name).await.inspect_err(|err| {
            tracing::warn!(bank = name, error = %err, "bank load failed");
        })?;
        tracing::info!(bank = %bank.id, questions = bank.len(), "bank loaded");

        self.timer.cancel();
        self.session = None;
        self.source = Some(name.to_owned());
        Ok(&*self.bank.insert(bank))
    }

    /// Start a run from idle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoBank` without a bank, `SessionError::InProgress`
    /// or `SessionError::Completed` when not idle, and `SessionError::Empty`
    /// when the selected questions are empty.
    pub fn start(&mut self, mode: StartMode) -> Result<&QuizSession, SessionError> {
        match self.state() {
            QuizState::Idle => {}
            QuizState::Finished => return Err(SessionError::Completed),
            QuizState::Presenting | QuizState::Revealing => return Err(SessionError::InProgress),
        }
        let bank = self.bank.as_ref().ok_or(SessionError::NoBank)?;

        let mut questions = match mode {
            StartMode::All => bank.questions.clone(),
            StartMode::ProblemsOnly => self.tracker.problem_set_for(&bank.id, &bank.questions),
        };
        if self.settings.randomize {
            questions = shuffled(&questions, &mut self.rng);
        }

        let session = QuizSession::start(
            bank.id.clone(),
            questions,
            self.settings.start_from,
            self.clock.now(),
            StdRng::from_rng(&mut self.rng),
        )?
        .with_run(self.runs_started + 1);
        self.runs_started += 1;
        tracing::info!(
            bank = %session.bank_id(),
            ?mode,
            run = session.run(),
            questions = session.questions().len(),
            start = session.current_index() + 1,
            "session started"
        );
        Ok(&*self.session.insert(session))
    }

    /// Answer the current question, record the outcome and schedule the advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` without a session, plus the errors
    /// of [`QuizSession::answer`].
    pub async fn answer(&mut self, answer: &str) -> Result<AnswerOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NotRunning)?;
        let outcome = session.answer(answer)?;

        if let AnswerOutcome::Scored { entry, ticket } = &outcome {
            let bank = session.bank_id().clone();
            tracing::info!(
                %bank,
                number = %entry.question_number,
                correct = entry.is_correct,
                "answer scored"
            );
            self.tracker
                .record_outcome(&bank, entry.question_number, entry.is_correct)
                .await;
            self.timer
                .schedule(*ticket, self.advance_delay, self.events.clone());
        }

        Ok(outcome)
    }

    /// Answer with the option at `index` of the current option set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownOption` for an out-of-range index, plus the
    /// errors of [`QuizController::answer`].
    pub async fn answer_option(&mut self, index: usize) -> Result<AnswerOutcome, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotRunning)?;
        let option = session
            .options()
            .get(index)
            .cloned()
            .ok_or(SessionError::UnknownOption)?;
        self.answer(&option).await
    }

    /// Handle a timer event. Stale tickets are ignored.
    pub fn on_advance_due(&mut self, ticket: AdvanceTicket) -> AdvanceOutcome {
        if !self.timer.fired(ticket) {
            return AdvanceOutcome::Stale;
        }
        let Some(session) = self.session.as_mut() else {
            return AdvanceOutcome::Stale;
        };
        let outcome = session.advance(ticket, self.clock.now());
        if outcome == AdvanceOutcome::Finished {
            tracing::info!(answered = session.answers().len(), "session finished");
        }
        outcome
    }

    /// Dispatch an event from the controller's channel.
    pub fn handle_event(&mut self, event: QuizEvent) -> AdvanceOutcome {
        match event {
            QuizEvent::AdvanceDue(ticket) => self.on_advance_due(ticket),
        }
    }

    /// Finish the run now, cancelling any pending advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` unless a run is presenting or revealing.
    pub fn terminate(&mut self) -> Result<&QuizSession, SessionError> {
        if !self.is_running() {
            return Err(SessionError::NotRunning);
        }
        self.timer.cancel();
        let now = self.clock.now();
        let session = self.session.as_mut().ok_or(SessionError::NotRunning)?;
        session.terminate(now);
        tracing::info!(answered = session.answers().len(), "session terminated early");
        Ok(&*session)
    }

    /// Drop the session and return to idle with the bank reloaded from its source.
    ///
    /// Settings are kept. If the reload fails the previous bank stays loaded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` if the bank cannot be reloaded.
    pub async fn restart(&mut self) -> Result<(), SessionError> {
        self.timer.cancel();
        self.session = None;

        let Some(source) = self.source.clone() else {
            return Ok(());
        };
        let bank = self.loader.load(&source).await.inspect_err(|err| {
            tracing::warn!(bank = %source, error = %err, "bank reload failed");
        })?;
        self.bank = Some(bank);
        Ok(())
    }

    /// Projection of the current question, if a run is active.
    #[must_use]
    pub fn view(&self) -> Option<QuestionView> {
        self.session.as_ref().and_then(QuestionView::from_session)
    }

    /// Report of the finished run.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` without a session and
    /// `SessionError::NotFinished` while it is still running.
    pub fn report(&self) -> Result<SessionReport, SessionError> {
        self.session
            .as_ref()
            .ok_or(SessionError::NotRunning)?
            .report()
    }

    fn is_running(&self) -> bool {
        matches!(
            self.session.as_ref().map(QuizSession::phase),
            Some(SessionPhase::Presenting | SessionPhase::Revealing)
        )
    }
}
