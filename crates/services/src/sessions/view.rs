use quiz_core::model::QuestionNumber;

use super::service::{QuizSession, SessionPhase};

/// Coarse state for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Idle,
    Presenting,
    Revealing,
    Finished,
}

impl From<SessionPhase> for QuizState {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Presenting => QuizState::Presenting,
            SessionPhase::Revealing => QuizState::Revealing,
            SessionPhase::Finished => QuizState::Finished,
        }
    }
}

/// Styling hint for an option, derived once an answer is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionHint {
    /// Nothing selected yet.
    Neutral,
    /// The correct answer.
    Correct,
    /// The selected answer, when wrong.
    Wrong,
    /// Any other option after a selection.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub text: String,
    pub hint: OptionHint,
}

/// Everything needed to draw the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub state: QuizState,
    /// 1-based position within the run.
    pub position: usize,
    pub total: usize,
    pub number: QuestionNumber,
    pub text: String,
    pub options: Vec<OptionView>,
    pub selection: Option<String>,
}

impl QuestionView {
    /// Project a running session. `None` once it has finished.
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        let question = session.current_question()?;
        let selection = session.selection();

        let options = session
            .options()
            .iter()
            .map(|text| {
                let hint = match selection {
                    None => OptionHint::Neutral,
                    Some(_) if question.is_correct(text) => OptionHint::Correct,
                    Some(selected) if selected == text => OptionHint::Wrong,
                    Some(_) => OptionHint::Disabled,
                };
                OptionView {
                    text: text.clone(),
                    hint,
                }
            })
            .collect();

        let progress = session.progress();
        Some(Self {
            state: session.phase().into(),
            position: progress.position,
            total: progress.total,
            number: question.number(),
            text: question.text().to_owned(),
            options,
            selection: selection.map(str::to_owned),
        })
    }
}
