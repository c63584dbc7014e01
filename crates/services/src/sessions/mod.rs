mod progress;
mod service;
mod timer;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{AdvanceOutcome, AdvanceTicket, AnswerOutcome, QuizSession, SessionPhase};
pub use timer::{AdvanceTimer, QuizEvent};
pub use view::{OptionHint, OptionView, QuestionView, QuizState};
pub use workflow::{QuizController, StartMode};
