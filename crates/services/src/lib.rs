#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod problem_tracker;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, SessionError};
pub use problem_tracker::{ProblemTracker, RecordedOutcome};

pub use sessions::{
    AdvanceOutcome, AdvanceTicket, AnswerOutcome, OptionHint, OptionView, QuestionView,
    QuizController, QuizEvent, QuizSession, QuizState, SessionPhase, SessionProgress, StartMode,
};
