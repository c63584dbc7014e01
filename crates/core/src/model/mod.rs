mod answer;
mod ids;
mod problem;
mod question;
mod report;
mod settings;

pub use ids::{BankId, QuestionNumber};

pub use answer::AnsweredEntry;
pub use problem::{MasteryPolicy, MasteryPolicyError, ProblemChange, ProblemStats};
pub use question::{QuestionError, QuestionRecord};
pub use report::{Score, SessionReport, SessionReportError};
pub use settings::SessionSettings;
