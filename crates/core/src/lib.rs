#![forbid(unsafe_code)]

pub mod model;
pub mod shuffle;
pub mod time;

use std::time::Duration;

pub use time::Clock;

/// Delay between revealing an answer and moving on to the next question.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(2000);
