use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::service::AdvanceTicket;

/// Events produced outside of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    AdvanceDue(AdvanceTicket),
}

/// Owns at most one pending auto-advance.
///
/// Scheduling replaces (and aborts) any previous timer; dropping the handle
/// cancels whatever is pending.
#[derive(Debug, Default)]
pub struct AdvanceTimer {
    pending: Option<(AdvanceTicket, JoinHandle<()>)>,
}

impl AdvanceTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `QuizEvent::AdvanceDue(ticket)` on `events` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(
        &mut self,
        ticket: AdvanceTicket,
        delay: Duration,
        events: UnboundedSender<QuizEvent>,
    ) {
        if self.cancel() {
            tracing::debug!("replaced a pending advance");
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the front-end shut down.
            let _ = events.send(QuizEvent::AdvanceDue(ticket));
        });
        self.pending = Some((ticket, handle));
    }

    /// Abort the pending advance. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Ticket of the scheduled advance, if any.
    #[must_use]
    pub fn pending(&self) -> Option<AdvanceTicket> {
        self.pending.as_ref().map(|(ticket, _)| *ticket)
    }

    /// Forget the timer for `ticket` once its event has been received.
    ///
    /// Returns false for a ticket that is not the pending one.
    pub fn fired(&mut self, ticket: AdvanceTicket) -> bool {
        if self.pending() == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Drop for AdvanceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
