//! Stall notification for the settlement journal.

use offermatch_types::{MatchProgress, OffermatchError};

/// Notified whenever a match stops short of a platform trade.
///
/// Called outside the state lock. The journal entry already carries the
/// failure, so `resume` can pick up from `progress.next_step()`.
pub trait StallHook: Send + Sync {
    fn on_stall(&self, progress: &MatchProgress, error: &OffermatchError);
}

/// Default hook: a `warn!` event per stall.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStallHook;

impl StallHook for LogStallHook {
    fn on_stall(&self, progress: &MatchProgress, error: &OffermatchError) {
        tracing::warn!(
            match_id = %progress.match_id,
            buyer = %progress.buy.submitter,
            seller = %progress.sell.submitter,
            step = ?progress.next_step(),
            attempts = progress.attempts,
            %error,
            "match stalled before trade was taken"
        );
    }
}
