//! # offermatch-settlement
//!
//! Turns matched offers into platform trades and releases payment once a
//! claimed ledger transaction checks out.
//!
//! ## Architecture
//!
//! An [`Orchestrator`] owns one [`ExchangeState`] (book, bindings, trades,
//! settlement journal, claimed transactions) behind a single lock and is
//! generic over the platform and ledger clients:
//! 1. `submit`: match or book atomically, then drive a match to a trade
//! 2. `resume`: continue a stalled match from its journal
//! 3. `verify_and_settle`: verify a payment, then advance the trade
//!
//! [`verify_payment`] and [`ClaimGuard`] are the pure pieces of step 3.

pub mod idempotency;
pub mod journal;
pub mod orchestrator;
pub mod state;
pub mod verifier;

pub use idempotency::ClaimGuard;
pub use journal::{LogStallHook, StallHook};
pub use orchestrator::{Orchestrator, SubmitOutcome};
pub use state::{ExchangeState, Submission};
pub use verifier::{ExpectedTransfer, verify_payment};
