//! # offermatch-gateway
//!
//! Clients for the two external systems OfferMatch depends on:
//!
//! - [`TradingPlatform`]: account registration, offer publish/take, and
//!   payment-state transitions. [`BisqHttpClient`] speaks the Bisq REST API.
//! - [`LedgerVerifier`]: transaction lookup. [`EthplorerClient`] queries the
//!   Ethplorer explorer.
//!
//! Both traits are the seam the orchestrator is generic over. With the
//! `test-helpers` feature, [`mock`] provides recording doubles.

mod http;

pub mod bisq;
pub mod ethplorer;
pub mod ledger;
pub mod platform;

#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

pub use bisq::BisqHttpClient;
pub use ethplorer::EthplorerClient;
pub use ledger::{LedgerVerifier, TransactionInfo};
pub use platform::{
    OfferDetail, OfferToCreate, OfferToTake, PaymentAccount, TradeDetails, TradingPlatform,
};
