//! # offermatch-types
//!
//! Shared types, errors, and configuration for the **OfferMatch** exchange.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`SubmitterId`], [`AccountId`], [`PlatformOfferId`], [`TradeId`], [`TxId`], [`MatchId`]
//! - **Offer model**: [`Offer`], [`OfferRequest`], [`Direction`]
//! - **Bindings**: [`PaymentAccountBinding`]
//! - **Trade model**: [`TradeRecord`], [`TradeState`]
//! - **Settlement journal**: [`MatchProgress`], [`SettlementStep`], [`StepFailure`]
//! - **Configuration**: [`ExchangeConfig`], [`PlatformConfig`], [`LedgerConfig`], [`AddressPolicy`]
//! - **Errors**: [`OffermatchError`] with `OFM_ERR_` prefix codes
//! - **Constants**: defaults for the external services

pub mod account;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod offer;
pub mod progress;
pub mod trade;

pub use account::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use offer::*;
pub use progress::*;
pub use trade::*;

// Constants are accessed via `offermatch_types::constants::FOO`.
