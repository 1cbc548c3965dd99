//! Error types for the OfferMatch exchange.
//!
//! All errors use the `OFM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Offer / input validation errors
//! - 2xx: Settlement verification errors
//! - 3xx: Orchestration / internal state errors
//! - 7xx: External service errors
//! - 9xx: General errors
//!
//! "No match found" is not an error: it is the normal
//! `SubmitOutcome::Queued` outcome of a submission.

use std::fmt;

use thiserror::Error;

use crate::{MatchId, TradeId, TxId};

/// The external system an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalService {
    /// The decentralized trading platform (accounts, offers, trades).
    TradingPlatform,
    /// The blockchain explorer used to verify payments.
    Ledger,
}

impl fmt::Display for ExternalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TradingPlatform => write!(f, "trading platform"),
            Self::Ledger => write!(f, "ledger"),
        }
    }
}

/// Which end of a payment transaction failed address verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressRole {
    Sender,
    Receiver,
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sender => write!(f, "sender"),
            Self::Receiver => write!(f, "receiver"),
        }
    }
}

/// Central error enum for all OfferMatch operations.
#[derive(Debug, Error)]
pub enum OffermatchError {
    // =================================================================
    // Offer / Validation Errors (1xx)
    // =================================================================
    /// The submitted offer is malformed.
    #[error("OFM_ERR_100: Invalid offer: {reason}")]
    InvalidOffer { reason: String },

    /// A required request parameter was not supplied.
    #[error("OFM_ERR_101: Missing parameter: {0}")]
    MissingParameter(&'static str),

    // =================================================================
    // Settlement Verification Errors (2xx)
    // =================================================================
    /// The ledger reports the claimed transaction did not succeed.
    #[error("OFM_ERR_200: Transaction {tx_id} did not complete successfully")]
    TransactionIncomplete { tx_id: TxId },

    /// The claimed transaction moved funds between the wrong wallets.
    #[error("OFM_ERR_201: Transaction {role} address is incorrect: expected {expected}, got {actual}")]
    AddressMismatch {
        role: AddressRole,
        expected: String,
        actual: String,
    },

    /// Payment for this trade has already been acknowledged.
    #[error("OFM_ERR_202: Trade already settled: {0}")]
    TradeAlreadySettled(TradeId),

    /// The transaction was already used to release another payment.
    #[error("OFM_ERR_203: Transaction already claimed: {0}")]
    TransactionAlreadyClaimed(TxId),

    // =================================================================
    // Orchestration / State Errors (3xx)
    // =================================================================
    /// A binding or trade that an earlier step should have recorded is missing.
    #[error("OFM_ERR_300: Internal state error: {reason}")]
    InternalState { reason: String },

    /// No settlement journal entry exists for this match.
    #[error("OFM_ERR_301: Match not found: {0}")]
    MatchNotFound(MatchId),

    // =================================================================
    // External Service Errors (7xx)
    // =================================================================
    /// The service answered with a non-success status.
    #[error("OFM_ERR_700: {service} responded with status {status}: {body}")]
    ServiceStatus {
        service: ExternalService,
        status: u16,
        body: String,
    },

    /// The request never produced a response (connect, timeout, TLS...).
    #[error("OFM_ERR_701: {service} transport failure: {reason}")]
    ServiceTransport {
        service: ExternalService,
        reason: String,
    },

    /// The service answered 2xx but the body could not be decoded.
    #[error("OFM_ERR_702: {service} returned a malformed response: {reason}")]
    MalformedResponse {
        service: ExternalService,
        reason: String,
    },

    // =================================================================
    // General (9xx)
    // =================================================================
    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("OFM_ERR_900: Configuration error: {0}")]
    Configuration(String),
}

impl OffermatchError {
    /// Shorthand for [`OffermatchError::InternalState`].
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::InternalState {
            reason: reason.into(),
        }
    }

    /// The external service this error came from, if any.
    #[must_use]
    pub fn service(&self) -> Option<ExternalService> {
        match self {
            Self::ServiceStatus { service, .. }
            | Self::ServiceTransport { service, .. }
            | Self::MalformedResponse { service, .. } => Some(*service),
            _ => None,
        }
    }

    /// `true` for failures talking to the trading platform.
    #[must_use]
    pub fn is_gateway(&self) -> bool {
        self.service() == Some(ExternalService::TradingPlatform)
    }

    /// `true` for failures talking to the ledger explorer.
    #[must_use]
    pub fn is_ledger(&self) -> bool {
        self.service() == Some(ExternalService::Ledger)
    }

    /// `true` when the caller's input was rejected rather than the system failing.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidOffer { .. }
                | Self::MissingParameter(_)
                | Self::TransactionIncomplete { .. }
                | Self::AddressMismatch { .. }
                | Self::TradeAlreadySettled(_)
                | Self::TransactionAlreadyClaimed(_)
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OffermatchError>;
