//! Trade records.
//!
//! A [`TradeRecord`] is the canonical representation of a trade the
//! platform is executing between two matched submitters. It is created when
//! the seller takes the buyer's published offer and is indexed under both
//! parties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MatchId, SubmitterId, TradeId};

/// Local view of how far a trade's payment has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeState {
    /// Offer taken on the platform; awaiting proof of payment.
    Taken,
    /// The platform acknowledged "payment started".
    PaymentStarted,
    /// The platform acknowledged "payment received". Terminal.
    PaymentReceived,
    /// A payment-state transition was refused by the platform.
    Failed,
}

impl std::fmt::Display for TradeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Taken => write!(f, "TAKEN"),
            Self::PaymentStarted => write!(f, "PAYMENT_STARTED"),
            Self::PaymentReceived => write!(f, "PAYMENT_RECEIVED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// The canonical trade, as adopted from the platform's take-offer response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Platform-assigned trade identifier.
    pub trade_id: TradeId,
    /// The local match this trade settles.
    pub match_id: MatchId,
    pub buyer: SubmitterId,
    pub seller: SubmitterId,
    pub amount: i64,
    pub price: i64,
    /// Platform fee transaction (taker fee), if reported.
    pub fee_tx_id: Option<String>,
    /// Platform payout transaction, if reported.
    pub payout_tx_id: Option<String>,
    /// Raw state string last reported by the platform.
    pub platform_state: String,
    pub state: TradeState,
    pub taken_at: DateTime<Utc>,
}

impl TradeRecord {
    /// The other party to this trade, or `None` if `submitter` is not a party.
    #[must_use]
    pub fn counterparty_of(&self, submitter: &SubmitterId) -> Option<&SubmitterId> {
        if *submitter == self.buyer {
            Some(&self.seller)
        } else if *submitter == self.seller {
            Some(&self.buyer)
        } else {
            None
        }
    }

    /// Returns `true` once payment has been acknowledged.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.state == TradeState::PaymentReceived
    }
}

impl std::fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade[{}] {} buys {} @ {} from {} ({})",
            self.trade_id, self.buyer, self.amount, self.price, self.seller, self.state
        )
    }
}
