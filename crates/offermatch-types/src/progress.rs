//! Settlement journal entries.
//!
//! Turning a match into a platform trade takes four external calls and the
//! platform offers no transaction spanning them. A [`MatchProgress`] records
//! the output of every completed step so an interrupted orchestration can be
//! inspected and resumed without repeating the steps that already happened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, MatchId, Offer, PlatformOfferId, TradeId};

/// One step of the match → trade sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum SettlementStep {
    RegisterBuyer,
    PublishOffer,
    RegisterSeller,
    TakeOffer,
}

impl std::fmt::Display for SettlementStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegisterBuyer => write!(f, "REGISTER_BUYER"),
            Self::PublishOffer => write!(f, "PUBLISH_OFFER"),
            Self::RegisterSeller => write!(f, "REGISTER_SELLER"),
            Self::TakeOffer => write!(f, "TAKE_OFFER"),
        }
    }
}

/// Why the last attempt at a step failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step: SettlementStep,
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

/// Journal entry for one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchProgress {
    pub match_id: MatchId,
    pub buy: Offer,
    pub sell: Offer,
    pub buyer_account: Option<AccountId>,
    pub published_offer: Option<PlatformOfferId>,
    pub seller_account: Option<AccountId>,
    pub trade_id: Option<TradeId>,
    pub last_failure: Option<StepFailure>,
    /// Number of times the sequence has been driven (initial run + resumes).
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchProgress {
    #[must_use]
    pub fn new(match_id: MatchId, buy: Offer, sell: Offer) -> Self {
        let now = Utc::now();
        Self {
            match_id,
            buy,
            sell,
            buyer_account: None,
            published_offer: None,
            seller_account: None,
            trade_id: None,
            last_failure: None,
            attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// The first step whose output has not been recorded, or `None` when
    /// the trade has been taken.
    #[must_use]
    pub fn next_step(&self) -> Option<SettlementStep> {
        if self.buyer_account.is_none() {
            Some(SettlementStep::RegisterBuyer)
        } else if self.published_offer.is_none() {
            Some(SettlementStep::PublishOffer)
        } else if self.seller_account.is_none() {
            Some(SettlementStep::RegisterSeller)
        } else if self.trade_id.is_none() {
            Some(SettlementStep::TakeOffer)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.trade_id.is_some()
    }

    /// `true` if the last attempt stopped on a failure.
    #[must_use]
    pub fn is_stalled(&self) -> bool {
        !self.is_complete() && self.last_failure.is_some()
    }

    pub fn record_failure(&mut self, step: SettlementStep, reason: impl Into<String>) {
        let now = Utc::now();
        self.last_failure = Some(StepFailure {
            step,
            reason: reason.into(),
            failed_at: now,
        });
        self.updated_at = now;
    }

    /// Stamp `updated_at` after a step output was recorded.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
