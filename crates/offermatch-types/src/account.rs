//! Payment account bindings.
//!
//! A binding caches the platform account registered for a submitter,
//! together with the wallet the platform recorded as its payment detail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, SubmitterId};

/// A submitter's registered platform account and settlement wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAccountBinding {
    pub submitter: SubmitterId,
    pub account_id: AccountId,
    pub settlement_wallet: String,
    pub registered_at: DateTime<Utc>,
}

impl PaymentAccountBinding {
    #[must_use]
    pub fn new(submitter: SubmitterId, account_id: AccountId, settlement_wallet: String) -> Self {
        Self {
            submitter,
            account_id,
            settlement_wallet,
            registered_at: Utc::now(),
        }
    }
}
