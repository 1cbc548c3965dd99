//! Offer types.
//!
//! An [`Offer`] is a submitter's declared intent to buy or sell a fixed
//! amount of a token at a fixed price. Offers arrive as an [`OfferRequest`]
//! (the wire form) and are validated into an [`Offer`] before they touch
//! shared state.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OffermatchError, Result, SubmitterId};

/// Which side of the book an offer is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// The side an incoming offer of this direction is matched against.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Direction {
    type Err = OffermatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            other => Err(OffermatchError::InvalidOffer {
                reason: format!("direction must be BUY or SELL, got {other:?}"),
            }),
        }
    }
}

/// Wire form of a submitted offer, as callers send it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferRequest {
    #[serde(rename = "accountName", default)]
    pub account_name: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(rename = "ethereumWallet", default)]
    pub ethereum_wallet: String,
}

impl OfferRequest {
    /// Validate into an [`Offer`].
    ///
    /// `route` is the direction implied by the endpoint the request came in
    /// on, if any. When both the route and the body name a direction they
    /// must agree; at least one of them must be present.
    pub fn into_offer(self, route: Option<Direction>) -> Result<Offer> {
        let declared = self.direction.as_deref().map(Direction::from_str).transpose()?;
        let direction = match (route, declared) {
            (Some(r), Some(d)) if r != d => {
                return Err(OffermatchError::InvalidOffer {
                    reason: format!("direction {d} submitted to the {r} endpoint"),
                });
            }
            (Some(d), _) | (None, Some(d)) => d,
            (None, None) => {
                return Err(OffermatchError::InvalidOffer {
                    reason: "direction is required".into(),
                });
            }
        };

        Ok(Offer {
            submitter: SubmitterId(self.account_name),
            token: self.token,
            price: self.price,
            amount: self.amount,
            direction,
            settlement_wallet: self.ethereum_wallet,
            submitted_at: Utc::now(),
        })
    }
}

/// A validated offer. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub submitter: SubmitterId,
    /// Asset identifier (e.g. "ETH").
    pub token: String,
    /// Price in the smallest unit.
    pub price: i64,
    /// Amount in the smallest unit.
    pub amount: i64,
    pub direction: Direction,
    /// Where this submitter receives (or sends) the off-platform payment.
    pub settlement_wallet: String,
    pub submitted_at: DateTime<Utc>,
}

impl std::fmt::Display for Offer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Offer[{}] {} {} {} @ {}",
            self.submitter, self.direction, self.amount, self.token, self.price
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Offer {
    /// An offer whose settlement wallet is derived from the submitter name.
    pub fn dummy(
        submitter: &str,
        direction: Direction,
        token: &str,
        amount: i64,
        price: i64,
    ) -> Self {
        Self {
            submitter: SubmitterId::from(submitter),
            token: token.to_string(),
            price,
            amount,
            direction,
            settlement_wallet: format!("0xwallet-{submitter}"),
            submitted_at: Utc::now(),
        }
    }
}
