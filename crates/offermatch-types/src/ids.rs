//! Identifiers used throughout OfferMatch.
//!
//! Most identifiers are opaque strings handed to us by a caller or assigned
//! by the external trading platform. Only [`MatchId`] is minted locally and
//! uses UUIDv7 for time-ordered sorting.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a transparent string identifier newtype.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identity of whoever submitted an offer. Unique per submitter.
    SubmitterId
);

string_id!(
    /// Payment account identifier assigned by the trading platform.
    AccountId
);

string_id!(
    /// Offer identifier assigned by the trading platform on publish.
    PlatformOfferId
);

string_id!(
    /// Trade identifier assigned by the trading platform on take.
    TradeId
);

string_id!(
    /// On-chain transaction hash claimed as proof of payment.
    TxId
);

// ---------------------------------------------------------------------------
// MatchId
// ---------------------------------------------------------------------------

/// Locally minted identifier for one matched pair of offers.
///
/// Keys the settlement journal so an interrupted orchestration can be
/// inspected and resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_id_uniqueness_and_ordering() {
        let a = MatchId::new();
        let b = MatchId::new();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn match_id_display_prefix() {
        let id = MatchId::new();
        assert!(id.to_string().starts_with("match:"));
    }

    #[test]
    fn string_ids_serialize_transparently() {
        let id = SubmitterId::from("alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"alice\"");
        let back: TradeId = serde_json::from_str("\"trade-7\"").unwrap();
        assert_eq!(back.as_str(), "trade-7");
    }

    #[test]
    fn string_id_display_is_raw_value() {
        assert_eq!(format!("{}", TxId::new("0xabc")), "0xabc");
        assert!(AccountId::new("").is_empty());
    }
}
