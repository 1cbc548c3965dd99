//! Ledger verifier contract and transaction shape.

use async_trait::async_trait;
use offermatch_types::{Result, TxId};
use serde::{Deserialize, Serialize};

/// Looks up on-chain transactions by hash.
#[async_trait]
pub trait LedgerVerifier: Send + Sync {
    async fn lookup_transaction(&self, tx_id: &TxId) -> Result<TransactionInfo>;
}

/// The subset of an explorer's transaction report settlement relies on.
///
/// `hash`, `success`, `from` and `to` are required; an explorer error object
/// such as `{"error":{"code":404}}` fails to decode instead of reading as a
/// failed transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub hash: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub block_number: i64,
    #[serde(default)]
    pub confirmations: i64,
    /// `false` if the transaction reverted or is otherwise unsuccessful.
    pub success: bool,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub gas_limit: i64,
    #[serde(default)]
    pub gas_used: i64,
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl TransactionInfo {
    pub fn transfer(hash: &str, from: &str, to: &str, success: bool) -> Self {
        Self {
            hash: hash.to_string(),
            success,
            from: from.to_string(),
            to: to.to_string(),
            confirmations: 12,
            ..Self::default()
        }
    }
}
