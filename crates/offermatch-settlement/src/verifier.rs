//! Payment verification against a ledger report.
//!
//! ```text
//! success == false          -> TransactionIncomplete (addresses ignored)
//! from != expected sender   -> AddressMismatch { Sender }
//! to   != expected receiver -> AddressMismatch { Receiver }
//! ```

use offermatch_gateway::TransactionInfo;
use offermatch_types::{AddressPolicy, AddressRole, OffermatchError, Result, TxId};

/// The wallets a payment is expected to move funds between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedTransfer {
    pub from: String,
    pub to: String,
}

/// Check that `tx` is a successful transfer between the expected wallets.
pub fn verify_payment(
    tx_id: &TxId,
    tx: &TransactionInfo,
    expected: &ExpectedTransfer,
    policy: AddressPolicy,
) -> Result<()> {
    if !tx.success {
        return Err(OffermatchError::TransactionIncomplete {
            tx_id: tx_id.clone(),
        });
    }
    check_address(AddressRole::Sender, &expected.from, &tx.from, policy)?;
    check_address(AddressRole::Receiver, &expected.to, &tx.to, policy)
}

fn check_address(
    role: AddressRole,
    expected: &str,
    actual: &str,
    policy: AddressPolicy,
) -> Result<()> {
    if policy.matches(expected, actual) {
        Ok(())
    } else {
        Err(OffermatchError::AddressMismatch {
            role,
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}
