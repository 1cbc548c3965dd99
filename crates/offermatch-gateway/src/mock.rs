//! Recording doubles for [`TradingPlatform`] and [`LedgerVerifier`].
//!
//! Every call is appended to an in-order log; failures can be injected per
//! operation for a fixed number of upcoming calls.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use offermatch_types::{ExternalService, OffermatchError, PlatformOfferId, Result, TradeId, TxId};

use crate::ledger::{LedgerVerifier, TransactionInfo};
use crate::platform::{
    OfferDetail, OfferToCreate, OfferToTake, PaymentAccount, TradeDetails, TradingPlatform,
};

/// Platform operations, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformOp {
    RegisterAccount,
    PublishOffer,
    TakeOffer,
    PaymentStarted,
    PaymentReceived,
}

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    RegisterAccount {
        name: String,
        payment_details: String,
    },
    PublishOffer {
        account_id: String,
        direction: String,
        price: i64,
        amount: i64,
    },
    TakeOffer {
        offer_id: String,
        account_id: String,
        amount: i64,
    },
    PaymentStarted(String),
    PaymentReceived(String),
}

impl PlatformCall {
    #[must_use]
    pub fn op(&self) -> PlatformOp {
        match self {
            Self::RegisterAccount { .. } => PlatformOp::RegisterAccount,
            Self::PublishOffer { .. } => PlatformOp::PublishOffer,
            Self::TakeOffer { .. } => PlatformOp::TakeOffer,
            Self::PaymentStarted(_) => PlatformOp::PaymentStarted,
            Self::PaymentReceived(_) => PlatformOp::PaymentReceived,
        }
    }
}

/// In-memory trading platform.
///
/// Account IDs are `acct-{name}`, offer IDs `offer-{n}`, trade IDs `trade-{n}`.
#[derive(Debug, Default)]
pub struct MockPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    failures: Mutex<HashMap<PlatformOp, u32>>,
    published: Mutex<HashMap<String, OfferToCreate>>,
    sequence: AtomicU64,
}

impl MockPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `times` calls of `op` fail with a 500.
    pub fn fail_next(&self, op: PlatformOp, times: u32) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(op, times);
    }

    /// All calls so far, in order. Failed calls are recorded too.
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of calls of one operation so far.
    pub fn count(&self, op: PlatformOp) -> usize {
        self.calls().iter().filter(|c| c.op() == op).count()
    }

    fn record(&self, call: PlatformCall) -> Result<()> {
        let op = call.op();
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);

        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(remaining) = failures.get_mut(&op).filter(|n| **n > 0) {
            *remaining -= 1;
            return Err(OffermatchError::ServiceStatus {
                service: ExternalService::TradingPlatform,
                status: 500,
                body: format!("injected {op:?} failure"),
            });
        }
        Ok(())
    }

    fn next_seq(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl TradingPlatform for MockPlatform {
    async fn register_account(&self, account: &PaymentAccount) -> Result<PaymentAccount> {
        self.record(PlatformCall::RegisterAccount {
            name: account.account_name.clone(),
            payment_details: account.payment_details.clone(),
        })?;
        Ok(PaymentAccount {
            id: format!("acct-{}", account.account_name),
            ..account.clone()
        })
    }

    async fn publish_offer(&self, offer: &OfferToCreate) -> Result<OfferDetail> {
        self.record(PlatformCall::PublishOffer {
            account_id: offer.account_id.clone(),
            direction: offer.direction.clone(),
            price: offer.fixed_price,
            amount: offer.amount,
        })?;
        let id = format!("offer-{}", self.next_seq());
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), offer.clone());
        Ok(OfferDetail {
            id,
            direction: offer.direction.clone(),
            price: offer.fixed_price,
            amount: offer.amount,
            min_amount: offer.min_amount,
            maker_payment_account_id: offer.account_id.clone(),
            buyer_security_deposit: offer.buyer_security_deposit,
            state: "AVAILABLE".into(),
            ..OfferDetail::default()
        })
    }

    async fn take_offer(
        &self,
        offer_id: &PlatformOfferId,
        take: &OfferToTake,
    ) -> Result<TradeDetails> {
        self.record(PlatformCall::TakeOffer {
            offer_id: offer_id.to_string(),
            account_id: take.payment_account_id.clone(),
            amount: take.amount,
        })?;
        let published = self
            .published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(offer_id.as_str())
            .cloned()
            .ok_or_else(|| OffermatchError::ServiceStatus {
                service: ExternalService::TradingPlatform,
                status: 404,
                body: format!("offer {offer_id} not found"),
            })?;
        let n = self.next_seq();
        Ok(TradeDetails {
            id: format!("trade-{n}"),
            offer: OfferDetail {
                id: offer_id.to_string(),
                price: published.fixed_price,
                amount: published.amount,
                ..OfferDetail::default()
            },
            taker_payment_account_id: take.payment_account_id.clone(),
            taker_fee_tx_id: format!("fee-tx-{n}"),
            trade_amount: take.amount,
            trade_price: published.fixed_price,
            state: "DEPOSIT_PUBLISHED".into(),
            ..TradeDetails::default()
        })
    }

    async fn mark_payment_started(&self, trade_id: &TradeId) -> Result<()> {
        self.record(PlatformCall::PaymentStarted(trade_id.to_string()))
    }

    async fn mark_payment_received(&self, trade_id: &TradeId) -> Result<()> {
        self.record(PlatformCall::PaymentReceived(trade_id.to_string()))
    }
}

/// In-memory ledger explorer. Unknown hashes answer 404.
#[derive(Debug, Default)]
pub struct MockLedger {
    transactions: Mutex<HashMap<TxId, TransactionInfo>>,
    lookups: AtomicU64,
}

impl MockLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tx_id: impl Into<TxId>, info: TransactionInfo) {
        self.transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tx_id.into(), info);
    }

    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LedgerVerifier for MockLedger {
    async fn lookup_transaction(&self, tx_id: &TxId) -> Result<TransactionInfo> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tx_id)
            .cloned()
            .ok_or_else(|| OffermatchError::ServiceStatus {
                service: ExternalService::Ledger,
                status: 404,
                body: format!("transaction {tx_id} not found"),
            })
    }
}
