//! Match → trade orchestration and payment release.
//!
//! ```text
//! submit(offer)
//!   └─ lock: take_match_or_book ─ unlock
//!        └─ matched: drive(match_id)
//!             RegisterBuyer → PublishOffer → RegisterSeller → TakeOffer
//!             (each step's output journalled before the next starts)
//!
//! verify_and_settle(tx, payer)
//!   └─ lock: wallets, reserve tx ─ unlock ─ ledger lookup ─ verify
//!        └─ lock: trade ─ unlock ─ payment-started ─ payment-received
//!             └─ lock: confirm tx (or release it on any failure)
//! ```
//!
//! The state lock is never held across a call to the platform or the ledger.
//! Nothing is retried automatically: a failed step stops the sequence, the
//! journal keeps what was done, and [`Orchestrator::resume`] continues from
//! the first step with no recorded output.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use offermatch_book::MatchedPair;
use offermatch_gateway::{
    LedgerVerifier, OfferToCreate, OfferToTake, PaymentAccount, TradeDetails, TradingPlatform,
};
use offermatch_types::{
    AccountId, AccountTemplate, AddressPolicy, Direction, ExchangeConfig, ExternalService,
    MatchId, MatchProgress, Offer, OfferTemplate, OffermatchError, PaymentAccountBinding,
    PlatformOfferId, Result, SettlementStep, SubmitterId, TradeId, TradeRecord, TradeState, TxId,
};
use tokio::sync::Mutex;

use crate::journal::{LogStallHook, StallHook};
use crate::state::{ExchangeState, Submission};
use crate::verifier::{ExpectedTransfer, verify_payment};

/// Result of submitting an offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The offer matched and the platform trade has been taken.
    Matched(TradeRecord),
    /// No counter-offer yet; the offer rests in the book.
    Queued,
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Output of one completed settlement step.
enum StepOutput {
    BuyerAccount(AccountId),
    Published(PlatformOfferId),
    SellerAccount(AccountId),
    Taken(TradeRecord),
}

/// Owns the exchange state and drives the platform and ledger.
pub struct Orchestrator<P, L> {
    platform: Arc<P>,
    ledger: Arc<L>,
    account_template: AccountTemplate,
    offer_template: OfferTemplate,
    address_policy: AddressPolicy,
    state: Mutex<ExchangeState>,
    stall_hook: Arc<dyn StallHook>,
}

impl<P: TradingPlatform, L: LedgerVerifier> Orchestrator<P, L> {
    pub fn new(platform: Arc<P>, ledger: Arc<L>, config: &ExchangeConfig) -> Self {
        Self {
            platform,
            ledger,
            account_template: config.account.clone(),
            offer_template: config.offer.clone(),
            address_policy: config.address_policy,
            state: Mutex::new(ExchangeState::new(config.claim_cache_size)),
            stall_hook: Arc::new(LogStallHook),
        }
    }

    /// Replace the default logging stall hook.
    #[must_use]
    pub fn with_stall_hook(mut self, hook: Arc<dyn StallHook>) -> Self {
        self.stall_hook = hook;
        self
    }

    // =================================================================
    // Submission & orchestration
    // =================================================================

    /// Match `offer` or book it. A match is driven to a platform trade
    /// before this returns.
    ///
    /// # Errors
    /// Any orchestration failure. The consumed counter-offer is not restored;
    /// the match stays in the journal for [`Self::resume`].
    pub async fn submit(&self, offer: Offer) -> Result<SubmitOutcome> {
        let submitter = offer.submitter.clone();
        let direction = offer.direction;
        let submission = self.state.lock().await.take_match_or_book(offer);

        match submission {
            Submission::Booked { replaced } => {
                tracing::info!(
                    %submitter,
                    %direction,
                    replaced = replaced.is_some(),
                    "offer booked"
                );
                Ok(SubmitOutcome::Queued)
            }
            Submission::Matched { match_id, pair } => {
                tracing::info!(
                    %match_id,
                    buyer = %pair.buy.submitter,
                    seller = %pair.sell.submitter,
                    token = %pair.buy.token,
                    amount = pair.buy.amount,
                    price = pair.buy.price,
                    "match found"
                );
                self.drive(match_id).await.map(SubmitOutcome::Matched)
            }
        }
    }

    /// Turn an already-matched buy/sell pair into a platform trade.
    ///
    /// # Errors
    /// [`OffermatchError::InvalidOffer`] if the directions are not BUY and
    /// SELL, otherwise the first failing step's error.
    pub async fn settle(&self, buy: Offer, sell: Offer) -> Result<TradeRecord> {
        if buy.direction != Direction::Buy || sell.direction != Direction::Sell {
            return Err(OffermatchError::InvalidOffer {
                reason: format!(
                    "settle expects a BUY and a SELL, got {} and {}",
                    buy.direction, sell.direction
                ),
            });
        }
        let match_id = self
            .state
            .lock()
            .await
            .open_match(MatchedPair { buy, sell });
        self.drive(match_id).await
    }

    /// Continue a stalled match from its first incomplete step.
    ///
    /// Completed steps are never repeated. Resuming a completed match
    /// returns its trade without contacting the platform.
    ///
    /// # Errors
    /// [`OffermatchError::MatchNotFound`] for an unknown match, otherwise the
    /// first failing step's error.
    pub async fn resume(&self, match_id: MatchId) -> Result<TradeRecord> {
        tracing::info!(%match_id, "resuming match");
        self.drive(match_id).await
    }

    async fn drive(&self, match_id: MatchId) -> Result<TradeRecord> {
        let mut progress = {
            let mut state = self.state.lock().await;
            let entry = state
                .progress_mut(&match_id)
                .ok_or(OffermatchError::MatchNotFound(match_id))?;
            if !entry.is_complete() {
                entry.attempts += 1;
                entry.touch();
            }
            entry.clone()
        };

        while let Some(step) = progress.next_step() {
            tracing::info!(%match_id, %step, attempt = progress.attempts, "settlement step");
            match self.run_step(step, &progress).await {
                Ok(output) => {
                    let trade = record_output(&mut progress, output);
                    let mut state = self.state.lock().await;
                    if let Some(trade) = trade {
                        tracing::info!(%match_id, trade_id = %trade.trade_id, "trade taken");
                        state.record_trade(trade);
                    }
                    state.store_progress(progress.clone());
                }
                Err(err) => {
                    progress.record_failure(step, err.to_string());
                    self.state.lock().await.store_progress(progress.clone());
                    self.stall_hook.on_stall(&progress, &err);
                    return Err(err);
                }
            }
        }

        let state = self.state.lock().await;
        progress
            .trade_id
            .as_ref()
            .and_then(|id| state.trade(id))
            .cloned()
            .ok_or_else(|| OffermatchError::internal(format!("{match_id} has no recorded trade")))
    }

    async fn run_step(&self, step: SettlementStep, progress: &MatchProgress) -> Result<StepOutput> {
        match step {
            SettlementStep::RegisterBuyer => {
                let binding = self.ensure_account(&progress.buy).await?;
                Ok(StepOutput::BuyerAccount(binding.account_id))
            }
            SettlementStep::PublishOffer => {
                let account = required(progress.buyer_account.as_ref(), "buyer account")?;
                self.publish_buy_offer(account, &progress.buy)
                    .await
                    .map(StepOutput::Published)
            }
            SettlementStep::RegisterSeller => {
                let binding = self.ensure_account(&progress.sell).await?;
                Ok(StepOutput::SellerAccount(binding.account_id))
            }
            SettlementStep::TakeOffer => {
                let offer_id = required(progress.published_offer.as_ref(), "published offer")?;
                let account = required(progress.seller_account.as_ref(), "seller account")?;
                let take = OfferToTake {
                    payment_account_id: account.to_string(),
                    amount: progress.sell.amount,
                };
                let details = self.platform.take_offer(offer_id, &take).await?;
                adopt_trade(progress, details).map(StepOutput::Taken)
            }
        }
    }

    /// Reuse the submitter's cached binding or register a new account.
    async fn ensure_account(&self, offer: &Offer) -> Result<PaymentAccountBinding> {
        let cached = self.state.lock().await.binding(&offer.submitter).cloned();
        if let Some(binding) = cached {
            tracing::debug!(
                submitter = %offer.submitter,
                account = %binding.account_id,
                "reusing payment account"
            );
            return Ok(binding);
        }

        let request = PaymentAccount {
            account_name: offer.submitter.to_string(),
            trade_currencies: self.account_template.trade_currencies.clone(),
            payment_method: self.account_template.payment_method.clone(),
            payment_details: offer.settlement_wallet.clone(),
            selected_trade_currency: self.account_template.selected_trade_currency.clone(),
            ..PaymentAccount::default()
        };
        let registered = self.platform.register_account(&request).await?;
        if registered.id.is_empty() {
            return Err(OffermatchError::MalformedResponse {
                service: ExternalService::TradingPlatform,
                reason: format!("payment account for {} has no id", offer.submitter),
            });
        }

        let wallet = if registered.payment_details.is_empty() {
            offer.settlement_wallet.clone()
        } else {
            registered.payment_details
        };
        let binding =
            PaymentAccountBinding::new(offer.submitter.clone(), AccountId::new(registered.id), wallet);
        tracing::info!(
            submitter = %binding.submitter,
            account = %binding.account_id,
            "payment account registered"
        );
        self.state.lock().await.insert_binding(binding.clone());
        Ok(binding)
    }

    async fn publish_buy_offer(&self, account: &AccountId, buy: &Offer) -> Result<PlatformOfferId> {
        let request = OfferToCreate {
            fund_using_platform_wallet: self.offer_template.fund_using_platform_wallet,
            account_id: account.to_string(),
            direction: Direction::Buy.to_string(),
            market_pair: self.offer_template.market_pair.clone(),
            fixed_price: buy.price,
            amount: buy.amount,
            min_amount: buy.amount,
            buyer_security_deposit: self.offer_template.buyer_security_deposit,
            ..OfferToCreate::default()
        };
        let published = self.platform.publish_offer(&request).await?;
        if published.id.is_empty() {
            return Err(OffermatchError::MalformedResponse {
                service: ExternalService::TradingPlatform,
                reason: "published offer has no id".into(),
            });
        }
        tracing::info!(submitter = %buy.submitter, offer_id = %published.id, "offer published");
        Ok(PlatformOfferId::new(published.id))
    }

    // =================================================================
    // Payment release
    // =================================================================

    /// Verify `tx_id` as `payer`'s payment to their counterparty, then
    /// advance the trade through payment-started and payment-received.
    ///
    /// `tx_id` is reserved for the whole call, so a concurrent release with
    /// the same transaction is refused.
    ///
    /// # Errors
    /// - [`OffermatchError::TransactionAlreadyClaimed`] if `tx_id` already released a trade
    ///   or is being released right now.
    /// - [`OffermatchError::InternalState`] if `payer` has no match, binding or trade, or
    ///   if the recorded trade is not with the current counterparty.
    /// - Ledger errors from the lookup.
    /// - [`OffermatchError::TransactionIncomplete`] / [`OffermatchError::AddressMismatch`].
    /// - [`OffermatchError::TradeAlreadySettled`] if payment was already acknowledged.
    /// - Gateway errors from either transition; the trade is then marked `Failed`.
    pub async fn verify_and_settle(&self, tx_id: &TxId, payer: &SubmitterId) -> Result<TradeRecord> {
        let (payee, expected) = {
            let mut state = self.state.lock().await;
            let payee = state
                .counterparty(payer)
                .cloned()
                .ok_or_else(|| OffermatchError::internal(format!("no match recorded for {payer}")))?;
            let wallet = |who: &SubmitterId| {
                state
                    .binding(who)
                    .map(|b| b.settlement_wallet.clone())
                    .ok_or_else(|| {
                        OffermatchError::internal(format!("no payment account bound for {who}"))
                    })
            };
            let expected = ExpectedTransfer {
                from: wallet(payer)?,
                to: wallet(&payee)?,
            };
            state.claims_mut().reserve(tx_id)?;
            (payee, expected)
        };

        let released = self.release_payment(tx_id, payer, &payee, &expected).await;

        let mut state = self.state.lock().await;
        let trade_id = match released {
            Ok(trade_id) => trade_id,
            Err(err) => {
                state.claims_mut().release(tx_id);
                return Err(err);
            }
        };
        state.claims_mut().confirm(tx_id)?;
        tracing::info!(%trade_id, %tx_id, %payer, "payment released");
        state
            .trade(&trade_id)
            .cloned()
            .ok_or_else(|| OffermatchError::internal(format!("trade {trade_id} vanished")))
    }

    /// Everything between reserving and claiming `tx_id`.
    async fn release_payment(
        &self,
        tx_id: &TxId,
        payer: &SubmitterId,
        payee: &SubmitterId,
        expected: &ExpectedTransfer,
    ) -> Result<TradeId> {
        let tx = self.ledger.lookup_transaction(tx_id).await?;
        if let Err(err) = verify_payment(tx_id, &tx, expected, self.address_policy) {
            tracing::warn!(%tx_id, %payer, %err, "payment rejected");
            return Err(err);
        }

        let trade_id = {
            let state = self.state.lock().await;
            let trade = state
                .trade_for(payer)
                .ok_or_else(|| OffermatchError::internal(format!("no trade recorded for {payer}")))?;
            if trade.counterparty_of(payer) != Some(payee) {
                return Err(OffermatchError::internal(format!(
                    "trade {} of {payer} is not with {payee}",
                    trade.trade_id
                )));
            }
            if trade.is_settled() {
                return Err(OffermatchError::TradeAlreadySettled(trade.trade_id.clone()));
            }
            trade.trade_id.clone()
        };

        self.transition(
            &trade_id,
            TradeState::PaymentStarted,
            self.platform.mark_payment_started(&trade_id),
        )
        .await?;
        self.transition(
            &trade_id,
            TradeState::PaymentReceived,
            self.platform.mark_payment_received(&trade_id),
        )
        .await?;
        Ok(trade_id)
    }

    /// Await a platform transition and record its outcome on the trade.
    async fn transition(
        &self,
        trade_id: &TradeId,
        target: TradeState,
        call: impl Future<Output = Result<()>> + Send,
    ) -> Result<()> {
        let result = call.await;
        let mut state = self.state.lock().await;
        if let Some(trade) = state.trade_mut(trade_id) {
            trade.state = if result.is_ok() { target } else { TradeState::Failed };
        }
        if let Err(err) = &result {
            tracing::warn!(%trade_id, %target, %err, "payment transition refused");
        }
        result
    }

    // =================================================================
    // Queries
    // =================================================================

    /// The wallet of `submitter`'s counterparty, once it has been bound.
    pub async fn counterparty_wallet(&self, submitter: &SubmitterId) -> Option<String> {
        let state = self.state.lock().await;
        state
            .counterparty(submitter)
            .and_then(|c| state.binding(c))
            .map(|b| b.settlement_wallet.clone())
    }

    pub async fn trade_for(&self, submitter: &SubmitterId) -> Option<TradeRecord> {
        self.state.lock().await.trade_for(submitter).cloned()
    }

    pub async fn progress(&self, match_id: &MatchId) -> Option<MatchProgress> {
        self.state.lock().await.progress(match_id).cloned()
    }

    /// Journal entries whose last attempt failed.
    pub async fn stalled_matches(&self) -> Vec<MatchProgress> {
        self.state.lock().await.stalled().cloned().collect()
    }

    /// Number of resting offers on one side of the book.
    pub async fn book_depth(&self, direction: Direction) -> usize {
        self.state.lock().await.book().depth(direction)
    }
}

fn required<'a, T>(value: Option<&'a T>, what: &str) -> Result<&'a T> {
    value.ok_or_else(|| OffermatchError::internal(format!("{what} missing from journal")))
}

/// Apply a step output to the journal entry; returns the trade for `TakeOffer`.
fn record_output(progress: &mut MatchProgress, output: StepOutput) -> Option<TradeRecord> {
    let trade = match output {
        StepOutput::BuyerAccount(id) => {
            progress.buyer_account = Some(id);
            None
        }
        StepOutput::Published(id) => {
            progress.published_offer = Some(id);
            None
        }
        StepOutput::SellerAccount(id) => {
            progress.seller_account = Some(id);
            None
        }
        StepOutput::Taken(trade) => {
            progress.trade_id = Some(trade.trade_id.clone());
            Some(trade)
        }
    };
    progress.touch();
    trade
}

/// Adopt the platform's take-offer response as the canonical trade.
fn adopt_trade(progress: &MatchProgress, details: TradeDetails) -> Result<TradeRecord> {
    if details.id.is_empty() {
        return Err(OffermatchError::MalformedResponse {
            service: ExternalService::TradingPlatform,
            reason: "taken trade has no id".into(),
        });
    }
    let positive_or = |reported: i64, fallback: i64| if reported > 0 { reported } else { fallback };
    Ok(TradeRecord {
        trade_id: TradeId::new(details.id),
        match_id: progress.match_id,
        buyer: progress.buy.submitter.clone(),
        seller: progress.sell.submitter.clone(),
        amount: positive_or(details.trade_amount, progress.buy.amount),
        price: positive_or(details.trade_price, progress.buy.price),
        fee_tx_id: non_empty(details.taker_fee_tx_id),
        payout_tx_id: non_empty(details.payout_tx_id),
        platform_state: details.state,
        state: TradeState::Taken,
        taken_at: Utc::now(),
    })
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use offermatch_gateway::mock::{MockLedger, MockPlatform, PlatformCall, PlatformOp};

    use super::*;

    type TestOrchestrator = Orchestrator<MockPlatform, MockLedger>;

    fn setup() -> (Arc<MockPlatform>, Arc<MockLedger>, TestOrchestrator) {
        let platform = Arc::new(MockPlatform::new());
        let ledger = Arc::new(MockLedger::new());
        let orch = Orchestrator::new(
            Arc::clone(&platform),
            Arc::clone(&ledger),
            &ExchangeConfig::default(),
        );
        (platform, ledger, orch)
    }

    fn offer(submitter: &str, direction: Direction) -> Offer {
        Offer::dummy(submitter, direction, "ETH", 100, 5000)
    }

    #[derive(Default)]
    struct RecordingHook(StdMutex<Vec<(MatchId, Option<SettlementStep>)>>);

    impl StallHook for RecordingHook {
        fn on_stall(&self, progress: &MatchProgress, _error: &OffermatchError) {
            self.0
                .lock()
                .unwrap()
                .push((progress.match_id, progress.next_step()));
        }
    }

    #[tokio::test]
    async fn unmatched_offer_is_queued_without_platform_calls() {
        let (platform, _, orch) = setup();
        let outcome = orch.submit(offer("alice", Direction::Buy)).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Queued);
        assert!(platform.calls().is_empty());
        assert_eq!(orch.book_depth(Direction::Buy).await, 1);
    }

    #[tokio::test]
    async fn publish_request_uses_templates() {
        let (platform, _, orch) = setup();
        orch.settle(offer("alice", Direction::Buy), offer("bob", Direction::Sell))
            .await
            .unwrap();
        let calls = platform.calls();
        assert_eq!(
            calls[1],
            PlatformCall::PublishOffer {
                account_id: "acct-alice".into(),
                direction: "BUY".into(),
                price: 5000,
                amount: 100,
            }
        );
    }

    #[tokio::test]
    async fn settle_rejects_misoriented_pair() {
        let (platform, _, orch) = setup();
        let err = orch
            .settle(offer("alice", Direction::Sell), offer("bob", Direction::Sell))
            .await
            .unwrap_err();
        assert!(matches!(err, OffermatchError::InvalidOffer { .. }));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn cached_binding_skips_registration() {
        let (platform, _, orch) = setup();
        orch.settle(offer("alice", Direction::Buy), offer("bob", Direction::Sell))
            .await
            .unwrap();
        orch.settle(offer("alice", Direction::Buy), offer("carol", Direction::Sell))
            .await
            .unwrap();

        let names: Vec<_> = platform
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::RegisterAccount { name, .. } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn failure_notifies_hook_and_stalls() {
        let (platform, _, orch) = setup();
        let hook = Arc::new(RecordingHook::default());
        let orch = orch.with_stall_hook(hook.clone());
        platform.fail_next(PlatformOp::RegisterAccount, 1);

        orch.submit(offer("alice", Direction::Buy)).await.unwrap();
        let err = orch.submit(offer("bob", Direction::Sell)).await.unwrap_err();
        assert!(err.is_gateway());

        let stalled = orch.stalled_matches().await;
        assert_eq!(stalled.len(), 1);
        let entry = &stalled[0];
        assert_eq!(entry.attempts, 1);
        assert_eq!(
            entry.last_failure.as_ref().map(|f| f.step),
            Some(SettlementStep::RegisterBuyer)
        );
        assert_eq!(
            hook.0.lock().unwrap().as_slice(),
            &[(entry.match_id, Some(SettlementStep::RegisterBuyer))]
        );
        // The consumed counter-offer is not restored.
        assert_eq!(orch.book_depth(Direction::Buy).await, 0);
    }

    #[tokio::test]
    async fn resume_unknown_match_is_not_found() {
        let (_, _, orch) = setup();
        let id = MatchId::new();
        let err = orch.resume(id).await.unwrap_err();
        assert!(matches!(err, OffermatchError::MatchNotFound(m) if m == id));
    }

    #[tokio::test]
    async fn resume_completed_match_makes_no_calls() {
        let (platform, _, orch) = setup();
        let trade = orch
            .settle(offer("alice", Direction::Buy), offer("bob", Direction::Sell))
            .await
            .unwrap();
        let before = platform.calls().len();

        let again = orch.resume(trade.match_id).await.unwrap();
        assert_eq!(again.trade_id, trade.trade_id);
        assert_eq!(platform.calls().len(), before);
        assert_eq!(orch.progress(&trade.match_id).await.unwrap().attempts, 1);
    }

    #[tokio::test]
    async fn registration_without_id_is_malformed() {
        struct NoIdPlatform(MockPlatform);

        #[async_trait::async_trait]
        impl TradingPlatform for NoIdPlatform {
            async fn register_account(&self, account: &PaymentAccount) -> Result<PaymentAccount> {
                Ok(account.clone())
            }
            async fn publish_offer(
                &self,
                offer: &OfferToCreate,
            ) -> Result<offermatch_gateway::OfferDetail> {
                self.0.publish_offer(offer).await
            }
            async fn take_offer(
                &self,
                offer_id: &PlatformOfferId,
                take: &OfferToTake,
            ) -> Result<TradeDetails> {
                self.0.take_offer(offer_id, take).await
            }
            async fn mark_payment_started(&self, trade_id: &TradeId) -> Result<()> {
                self.0.mark_payment_started(trade_id).await
            }
            async fn mark_payment_received(&self, trade_id: &TradeId) -> Result<()> {
                self.0.mark_payment_received(trade_id).await
            }
        }

        let orch = Orchestrator::new(
            Arc::new(NoIdPlatform(MockPlatform::new())),
            Arc::new(MockLedger::new()),
            &ExchangeConfig::default(),
        );
        let err = orch
            .settle(offer("alice", Direction::Buy), offer("bob", Direction::Sell))
            .await
            .unwrap_err();
        assert!(matches!(err, OffermatchError::MalformedResponse { .. }));
    }

    #[test]
    fn adopt_trade_falls_back_to_offer_terms() {
        let progress = MatchProgress::new(
            MatchId::new(),
            offer("alice", Direction::Buy),
            offer("bob", Direction::Sell),
        );
        let trade = adopt_trade(
            &progress,
            TradeDetails {
                id: "trade-7".into(),
                state: "PREPARATION".into(),
                ..TradeDetails::default()
            },
        )
        .unwrap();
        assert_eq!(trade.amount, 100);
        assert_eq!(trade.price, 5000);
        assert_eq!(trade.fee_tx_id, None);
        assert_eq!(trade.state, TradeState::Taken);
        assert_eq!(trade.platform_state, "PREPARATION");
    }
}
