//! The exchange's mutable state.
//!
//! Everything a node remembers lives in one [`ExchangeState`]. The
//! [`Orchestrator`](crate::Orchestrator) owns it behind a single lock and
//! only ever touches it in short, synchronous critical sections; no method
//! here performs I/O.
//!
//! Maps only grow. Bindings, match bindings, trades and journal entries are
//! never removed.

use std::collections::HashMap;

use offermatch_book::{BookOutcome, MatchedPair, OfferBook, match_or_book};
use offermatch_types::{
    MatchId, MatchProgress, Offer, PaymentAccountBinding, SubmitterId, TradeId, TradeRecord,
};

use crate::ClaimGuard;

/// What happened to an offer handed to [`ExchangeState::take_match_or_book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A counter-offer was consumed and a journal entry opened.
    Matched { match_id: MatchId, pair: MatchedPair },
    /// The offer now rests in the book.
    Booked { replaced: Option<Offer> },
}

#[derive(Debug)]
pub struct ExchangeState {
    book: OfferBook,
    bindings: HashMap<SubmitterId, PaymentAccountBinding>,
    counterparties: HashMap<SubmitterId, SubmitterId>,
    trades: HashMap<TradeId, TradeRecord>,
    /// Submitter → trade they are a party to (both buyer and seller).
    trade_index: HashMap<SubmitterId, TradeId>,
    journal: HashMap<MatchId, MatchProgress>,
    claims: ClaimGuard,
}

impl ExchangeState {
    #[must_use]
    pub fn new(claim_cache_size: usize) -> Self {
        Self {
            book: OfferBook::new(),
            bindings: HashMap::new(),
            counterparties: HashMap::new(),
            trades: HashMap::new(),
            trade_index: HashMap::new(),
            journal: HashMap::new(),
            claims: ClaimGuard::new(claim_cache_size),
        }
    }

    // -----------------------------------------------------------------
    // Book & matching
    // -----------------------------------------------------------------

    /// Match `offer` against the book or book it, as one indivisible step.
    ///
    /// On a match the counter-offer leaves the book, both parties are bound
    /// to each other and a journal entry is opened.
    pub fn take_match_or_book(&mut self, offer: Offer) -> Submission {
        match match_or_book(&mut self.book, offer) {
            BookOutcome::Matched(pair) => {
                let match_id = self.open_match(pair.clone());
                Submission::Matched { match_id, pair }
            }
            BookOutcome::Booked { replaced } => Submission::Booked { replaced },
        }
    }

    /// Bind the two parties of `pair` and open its journal entry.
    pub fn open_match(&mut self, pair: MatchedPair) -> MatchId {
        let match_id = MatchId::new();
        let buyer = pair.buy.submitter.clone();
        let seller = pair.sell.submitter.clone();
        self.counterparties.insert(buyer.clone(), seller.clone());
        self.counterparties.insert(seller, buyer);
        self.journal
            .insert(match_id, MatchProgress::new(match_id, pair.buy, pair.sell));
        match_id
    }

    #[must_use]
    pub fn book(&self) -> &OfferBook {
        &self.book
    }

    #[must_use]
    pub fn counterparty(&self, submitter: &SubmitterId) -> Option<&SubmitterId> {
        self.counterparties.get(submitter)
    }

    // -----------------------------------------------------------------
    // Payment account bindings
    // -----------------------------------------------------------------

    #[must_use]
    pub fn binding(&self, submitter: &SubmitterId) -> Option<&PaymentAccountBinding> {
        self.bindings.get(submitter)
    }

    /// Insert or overwrite; the later insert wins.
    pub fn insert_binding(&mut self, binding: PaymentAccountBinding) {
        self.bindings.insert(binding.submitter.clone(), binding);
    }

    // -----------------------------------------------------------------
    // Trades
    // -----------------------------------------------------------------

    /// Store `trade` and index it under both parties.
    pub fn record_trade(&mut self, trade: TradeRecord) {
        self.trade_index
            .insert(trade.buyer.clone(), trade.trade_id.clone());
        self.trade_index
            .insert(trade.seller.clone(), trade.trade_id.clone());
        self.trades.insert(trade.trade_id.clone(), trade);
    }

    #[must_use]
    pub fn trade_for(&self, submitter: &SubmitterId) -> Option<&TradeRecord> {
        self.trade_index
            .get(submitter)
            .and_then(|id| self.trades.get(id))
    }

    #[must_use]
    pub fn trade(&self, trade_id: &TradeId) -> Option<&TradeRecord> {
        self.trades.get(trade_id)
    }

    pub fn trade_mut(&mut self, trade_id: &TradeId) -> Option<&mut TradeRecord> {
        self.trades.get_mut(trade_id)
    }

    // -----------------------------------------------------------------
    // Settlement journal
    // -----------------------------------------------------------------

    #[must_use]
    pub fn progress(&self, match_id: &MatchId) -> Option<&MatchProgress> {
        self.journal.get(match_id)
    }

    pub fn progress_mut(&mut self, match_id: &MatchId) -> Option<&mut MatchProgress> {
        self.journal.get_mut(match_id)
    }

    /// Replace the journal entry with `progress`.
    pub fn store_progress(&mut self, progress: MatchProgress) {
        self.journal.insert(progress.match_id, progress);
    }

    /// Entries whose last attempt failed.
    pub fn stalled(&self) -> impl Iterator<Item = &MatchProgress> {
        self.journal.values().filter(|p| p.is_stalled())
    }

    // -----------------------------------------------------------------
    // Claims
    // -----------------------------------------------------------------

    pub fn claims_mut(&mut self) -> &mut ClaimGuard {
        &mut self.claims
    }
}

impl Default for ExchangeState {
    fn default() -> Self {
        Self::new(offermatch_types::constants::DEFAULT_CLAIM_CACHE_SIZE)
    }
}
