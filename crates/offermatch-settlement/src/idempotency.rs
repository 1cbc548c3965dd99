//! Replay protection for claimed payment transactions.
//!
//! A ledger transaction may release at most one trade. Claiming the same
//! [`TxId`] twice returns [`OffermatchError::TransactionAlreadyClaimed`].
//!
//! A release in flight holds a reservation: [`ClaimGuard::reserve`] before the
//! first await, then [`ClaimGuard::confirm`] on success or
//! [`ClaimGuard::release`] on failure. A reserved ID is refused like a
//! claimed one.
//!
//! The guard is a bounded insertion-ordered cache so memory stays
//! predictable on long-running nodes.

use std::collections::{HashSet, VecDeque};

use offermatch_types::{OffermatchError, Result, TxId};

/// Bounded set of transaction IDs that have already released a trade.
///
/// When the set reaches `max_size`, the oldest claim is evicted.
#[derive(Debug)]
pub struct ClaimGuard {
    claimed: HashSet<TxId>,
    /// Reserved by a release that has not finished yet.
    pending: HashSet<TxId>,
    /// Front = oldest.
    order: VecDeque<TxId>,
    max_size: usize,
}

impl ClaimGuard {
    /// A `max_size` of zero is raised to one.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            claimed: HashSet::with_capacity(max_size.min(1024)),
            pending: HashSet::new(),
            order: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Record `tx_id` as spent.
    ///
    /// # Errors
    /// [`OffermatchError::TransactionAlreadyClaimed`] if it was already recorded.
    pub fn claim(&mut self, tx_id: &TxId) -> Result<()> {
        if self.claimed.contains(tx_id) {
            return Err(OffermatchError::TransactionAlreadyClaimed(tx_id.clone()));
        }

        if self.claimed.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.claimed.remove(&oldest);
            }
        }

        self.claimed.insert(tx_id.clone());
        self.order.push_back(tx_id.clone());
        Ok(())
    }

    /// Hold `tx_id` for a release in flight.
    ///
    /// # Errors
    /// [`OffermatchError::TransactionAlreadyClaimed`] if it is claimed or
    /// already reserved.
    pub fn reserve(&mut self, tx_id: &TxId) -> Result<()> {
        if self.claimed.contains(tx_id) || !self.pending.insert(tx_id.clone()) {
            return Err(OffermatchError::TransactionAlreadyClaimed(tx_id.clone()));
        }
        Ok(())
    }

    /// Turn a reservation into a claim.
    ///
    /// # Errors
    /// [`OffermatchError::TransactionAlreadyClaimed`] if it was already claimed.
    pub fn confirm(&mut self, tx_id: &TxId) -> Result<()> {
        self.pending.remove(tx_id);
        self.claim(tx_id)
    }

    /// Drop a reservation without claiming.
    pub fn release(&mut self, tx_id: &TxId) {
        self.pending.remove(tx_id);
    }

    #[must_use]
    pub fn is_reserved(&self, tx_id: &TxId) -> bool {
        self.pending.contains(tx_id)
    }

    #[must_use]
    pub fn is_claimed(&self, tx_id: &TxId) -> bool {
        self.claimed.contains(tx_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
