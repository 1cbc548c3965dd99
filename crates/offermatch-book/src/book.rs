//! The offer book.
//!
//! Two maps, one per direction, keyed by submitter:
//! - **Buys**: `HashMap<SubmitterId, Offer>`
//! - **Sells**: `HashMap<SubmitterId, Offer>`
//!
//! A submitter has at most one open offer per direction; a new offer in the
//! same direction replaces the old one.

use std::collections::HashMap;

use offermatch_types::{Direction, Offer, SubmitterId};

/// Unmatched offers, split by direction.
#[derive(Debug, Default)]
pub struct OfferBook {
    buys: HashMap<SubmitterId, Offer>,
    sells: HashMap<SubmitterId, Offer>,
}

impl OfferBook {
    /// Create a new empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn side(&self, direction: Direction) -> &HashMap<SubmitterId, Offer> {
        match direction {
            Direction::Buy => &self.buys,
            Direction::Sell => &self.sells,
        }
    }

    fn side_mut(&mut self, direction: Direction) -> &mut HashMap<SubmitterId, Offer> {
        match direction {
            Direction::Buy => &mut self.buys,
            Direction::Sell => &mut self.sells,
        }
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Insert an offer into its own direction's side.
    ///
    /// Returns the submitter's previous open offer in that direction, which
    /// is no longer matchable.
    pub fn insert(&mut self, offer: Offer) -> Option<Offer> {
        self.side_mut(offer.direction)
            .insert(offer.submitter.clone(), offer)
    }

    /// Remove a submitter's offer from one side.
    pub fn remove(&mut self, direction: Direction, submitter: &SubmitterId) -> Option<Offer> {
        self.side_mut(direction).remove(submitter)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Look up a submitter's open offer on one side.
    #[must_use]
    pub fn get(&self, direction: Direction, submitter: &SubmitterId) -> Option<&Offer> {
        self.side(direction).get(submitter)
    }

    #[must_use]
    pub fn contains(&self, direction: Direction, submitter: &SubmitterId) -> bool {
        self.side(direction).contains_key(submitter)
    }

    /// Iterate one side in arbitrary order.
    pub fn offers(&self, direction: Direction) -> impl Iterator<Item = &Offer> {
        self.side(direction).values()
    }

    /// Number of offers on one side.
    #[must_use]
    pub fn depth(&self, direction: Direction) -> usize {
        self.side(direction).len()
    }

    /// Total number of open offers on both sides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buys.len() + self.sells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(submitter: &str, amount: i64, price: i64) -> Offer {
        Offer::dummy(submitter, Direction::Buy, "ETH", amount, price)
    }

    fn sell(submitter: &str, amount: i64, price: i64) -> Offer {
        Offer::dummy(submitter, Direction::Sell, "ETH", amount, price)
    }

    #[test]
    fn insert_goes_to_own_side() {
        let mut book = OfferBook::new();
        book.insert(buy("alice", 100, 5000));
        book.insert(sell("bob", 100, 5000));

        assert!(book.contains(Direction::Buy, &"alice".into()));
        assert!(book.contains(Direction::Sell, &"bob".into()));
        assert!(!book.contains(Direction::Sell, &"alice".into()));
        assert_eq!(book.depth(Direction::Buy), 1);
        assert_eq!(book.depth(Direction::Sell), 1);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn same_direction_resubmission_replaces() {
        let mut book = OfferBook::new();
        assert!(book.insert(buy("alice", 100, 5000)).is_none());

        let replaced = book.insert(buy("alice", 200, 4000)).unwrap();
        assert_eq!(replaced.amount, 100);
        assert_eq!(book.depth(Direction::Buy), 1);
        assert_eq!(book.get(Direction::Buy, &"alice".into()).unwrap().amount, 200);
    }

    #[test]
    fn remove_returns_offer() {
        let mut book = OfferBook::new();
        book.insert(sell("bob", 100, 5000));
        let removed = book.remove(Direction::Sell, &"bob".into()).unwrap();
        assert_eq!(removed.submitter.as_str(), "bob");
        assert!(book.is_empty());
        assert!(book.remove(Direction::Sell, &"bob".into()).is_none());
    }

    #[test]
    fn empty_book() {
        let book = OfferBook::new();
        assert!(book.is_empty());
        assert_eq!(book.len(), 0);
        assert_eq!(book.offers(Direction::Buy).count(), 0);
        assert!(book.get(Direction::Sell, &"nobody".into()).is_none());
    }
}
