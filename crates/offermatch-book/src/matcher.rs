//! Exact-equality matching.
//!
//! ```text
//! match_or_book(&mut OfferBook, Offer) -> BookOutcome
//! ```
//!
//! An incoming offer `O` matches a resting offer `C` on the opposite side iff
//! `C.submitter != O.submitter && C.token == O.token && C.amount == O.amount
//! && C.price == O.price`. The opposite side is scanned in `HashMap` order
//! and the first compatible offer wins.

use offermatch_types::{Direction, Offer};

use crate::OfferBook;

/// A buy and a sell offer that settle against each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub buy: Offer,
    pub sell: Offer,
}

impl MatchedPair {
    /// Orient an incoming offer and the resting offer it matched.
    #[must_use]
    pub fn from_incoming(incoming: Offer, resting: Offer) -> Self {
        match incoming.direction {
            Direction::Buy => Self {
                buy: incoming,
                sell: resting,
            },
            Direction::Sell => Self {
                buy: resting,
                sell: incoming,
            },
        }
    }
}

/// Result of offering an incoming offer to the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookOutcome {
    /// A counter-offer was found and removed from the book.
    Matched(MatchedPair),
    /// No counter-offer; the incoming offer now rests in the book.
    Booked {
        /// The submitter's earlier offer in the same direction, if any.
        replaced: Option<Offer>,
    },
}

/// Structural compatibility of an incoming offer with a resting one.
#[must_use]
pub fn is_compatible(incoming: &Offer, resting: &Offer) -> bool {
    resting.direction == incoming.direction.opposite()
        && resting.submitter != incoming.submitter
        && resting.token == incoming.token
        && resting.amount == incoming.amount
        && resting.price == incoming.price
}

/// First compatible resting offer on the opposite side, if any.
#[must_use]
pub fn find_counter_offer<'a>(book: &'a OfferBook, incoming: &Offer) -> Option<&'a Offer> {
    book.offers(incoming.direction.opposite())
        .find(|resting| is_compatible(incoming, resting))
}

/// Match `incoming` against the book, or book it.
///
/// On a match the counter-offer is removed and `incoming` is never inserted.
/// Otherwise `incoming` is inserted on its own side, replacing any open
/// offer the same submitter had there.
pub fn match_or_book(book: &mut OfferBook, incoming: Offer) -> BookOutcome {
    let counter = find_counter_offer(book, &incoming).map(|c| c.submitter.clone());

    if let Some(submitter) = counter {
        if let Some(resting) = book.remove(incoming.direction.opposite(), &submitter) {
            tracing::debug!(
                incoming = %incoming.submitter,
                resting = %resting.submitter,
                token = %incoming.token,
                "counter-offer found"
            );
            return BookOutcome::Matched(MatchedPair::from_incoming(incoming, resting));
        }
    }

    tracing::debug!(submitter = %incoming.submitter, direction = %incoming.direction, "no counter-offer, booking");
    let replaced = book.insert(incoming);
    BookOutcome::Booked { replaced }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;

    use super::*;

    fn offer(submitter: &str, direction: Direction, token: &str, amount: i64, price: i64) -> Offer {
        Offer::dummy(submitter, direction, token, amount, price)
    }

    #[test]
    fn buy_then_sell_matches() {
        let mut book = OfferBook::new();
        let first = match_or_book(&mut book, offer("alice", Direction::Buy, "ETH", 100, 5000));
        assert!(matches!(first, BookOutcome::Booked { replaced: None }));

        let second = match_or_book(&mut book, offer("bob", Direction::Sell, "ETH", 100, 5000));
        let BookOutcome::Matched(pair) = second else {
            panic!("expected a match, got {second:?}");
        };
        assert_eq!(pair.buy.submitter.as_str(), "alice");
        assert_eq!(pair.sell.submitter.as_str(), "bob");
        assert!(book.is_empty(), "neither offer may remain booked");
    }

    #[test]
    fn sell_then_buy_matches_with_same_orientation() {
        let mut book = OfferBook::new();
        match_or_book(&mut book, offer("bob", Direction::Sell, "ETH", 100, 5000));
        let outcome = match_or_book(&mut book, offer("alice", Direction::Buy, "ETH", 100, 5000));
        let BookOutcome::Matched(pair) = outcome else {
            panic!("expected a match");
        };
        assert_eq!(pair.buy.submitter.as_str(), "alice");
        assert_eq!(pair.sell.submitter.as_str(), "bob");
        assert!(book.is_empty());
    }

    #[test]
    fn differing_fields_never_match() {
        let variants = [
            offer("bob", Direction::Sell, "BTC", 100, 5000),
            offer("bob", Direction::Sell, "ETH", 101, 5000),
            offer("bob", Direction::Sell, "ETH", 100, 4999),
        ];
        for counter in variants {
            let mut book = OfferBook::new();
            match_or_book(&mut book, offer("alice", Direction::Buy, "ETH", 100, 5000));
            let outcome = match_or_book(&mut book, counter);
            assert!(matches!(outcome, BookOutcome::Booked { .. }));
            assert!(book.contains(Direction::Buy, &"alice".into()));
            assert!(book.contains(Direction::Sell, &"bob".into()));
        }
    }

    #[test]
    fn same_direction_never_matches() {
        let mut book = OfferBook::new();
        match_or_book(&mut book, offer("alice", Direction::Buy, "ETH", 100, 5000));
        let outcome = match_or_book(&mut book, offer("bob", Direction::Buy, "ETH", 100, 5000));
        assert!(matches!(outcome, BookOutcome::Booked { .. }));
        assert_eq!(book.depth(Direction::Buy), 2);
    }

    #[test]
    fn self_match_prevented() {
        let mut book = OfferBook::new();
        match_or_book(&mut book, offer("alice", Direction::Sell, "ETH", 100, 5000));
        let outcome = match_or_book(&mut book, offer("alice", Direction::Buy, "ETH", 100, 5000));
        assert!(matches!(outcome, BookOutcome::Booked { .. }));
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn replaced_offer_is_no_longer_matchable() {
        let mut book = OfferBook::new();
        match_or_book(&mut book, offer("alice", Direction::Buy, "ETH", 100, 5000));
        let outcome = match_or_book(&mut book, offer("alice", Direction::Buy, "ETH", 200, 5000));
        let BookOutcome::Booked { replaced } = outcome else {
            panic!("expected booking");
        };
        assert_eq!(replaced.unwrap().amount, 100);

        let stale = match_or_book(&mut book, offer("bob", Direction::Sell, "ETH", 100, 5000));
        assert!(matches!(stale, BookOutcome::Booked { .. }));

        let fresh = match_or_book(&mut book, offer("carol", Direction::Sell, "ETH", 200, 5000));
        assert!(matches!(fresh, BookOutcome::Matched(_)));
    }

    #[test]
    fn exactly_one_of_several_candidates_is_consumed() {
        let mut book = OfferBook::new();
        for name in ["s1", "s2", "s3"] {
            match_or_book(&mut book, offer(name, Direction::Sell, "ETH", 100, 5000));
        }
        let outcome = match_or_book(&mut book, offer("alice", Direction::Buy, "ETH", 100, 5000));
        assert!(matches!(outcome, BookOutcome::Matched(_)));
        assert_eq!(book.depth(Direction::Sell), 2);
        assert_eq!(book.depth(Direction::Buy), 0);
    }

    #[test]
    fn shuffled_pairs_all_match() {
        let mut rng = rand::thread_rng();
        let mut offers = Vec::new();
        for i in 0..50_i64 {
            offers.push(offer(&format!("buyer-{i}"), Direction::Buy, "ETH", 10 + i, 1000 + i));
            offers.push(offer(&format!("seller-{i}"), Direction::Sell, "ETH", 10 + i, 1000 + i));
        }
        offers.shuffle(&mut rng);

        let mut book = OfferBook::new();
        let matches = offers
            .into_iter()
            .filter(|o| matches!(match_or_book(&mut book, o.clone()), BookOutcome::Matched(_)))
            .count();
        assert_eq!(matches, 50);
        assert!(book.is_empty());
    }
}
