//! # offermatch-book
//!
//! **Offer book and matching engine for OfferMatch.**
//!
//! The book holds unmatched offers, one per submitter per direction. The
//! matcher decides whether an incoming offer is structurally equal to a
//! resting offer on the opposite side:
//!
//! - **Exact equality**: same token, same amount, same price
//! - **No self-matching**: a submitter never matches their own offer
//! - **No partial fills**: amounts must be identical
//! - **First found wins**: no price or time priority among equal candidates
//!
//! [`match_or_book`] performs lookup, removal, and insertion as one step so
//! the caller can run it inside a single critical section.

pub mod book;
pub mod matcher;

pub use book::OfferBook;
pub use matcher::{BookOutcome, MatchedPair, find_counter_offer, is_compatible, match_or_book};
