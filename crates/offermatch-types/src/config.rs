//! Configuration types for an OfferMatch node.
//!
//! Every section has a `Default` carrying the values the exchange has always
//! run with, so a node starts with no config file at all.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Top-level configuration for a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Address to listen on for the HTTP API.
    pub listen_addr: SocketAddr,
    pub platform: PlatformConfig,
    pub ledger: LedgerConfig,
    pub account: AccountTemplate,
    pub offer: OfferTemplate,
    /// How payment addresses are compared during settlement.
    pub address_policy: AddressPolicy,
    /// Claimed transaction IDs remembered for replay protection.
    pub claim_cache_size: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], constants::DEFAULT_API_PORT)),
            platform: PlatformConfig::default(),
            ledger: LedgerConfig::default(),
            account: AccountTemplate::default(),
            offer: OfferTemplate::default(),
            address_policy: AddressPolicy::default(),
            claim_cache_size: constants::DEFAULT_CLAIM_CACHE_SIZE,
        }
    }
}

/// Trading platform connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_PLATFORM_URL.to_string(),
            request_timeout_ms: constants::DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

/// Blockchain explorer connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_LEDGER_URL.to_string(),
            api_key: constants::DEFAULT_LEDGER_API_KEY.to_string(),
            request_timeout_ms: constants::DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

/// Fixed fields of every payment-account registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountTemplate {
    pub trade_currencies: Vec<String>,
    pub payment_method: String,
    pub selected_trade_currency: String,
}

impl Default for AccountTemplate {
    fn default() -> Self {
        Self {
            trade_currencies: constants::DEFAULT_TRADE_CURRENCIES
                .iter()
                .map(ToString::to_string)
                .collect(),
            payment_method: constants::DEFAULT_PAYMENT_METHOD.to_string(),
            selected_trade_currency: constants::DEFAULT_SELECTED_CURRENCY.to_string(),
        }
    }
}

/// Fixed fields of every offer published on a buyer's behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferTemplate {
    pub market_pair: String,
    pub buyer_security_deposit: i64,
    pub fund_using_platform_wallet: bool,
}

impl Default for OfferTemplate {
    fn default() -> Self {
        Self {
            market_pair: constants::DEFAULT_MARKET_PAIR.to_string(),
            buyer_security_deposit: constants::MIN_BUYER_SECURITY_DEPOSIT,
            fund_using_platform_wallet: true,
        }
    }
}

/// Address comparison used when verifying a payment.
///
/// `Exact` compares bytes. `IgnoreAsciiCase` folds hex casing, which is what
/// EIP-55 checksummed and lowercase renderings of one address differ by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressPolicy {
    #[default]
    Exact,
    IgnoreAsciiCase,
}

impl AddressPolicy {
    #[must_use]
    pub fn matches(self, expected: &str, actual: &str) -> bool {
        match self {
            Self::Exact => expected == actual,
            Self::IgnoreAsciiCase => expected.eq_ignore_ascii_case(actual),
        }
    }
}
