//! System-wide constants for the OfferMatch exchange.

/// Default base URL of the trading platform's REST API.
pub const DEFAULT_PLATFORM_URL: &str = "http://localhost:8080";

/// Default base URL of the blockchain explorer.
pub const DEFAULT_LEDGER_URL: &str = "https://api.ethplorer.io";

/// Public explorer key accepted by Ethplorer for rate-limited access.
pub const DEFAULT_LEDGER_API_KEY: &str = "freekey";

/// Assets a registered payment account may trade.
pub const DEFAULT_TRADE_CURRENCIES: [&str; 2] = ["BTC", "ETH"];

/// Payment method used for on-chain settlement.
pub const DEFAULT_PAYMENT_METHOD: &str = "BLOCK_CHAINS";

/// Currency selected on newly registered accounts.
pub const DEFAULT_SELECTED_CURRENCY: &str = "ETH";

/// Market pair offers are published on.
pub const DEFAULT_MARKET_PAIR: &str = "btc_eth";

/// Smallest buyer security deposit the platform accepts.
pub const MIN_BUYER_SECURITY_DEPOSIT: i64 = 1;

/// Outbound request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default API listen port. The platform's own API conventionally holds 8080.
pub const DEFAULT_API_PORT: u16 = 8090;

/// Claimed transaction IDs to remember for replay protection.
pub const DEFAULT_CLAIM_CACHE_SIZE: usize = 100_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
