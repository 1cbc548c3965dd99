//! Trading platform contract and wire types.
//!
//! Field names follow the platform's camelCase JSON. Response types default
//! every field so that platform versions omitting a field still decode.

use async_trait::async_trait;
use offermatch_types::{PlatformOfferId, Result, TradeId};
use serde::{Deserialize, Serialize};

/// Operations the orchestrator needs from the trading platform.
///
/// Every call is a synchronous request/response; a non-success status is an
/// error carrying the response body.
#[async_trait]
pub trait TradingPlatform: Send + Sync {
    /// Register a payment account. Returns the account as the platform stored it.
    async fn register_account(&self, account: &PaymentAccount) -> Result<PaymentAccount>;

    /// Publish an offer on the platform.
    async fn publish_offer(&self, offer: &OfferToCreate) -> Result<OfferDetail>;

    /// Take a published offer. Returns the resulting trade.
    async fn take_offer(&self, offer_id: &PlatformOfferId, take: &OfferToTake)
    -> Result<TradeDetails>;

    /// Mark the trade's off-platform payment as started.
    async fn mark_payment_started(&self, trade_id: &TradeId) -> Result<()>;

    /// Mark the trade's off-platform payment as received.
    async fn mark_payment_received(&self, trade_id: &TradeId) -> Result<()>;
}

/// A payment account, both as registered and as returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentAccount {
    pub account_name: String,
    pub trade_currencies: Vec<String>,
    pub payment_method: String,
    /// Empty on registration; assigned by the platform.
    pub id: String,
    /// For on-chain payment methods, the wallet address.
    pub payment_details: String,
    pub selected_trade_currency: String,
}

/// Offer publish request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferToCreate {
    #[serde(rename = "fundUsingBisqWallet")]
    pub fund_using_platform_wallet: bool,
    pub offer_id: String,
    pub account_id: String,
    pub direction: String,
    pub price_type: String,
    pub market_pair: String,
    pub percentage_from_market_price: i64,
    pub fixed_price: i64,
    pub amount: i64,
    pub min_amount: i64,
    pub buyer_security_deposit: i64,
}

/// Offer as the platform reports it after publishing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferDetail {
    pub id: String,
    pub direction: String,
    pub price: i64,
    pub amount: i64,
    pub min_amount: i64,
    pub maker_payment_account_id: String,
    pub offer_fee_payment_tx_id: String,
    pub buyer_security_deposit: i64,
    pub seller_security_deposit: i64,
    pub base_currency_code: String,
    pub counter_currency_code: String,
    pub state: String,
}

/// Offer take request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferToTake {
    pub payment_account_id: String,
    pub amount: i64,
}

/// Trade as the platform reports it after an offer is taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradeDetails {
    pub id: String,
    pub offer: OfferDetail,
    pub buyer_payment_account: Option<PaymentAccount>,
    pub seller_payment_account: Option<PaymentAccount>,
    pub taker_payment_account_id: String,
    pub taker_fee_tx_id: String,
    pub deposit_tx_id: String,
    pub payout_tx_id: String,
    pub trade_amount: i64,
    pub trade_price: i64,
    pub state: String,
    pub error_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_to_create_uses_platform_field_names() {
        let offer = OfferToCreate {
            fund_using_platform_wallet: true,
            account_id: "acct-1".into(),
            direction: "BUY".into(),
            market_pair: "btc_eth".into(),
            fixed_price: 5000,
            amount: 100,
            min_amount: 100,
            buyer_security_deposit: 1,
            ..OfferToCreate::default()
        };
        let json = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["fundUsingBisqWallet"], true);
        assert_eq!(json["accountId"], "acct-1");
        assert_eq!(json["marketPair"], "btc_eth");
        assert_eq!(json["fixedPrice"], 5000);
        assert_eq!(json["minAmount"], 100);
        assert_eq!(json["buyerSecurityDeposit"], 1);
        assert_eq!(json["percentageFromMarketPrice"], 0);
    }

    #[test]
    fn payment_account_decodes_partial_response() {
        let json = r#"{"accountName":"alice","id":"acct-9","paymentDetails":"0xalice"}"#;
        let account: PaymentAccount = serde_json::from_str(json).unwrap();
        assert_eq!(account.id, "acct-9");
        assert_eq!(account.payment_details, "0xalice");
        assert!(account.trade_currencies.is_empty());
    }

    #[test]
    fn trade_details_decodes_nested_offer() {
        let json = r#"{
            "id": "trade-1",
            "offer": {"id": "offer-1", "price": 5000, "amount": 100, "unknownField": 3},
            "takerFeeTxId": "fee-tx",
            "tradeAmount": 100,
            "tradePrice": 5000,
            "state": "DEPOSIT_PUBLISHED"
        }"#;
        let trade: TradeDetails = serde_json::from_str(json).unwrap();
        assert_eq!(trade.id, "trade-1");
        assert_eq!(trade.offer.id, "offer-1");
        assert_eq!(trade.taker_fee_tx_id, "fee-tx");
        assert!(trade.payout_tx_id.is_empty());
        assert!(trade.buyer_payment_account.is_none());
    }

    #[test]
    fn offer_to_take_field_names() {
        let take = OfferToTake {
            payment_account_id: "acct-bob".into(),
            amount: 100,
        };
        let json = serde_json::to_string(&take).unwrap();
        assert_eq!(json, r#"{"paymentAccountId":"acct-bob","amount":100}"#);
    }
}
