//! Bisq REST API client.
//!
//! ```text
//! POST /api/v1/payment-accounts
//! POST /api/v1/offers
//! POST /api/v1/offers/{offerId}/take
//! POST /api/v1/trades/{tradeId}/payment-started
//! POST /api/v1/trades/{tradeId}/payment-received
//! ```

use async_trait::async_trait;
use offermatch_types::{ExternalService, PlatformConfig, PlatformOfferId, Result, TradeId};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::http::{build_client, decode, join_url, success_body, transport};
use crate::platform::{
    OfferDetail, OfferToCreate, OfferToTake, PaymentAccount, TradeDetails, TradingPlatform,
};

const SERVICE: ExternalService = ExternalService::TradingPlatform;

pub const PAYMENT_ACCOUNTS_PATH: &str = "/api/v1/payment-accounts";
pub const OFFERS_PATH: &str = "/api/v1/offers";

fn take_offer_path(offer_id: &PlatformOfferId) -> String {
    format!("{OFFERS_PATH}/{offer_id}/take")
}

fn payment_started_path(trade_id: &TradeId) -> String {
    format!("/api/v1/trades/{trade_id}/payment-started")
}

fn payment_received_path(trade_id: &TradeId) -> String {
    format!("/api/v1/trades/{trade_id}/payment-received")
}

/// [`TradingPlatform`] over the Bisq HTTP API.
#[derive(Debug, Clone)]
pub struct BisqHttpClient {
    client: Client,
    base_url: String,
}

impl BisqHttpClient {
    /// Build a client with its own connection pool and the configured timeout.
    pub fn new(config: &PlatformConfig) -> Result<Self> {
        Ok(Self::with_client(
            build_client(config.request_timeout_ms)?,
            config.base_url.clone(),
        ))
    }

    /// Build on an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = join_url(&self.base_url, path);
        tracing::debug!(%url, "sending request to trading platform");
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(SERVICE, &e))?;
        let body = success_body(SERVICE, resp).await?;
        decode(SERVICE, &body)
    }

    async fn post_empty(&self, path: &str) -> Result<()> {
        let url = join_url(&self.base_url, path);
        tracing::debug!(%url, "sending request to trading platform");
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| transport(SERVICE, &e))?;
        success_body(SERVICE, resp).await.map(|_| ())
    }
}

#[async_trait]
impl TradingPlatform for BisqHttpClient {
    async fn register_account(&self, account: &PaymentAccount) -> Result<PaymentAccount> {
        self.post_json(PAYMENT_ACCOUNTS_PATH, account).await
    }

    async fn publish_offer(&self, offer: &OfferToCreate) -> Result<OfferDetail> {
        self.post_json(OFFERS_PATH, offer).await
    }

    async fn take_offer(
        &self,
        offer_id: &PlatformOfferId,
        take: &OfferToTake,
    ) -> Result<TradeDetails> {
        self.post_json(&take_offer_path(offer_id), take).await
    }

    async fn mark_payment_started(&self, trade_id: &TradeId) -> Result<()> {
        self.post_empty(&payment_started_path(trade_id)).await
    }

    async fn mark_payment_received(&self, trade_id: &TradeId) -> Result<()> {
        self.post_empty(&payment_received_path(trade_id)).await
    }
}
