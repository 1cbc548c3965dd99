//! Ethplorer explorer client.

use async_trait::async_trait;
use offermatch_types::{ExternalService, LedgerConfig, Result, TxId};
use reqwest::Client;

use crate::http::{build_client, decode, join_url, success_body, transport};
use crate::ledger::{LedgerVerifier, TransactionInfo};

const SERVICE: ExternalService = ExternalService::Ledger;

/// [`LedgerVerifier`] over `GET {base}/getTxInfo/{txId}?apiKey={key}`.
#[derive(Debug, Clone)]
pub struct EthplorerClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl EthplorerClient {
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        Ok(Self::with_client(
            build_client(config.request_timeout_ms)?,
            config.base_url.clone(),
            config.api_key.clone(),
        ))
    }

    #[must_use]
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn tx_url(&self, tx_id: &TxId) -> String {
        join_url(&self.base_url, &format!("/getTxInfo/{tx_id}"))
    }
}

#[async_trait]
impl LedgerVerifier for EthplorerClient {
    async fn lookup_transaction(&self, tx_id: &TxId) -> Result<TransactionInfo> {
        let url = self.tx_url(tx_id);
        tracing::debug!(%url, "sending request to ledger explorer");
        let resp = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| transport(SERVICE, &e))?;
        let body = success_body(SERVICE, resp).await?;
        decode(SERVICE, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_url_layout() {
        let client = EthplorerClient::new(&LedgerConfig::default()).unwrap();
        assert_eq!(
            client.tx_url(&TxId::new("0xabc")),
            "https://api.ethplorer.io/getTxInfo/0xabc"
        );
    }
}
