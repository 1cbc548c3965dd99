//! Shared reqwest plumbing for the HTTP clients.

use std::time::Duration;

use offermatch_types::{ExternalService, OffermatchError, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

pub(crate) fn build_client(timeout_ms: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| OffermatchError::Configuration(format!("HTTP client: {e}")))
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

pub(crate) fn transport(service: ExternalService, err: &reqwest::Error) -> OffermatchError {
    OffermatchError::ServiceTransport {
        service,
        reason: err.to_string(),
    }
}

/// Read the full body; a non-2xx status becomes `ServiceStatus` carrying it.
pub(crate) async fn success_body(service: ExternalService, resp: Response) -> Result<Vec<u8>> {
    let status = resp.status();
    let body = resp.bytes().await.map_err(|e| transport(service, &e))?;

    if !status.is_success() {
        let body = String::from_utf8_lossy(&body).into_owned();
        tracing::error!(%service, status = status.as_u16(), %body, "response failure");
        return Err(OffermatchError::ServiceStatus {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(body.to_vec())
}

pub(crate) fn decode<T: DeserializeOwned>(service: ExternalService, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::error!(%service, error = %e, "json unmarshal failure");
        OffermatchError::MalformedResponse {
            service,
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_trailing_slash() {
        assert_eq!(join_url("http://h:1/", "/api/v1/offers"), "http://h:1/api/v1/offers");
        assert_eq!(join_url("http://h:1", "/api/v1/offers"), "http://h:1/api/v1/offers");
    }

    #[test]
    fn decode_failure_is_malformed_response() {
        let err = decode::<serde_json::Value>(ExternalService::Ledger, b"not json").unwrap_err();
        assert!(matches!(
            err,
            OffermatchError::MalformedResponse {
                service: ExternalService::Ledger,
                ..
            }
        ));
    }

    #[test]
    fn explorer_error_body_is_malformed_response() {
        let body = br#"{"error":{"code":104,"message":"Invalid API key"}}"#;
        let err = decode::<crate::TransactionInfo>(ExternalService::Ledger, body).unwrap_err();
        assert!(err.is_ledger());
        assert!(!err.is_rejection());
        assert!(matches!(err, OffermatchError::MalformedResponse { .. }));
    }
}
