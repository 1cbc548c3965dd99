//! HTTP API.
//!
//! ```text
//! POST /buy                      OfferRequest       -> {matched, message}
//! POST /sell                     OfferRequest       -> {matched, message}
//! GET  /check-offer?account=     -                  -> {wallet}
//! POST /money-sent?account=      {transactionID}    -> {tradeId, state}
//! ```
//!
//! Rejected input answers 400, anything else that fails answers 500. Error
//! bodies are `{"error": "<message>"}`.

use std::convert::Infallible;
use std::sync::Arc;

use offermatch_gateway::{LedgerVerifier, TradingPlatform};
use offermatch_settlement::{Orchestrator, SubmitOutcome};
use offermatch_types::{Direction, OfferRequest, OffermatchError, SubmitterId, TxId};
use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
struct AccountQuery {
    account: Option<String>,
}

impl AccountQuery {
    fn submitter(self) -> Result<SubmitterId, OffermatchError> {
        self.account
            .filter(|a| !a.is_empty())
            .map(SubmitterId::new)
            .ok_or(OffermatchError::MissingParameter("account"))
    }
}

#[derive(Debug, Deserialize)]
struct MoneySentRequest {
    #[serde(rename = "transactionID", default)]
    transaction_id: String,
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    matched: bool,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct CheckOfferResponse {
    wallet: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoneySentResponse {
    trade_id: String,
    state: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// All routes, with rejections recovered into JSON error replies.
pub fn routes<P, L>(
    orch: Arc<Orchestrator<P, L>>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone
where
    P: TradingPlatform + 'static,
    L: LedgerVerifier + 'static,
{
    let buy = warp::path("buy")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_orchestrator(Arc::clone(&orch)))
        .and(warp::body::json())
        .and_then(|orch: Arc<Orchestrator<P, L>>, request: OfferRequest| {
            submit_offer(orch, request, Direction::Buy)
        });

    let sell = warp::path("sell")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_orchestrator(Arc::clone(&orch)))
        .and(warp::body::json())
        .and_then(|orch: Arc<Orchestrator<P, L>>, request: OfferRequest| {
            submit_offer(orch, request, Direction::Sell)
        });

    let check_offer_route = warp::path("check-offer")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_orchestrator(Arc::clone(&orch)))
        .and(warp::query::<AccountQuery>())
        .and_then(check_offer::<P, L>);

    let money_sent_route = warp::path("money-sent")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_orchestrator(orch))
        .and(warp::query::<AccountQuery>())
        .and(warp::body::json())
        .and_then(money_sent::<P, L>);

    buy.or(sell)
        .or(check_offer_route)
        .or(money_sent_route)
        .recover(handle_rejection)
}

fn with_orchestrator<P, L>(
    orch: Arc<Orchestrator<P, L>>,
) -> impl Filter<Extract = (Arc<Orchestrator<P, L>>,), Error = Infallible> + Clone
where
    P: TradingPlatform + 'static,
    L: LedgerVerifier + 'static,
{
    warp::any().map(move || Arc::clone(&orch))
}

async fn submit_offer<P, L>(
    orch: Arc<Orchestrator<P, L>>,
    request: OfferRequest,
    route: Direction,
) -> Result<Response, Infallible>
where
    P: TradingPlatform,
    L: LedgerVerifier,
{
    let outcome = match request.into_offer(Some(route)) {
        Ok(offer) => orch.submit(offer).await,
        Err(err) => Err(err),
    };
    Ok(match outcome {
        Ok(SubmitOutcome::Matched(_)) => json_reply(
            &SubmitResponse {
                matched: true,
                message: "offer matched",
            },
            StatusCode::OK,
        ),
        Ok(SubmitOutcome::Queued) => json_reply(
            &SubmitResponse {
                matched: false,
                message: "offer saved",
            },
            StatusCode::OK,
        ),
        Err(err) => error_reply(&err),
    })
}

async fn check_offer<P, L>(
    orch: Arc<Orchestrator<P, L>>,
    query: AccountQuery,
) -> Result<Response, Infallible>
where
    P: TradingPlatform,
    L: LedgerVerifier,
{
    let submitter = match query.submitter() {
        Ok(s) => s,
        Err(err) => return Ok(error_reply(&err)),
    };
    let wallet = orch
        .counterparty_wallet(&submitter)
        .await
        .unwrap_or_default();
    Ok(json_reply(&CheckOfferResponse { wallet }, StatusCode::OK))
}

async fn money_sent<P, L>(
    orch: Arc<Orchestrator<P, L>>,
    query: AccountQuery,
    request: MoneySentRequest,
) -> Result<Response, Infallible>
where
    P: TradingPlatform,
    L: LedgerVerifier,
{
    let payer = match query.submitter() {
        Ok(s) => s,
        Err(err) => return Ok(error_reply(&err)),
    };
    if request.transaction_id.is_empty() {
        return Ok(error_reply(&OffermatchError::MissingParameter("transactionID")));
    }
    let tx_id = TxId::new(request.transaction_id);

    Ok(match orch.verify_and_settle(&tx_id, &payer).await {
        Ok(trade) => json_reply(
            &MoneySentResponse {
                trade_id: trade.trade_id.to_string(),
                state: trade.state.to_string(),
            },
            StatusCode::OK,
        ),
        Err(err) => error_reply(&err),
    })
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn status_for(err: &OffermatchError) -> StatusCode {
    if err.is_rejection() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_reply(err: &OffermatchError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        tracing::error!(%err, "request failed");
    } else {
        tracing::warn!(%err, "request rejected");
    }
    json_reply(
        &ErrorResponse {
            error: err.to_string(),
        },
        status,
    )
}

async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let (status, error) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if let Some(e) = rejection.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else if let Some(e) = rejection.find::<warp::reject::UnsupportedMediaType>() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string())
    } else {
        tracing::error!(?rejection, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };
    Ok(json_reply(&ErrorResponse { error }, status))
}
