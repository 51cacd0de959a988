//! Routing API adapter against a throwaway local HTTP server.

mod common;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use charityswap::adapters::routing_api_adapter::RoutingApiAdapter;
use charityswap::domain::error::CharitySwapError;
use charityswap::domain::fee::DonationFee;
use charityswap::domain::quote::TradeType;
use charityswap::domain::routing::QuoteService;
use charityswap::ports::quote_port::QuotePort;
use common::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn quote_handler(
    State(canned): State<Canned>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    canned.seen.lock().unwrap().push(params);
    (canned.status, canned.body.clone()).into_response()
}

/// Serve `body` with `status` on `/api/quote`; returns the base URL.
async fn serve(status: StatusCode, body: String) -> (Url, Arc<Mutex<Vec<HashMap<String, String>>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/quote", get(quote_handler))
        .with_state(Canned {
            status,
            body,
            seen: seen.clone(),
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (Url::parse(&format!("http://{addr}/api")).unwrap(), seen)
}

fn adapter(base: &Url) -> RoutingApiAdapter {
    RoutingApiAdapter::new(base, &[], Some(Duration::from_secs(5))).unwrap()
}

#[tokio::test]
async fn successful_quote_is_parsed_and_query_is_complete() {
    let body = json!({
        "route": [[{ "type": "v2-pool", "amountIn": "1000", "amountOut": "1990" }]],
        "quote": "1990",
        "routeString": "[V2] 100.00% = WETH -- [0xpool] --> USDC"
    });
    let (base, seen) = serve(StatusCode::OK, body.to_string()).await;

    let result = adapter(&base)
        .get_quote(&quote_args(1000, TradeType::ExactInput))
        .await
        .unwrap();

    let quote = result.as_quote().unwrap();
    assert_eq!(quote.route[0][0].amount_out.as_deref(), Some("1990"));
    assert_eq!(quote.extra["quote"], json!("1990"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let q = &seen[0];
    assert_eq!(q["protocols"], "v2,v3");
    assert_eq!(q["tokenInAddress"].to_lowercase(), WETH.to_string().to_lowercase());
    assert_eq!(q["tokenOutAddress"].to_lowercase(), USDC.to_string().to_lowercase());
    assert_eq!(q["tokenInChainId"], "1");
    assert_eq!(q["tokenOutChainId"], "1");
    assert_eq!(q["amount"], "1000");
    assert_eq!(q["type"], "exactIn");
}

#[tokio::test]
async fn exact_output_requests_exact_out() {
    let body = json!({ "route": [[{ "amountIn": "5", "amountOut": "10" }]] });
    let (base, seen) = serve(StatusCode::OK, body.to_string()).await;

    adapter(&base)
        .get_quote(&quote_args(10, TradeType::ExactOutput))
        .await
        .unwrap();
    assert_eq!(seen.lock().unwrap()[0]["type"], "exactOut");
}

#[tokio::test]
async fn no_route_error_code_yields_sentinel() {
    let body = json!({ "errorCode": "NO_ROUTE", "detail": "No route found" });
    let (base, _) = serve(StatusCode::NOT_FOUND, body.to_string()).await;

    let result = adapter(&base)
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap();
    assert!(result.is_no_route());
}

#[tokio::test]
async fn no_route_error_code_on_ok_status_yields_sentinel() {
    let body = json!({ "errorCode": "NO_ROUTE" });
    let (base, _) = serve(StatusCode::OK, body.to_string()).await;

    let result = adapter(&base)
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap();
    assert!(result.is_no_route());
}

/// Remote adapter on the wire plus a counting local fallback.
async fn service_over(status: StatusCode, body: String) -> (QuoteService, Arc<MockQuotePort>) {
    let (base, _) = serve(status, body).await;
    let local = Arc::new(MockQuotePort::quote("local", route_quote("1", "1000")));
    let quotes = QuoteService::new(
        Some(Arc::new(adapter(&base)) as Arc<dyn QuotePort>),
        local.clone(),
        DonationFee::from_ppm(50_000).unwrap(),
    );
    (quotes, local)
}

#[tokio::test]
async fn service_stops_at_no_route_on_ok_status() {
    let body = json!({ "errorCode": "NO_ROUTE", "detail": "No route found" });
    let (quotes, local) = service_over(StatusCode::OK, body.to_string()).await;

    let result = quotes
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap();
    assert!(result.is_no_route());
    assert_eq!(local.calls(), 0);
}

#[tokio::test]
async fn service_stops_at_no_route_on_not_found_status() {
    let body = json!({ "errorCode": "NO_ROUTE", "detail": "No route found" });
    let (quotes, local) = service_over(StatusCode::NOT_FOUND, body.to_string()).await;

    let result = quotes
        .get_quote(&quote_args(1, TradeType::ExactOutput))
        .await
        .unwrap();
    assert!(result.is_no_route());
    assert_eq!(local.calls(), 0);
}

#[tokio::test]
async fn service_falls_back_on_server_error() {
    let body = json!({ "errorCode": "INTERNAL_ERROR" });
    let (quotes, local) = service_over(StatusCode::INTERNAL_SERVER_ERROR, body.to_string()).await;

    let result = quotes
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap();
    assert_eq!(last_amount_out(&result).as_deref(), Some("950"));
    assert_eq!(local.calls(), 1);
}

#[tokio::test]
async fn other_error_statuses_fail() {
    let body = json!({ "errorCode": "INTERNAL_ERROR" });
    let (base, _) = serve(StatusCode::INTERNAL_SERVER_ERROR, body.to_string()).await;

    let err = adapter(&base)
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap_err();
    assert!(matches!(err, CharitySwapError::RemoteStatus { status: 500, .. }));
}

#[tokio::test]
async fn unparseable_success_body_fails() {
    let (base, _) = serve(StatusCode::OK, "<html>oops</html>".to_string()).await;

    let err = adapter(&base)
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap_err();
    assert!(matches!(err, CharitySwapError::MalformedQuote { .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    let err = adapter(&base)
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap_err();
    assert!(matches!(err, CharitySwapError::RemoteTransport { .. }));
}

#[tokio::test]
async fn json_body_is_reused_verbatim() {
    let body = json!({ "route": [[{ "amountIn": "1", "amountOut": "2", "pool": { "fee": 3000 } }]] });
    let (base, _) = serve(StatusCode::OK, body.to_string()).await;

    let result = adapter(&base)
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap();
    assert_eq!(serde_json::to_value(&result).unwrap(), body);
}
