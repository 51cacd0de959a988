//! Quote retrieval policy: source order, fallback, fee application and caching.

mod common;

use charityswap::domain::error::CharitySwapError;
use charityswap::domain::fee::DonationFee;
use charityswap::domain::quote::{QuoteResult, TradeType};
use charityswap::domain::routing::QuoteService;
use common::*;
use std::sync::Arc;
use std::time::Duration;

fn service(remote: Option<Arc<MockQuotePort>>, local: Arc<MockQuotePort>) -> QuoteService {
    QuoteService::new(
        remote.map(|r| r as Arc<dyn charityswap::ports::quote_port::QuotePort>),
        local,
        DonationFee::from_ppm(50_000).unwrap(),
    )
}

#[tokio::test]
async fn remote_quote_is_fee_adjusted_exact_input() {
    let remote = Arc::new(MockQuotePort::quote("remote", route_quote("1", "1000000")));
    let local = Arc::new(MockQuotePort::no_route("local"));
    let quotes = service(Some(remote.clone()), local.clone());

    let result = quotes
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap();

    assert_eq!(last_amount_out(&result).as_deref(), Some("950000"));
    assert_eq!(first_amount_in(&result).as_deref(), Some("1"));
    assert_eq!(remote.calls(), 1);
    assert_eq!(local.calls(), 0);
}

#[tokio::test]
async fn remote_quote_is_fee_adjusted_exact_output() {
    let remote = Arc::new(MockQuotePort::quote("remote", route_quote("950000", "7")));
    let local = Arc::new(MockQuotePort::no_route("local"));
    let quotes = service(Some(remote), local);

    let result = quotes
        .get_quote(&quote_args(7, TradeType::ExactOutput))
        .await
        .unwrap();

    assert_eq!(first_amount_in(&result).as_deref(), Some("1000000"));
    assert_eq!(last_amount_out(&result).as_deref(), Some("7"));
}

#[tokio::test]
async fn remote_no_route_is_final() {
    let remote = Arc::new(MockQuotePort::no_route("remote"));
    let local = Arc::new(MockQuotePort::quote("local", route_quote("1", "1000")));
    let quotes = service(Some(remote.clone()), local.clone());

    let result = quotes
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap();

    assert_eq!(result, QuoteResult::NoRoute);
    assert_eq!(remote.calls(), 1);
    assert_eq!(local.calls(), 0);
}

#[tokio::test]
async fn remote_network_error_falls_back_to_local() {
    let remote = Arc::new(MockQuotePort::network_error("remote", "connection refused"));
    let local = Arc::new(MockQuotePort::quote("local", route_quote("1", "1000000")));
    let quotes = service(Some(remote.clone()), local.clone());

    let result = quotes
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap();

    assert_eq!(last_amount_out(&result).as_deref(), Some("950000"));
    assert_eq!(remote.calls(), 1);
    assert_eq!(local.calls(), 1);
    assert_eq!(local.seen(), vec![quote_args(1, TradeType::ExactInput)]);
}

#[tokio::test]
async fn local_no_route_after_remote_failure_is_no_route() {
    let remote = Arc::new(MockQuotePort::network_error("remote", "timeout"));
    let local = Arc::new(MockQuotePort::no_route("local"));
    let quotes = service(Some(remote), local);

    let result = quotes
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap();
    assert!(result.is_no_route());
}

#[tokio::test]
async fn both_sources_failing_reports_local_message() {
    let remote = Arc::new(MockQuotePort::network_error("remote", "connection refused"));
    let local = Arc::new(MockQuotePort::local_error("local", "pool snapshot missing"));
    let quotes = service(Some(remote), local);

    let err = quotes
        .get_quote(&quote_args(1, TradeType::ExactInput))
        .await
        .unwrap_err();

    match err {
        CharitySwapError::QuoteFailed { reason } => {
            assert!(reason.contains("pool snapshot missing"), "{reason}");
            assert!(!reason.contains("connection refused"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn fee_is_applied_exactly_once_per_answer() {
    let local = Arc::new(MockQuotePort::quote("local", route_quote("1", "1000000")));
    let quotes = service(None, local);
    let args = quote_args(1, TradeType::ExactInput);

    let first = quotes.get_quote(&args).await.unwrap();
    let cached = quotes.get_quote(&args).await.unwrap();
    assert_eq!(last_amount_out(&first).as_deref(), Some("950000"));
    assert_eq!(first, cached);
}

#[tokio::test(start_paused = true)]
async fn cached_quote_expires_after_ttl() {
    let local = Arc::new(MockQuotePort::quote("local", route_quote("1", "1000")));
    let quotes = service(None, local.clone());
    let args = quote_args(1, TradeType::ExactInput);

    quotes.get_quote(&args).await.unwrap();
    tokio::time::advance(Duration::from_secs(9)).await;
    quotes.get_quote(&args).await.unwrap();
    assert_eq!(local.calls(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    quotes.get_quote(&args).await.unwrap();
    assert_eq!(local.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn custom_ttl_is_honoured() {
    let local = Arc::new(MockQuotePort::quote("local", route_quote("1", "1000")));
    let quotes = service(None, local.clone()).with_ttl(Duration::from_secs(60));
    let args = quote_args(1, TradeType::ExactInput);

    quotes.get_quote(&args).await.unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;
    quotes.get_quote(&args).await.unwrap();
    assert_eq!(local.calls(), 1);
}

#[tokio::test]
async fn trade_type_and_amount_are_part_of_the_cache_key() {
    let local = Arc::new(MockQuotePort::quote("local", route_quote("1", "1000")));
    let quotes = service(None, local.clone());

    quotes.get_quote(&quote_args(1, TradeType::ExactInput)).await.unwrap();
    quotes.get_quote(&quote_args(1, TradeType::ExactOutput)).await.unwrap();
    quotes.get_quote(&quote_args(2, TradeType::ExactInput)).await.unwrap();
    assert_eq!(local.calls(), 3);
}

#[tokio::test]
async fn cached_no_route_is_served_without_refetch() {
    let remote = Arc::new(MockQuotePort::no_route("remote"));
    let local = Arc::new(MockQuotePort::no_route("local"));
    let quotes = service(Some(remote.clone()), local);
    let args = quote_args(1, TradeType::ExactInput);

    assert!(quotes.get_quote(&args).await.unwrap().is_no_route());
    assert!(quotes.get_quote(&args).await.unwrap().is_no_route());
    assert_eq!(remote.calls(), 1);
}
