//! HTTP request handlers.

use alloy_primitives::Address;
use axum::{
    Json,
    extract::{Query, State},
    http::Uri,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::domain::funds::{FundListing, list_funds};
use crate::domain::quote::{QuoteArgs, QuoteResult, TradeType, parse_amount};

use super::{AppState, WebError};

/// Query string accepted by `GET /quote`, named as the routing API names it.
///
/// Every field is optional here so missing values produce a JSON
/// validation error instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteParams {
    pub token_in_address: Option<String>,
    pub token_in_chain_id: Option<String>,
    pub token_out_address: Option<String>,
    pub token_out_chain_id: Option<String>,
    pub amount: Option<String>,
    #[serde(rename = "type")]
    pub trade_type: Option<String>,
    /// Accepted for compatibility; the server's own protocol list applies.
    pub protocols: Option<String>,
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, WebError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WebError::bad_request(format!("missing parameter {name}")))
}

fn address(value: &str, name: &str) -> Result<Address, WebError> {
    Address::from_str(value).map_err(|_| WebError::bad_request(format!("{name} is not an address")))
}

fn chain_id(value: &str, name: &str) -> Result<u64, WebError> {
    value
        .parse()
        .map_err(|_| WebError::bad_request(format!("{name} is not a chain id")))
}

impl QuoteParams {
    pub fn to_args(&self) -> Result<QuoteArgs, WebError> {
        let token_in_chain_id = chain_id(
            required(&self.token_in_chain_id, "tokenInChainId")?,
            "tokenInChainId",
        )?;
        let token_out_chain_id = match self.token_out_chain_id.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => chain_id(v, "tokenOutChainId")?,
            _ => token_in_chain_id,
        };
        let trade_type = TradeType::from_str(required(&self.trade_type, "type")?)
            .map_err(|e| WebError::bad_request(e.to_string()))?;

        Ok(QuoteArgs {
            token_in_address: address(
                required(&self.token_in_address, "tokenInAddress")?,
                "tokenInAddress",
            )?,
            token_in_chain_id,
            token_out_address: address(
                required(&self.token_out_address, "tokenOutAddress")?,
                "tokenOutAddress",
            )?,
            token_out_chain_id,
            amount: parse_amount(required(&self.amount, "amount")?)?,
            trade_type,
        })
    }
}

pub async fn quote(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QuoteParams>,
) -> Result<Response, WebError> {
    let args = params.to_args()?;
    match state.quotes.get_quote(&args).await? {
        QuoteResult::NoRoute => {
            info!(token_in = %args.token_in_address, token_out = %args.token_out_address, "no route");
            Err(WebError::no_route())
        }
        QuoteResult::Quote(quote) => Ok(Json(quote).into_response()),
    }
}

pub async fn funds() -> Json<Vec<FundListing>> {
    Json(list_funds())
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn not_found(uri: Uri) -> WebError {
    WebError::not_found(format!("no handler for {}", uri.path()))
}
