//! Remote routing API quote source.

use crate::domain::config_validation::{DEFAULT_PROTOCOLS, with_trailing_slash};
use crate::domain::error::CharitySwapError;
use crate::domain::quote::{NO_ROUTE, Quote, QuoteArgs, QuoteResult};
use crate::ports::quote_port::QuotePort;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Error body returned by the routing API on non-success statuses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_code: Option<String>,
}

pub struct RoutingApiAdapter {
    client: Client,
    base_url: Url,
    protocols: Vec<String>,
}

impl RoutingApiAdapter {
    pub fn new(
        base_url: &Url,
        protocols: &[String],
        timeout: Option<Duration>,
    ) -> Result<Self, CharitySwapError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let protocols = if protocols.is_empty() {
            DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect()
        } else {
            protocols.iter().map(|p| p.trim().to_lowercase()).collect()
        };
        Ok(Self {
            client: builder.build()?,
            base_url: with_trailing_slash(base_url.clone()),
            protocols,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full request URL for `args`.
    pub fn build_quote_url(&self, args: &QuoteArgs) -> Result<Url, CharitySwapError> {
        let mut url = self
            .base_url
            .join("quote")
            .map_err(|e| CharitySwapError::RemoteTransport {
                reason: format!("bad router url: {e}"),
            })?;
        url.query_pairs_mut()
            .append_pair("protocols", &self.protocols.join(","))
            .append_pair("tokenInAddress", &args.token_in_address.to_string())
            .append_pair("tokenInChainId", &args.token_in_chain_id.to_string())
            .append_pair("tokenOutAddress", &args.token_out_address.to_string())
            .append_pair("tokenOutChainId", &args.token_out_chain_id.to_string())
            .append_pair("amount", &args.amount.to_string())
            .append_pair("type", args.trade_type.as_query_value());
        Ok(url)
    }
}

/// Interpret a routing API response body.
///
/// A `NO_ROUTE` error code is the no-route answer whatever the status.
pub fn interpret_response(status: u16, body: &str) -> Result<QuoteResult, CharitySwapError> {
    let code = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error_code);
    if code.as_deref() == Some(NO_ROUTE) {
        return Ok(QuoteResult::NoRoute);
    }
    if !(200..300).contains(&status) {
        return Err(CharitySwapError::RemoteStatus {
            status,
            body: body.to_string(),
        });
    }
    serde_json::from_str::<Quote>(body)
        .map(QuoteResult::Quote)
        .map_err(|e| CharitySwapError::MalformedQuote {
            reason: e.to_string(),
        })
}

#[async_trait]
impl QuotePort for RoutingApiAdapter {
    fn name(&self) -> &str {
        "routing-api"
    }

    async fn get_quote(&self, args: &QuoteArgs) -> Result<QuoteResult, CharitySwapError> {
        let url = self.build_quote_url(args)?;
        debug!(%url, "requesting quote");
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        interpret_response(status, &body)
    }
}
