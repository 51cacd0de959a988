//! Quote data model and the donation fee transform.
//!
//! A quote is what the routing API returns for a prospective swap: one or more
//! candidate routes, each an ordered list of hops. Only the boundary amounts
//! matter here, every other field is carried through verbatim.

use crate::domain::error::CharitySwapError;
use crate::domain::fee::DonationFee;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Wire value of the no-route sentinel, also the routing API's `errorCode`.
pub const NO_ROUTE: &str = "NO_ROUTE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

impl TradeType {
    pub fn is_exact_input(&self) -> bool {
        matches!(self, TradeType::ExactInput)
    }

    /// Routing API `type` query value.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            TradeType::ExactInput => "exactIn",
            TradeType::ExactOutput => "exactOut",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

impl FromStr for TradeType {
    type Err = CharitySwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exactIn" | "EXACT_INPUT" => Ok(TradeType::ExactInput),
            "exactOut" | "EXACT_OUTPUT" => Ok(TradeType::ExactOutput),
            other => Err(CharitySwapError::InvalidAmount {
                value: other.to_string(),
                reason: "trade type must be exactIn or exactOut".into(),
            }),
        }
    }
}

/// Parameters of a quote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteArgs {
    pub token_in_address: Address,
    pub token_in_chain_id: u64,
    pub token_out_address: Address,
    pub token_out_chain_id: u64,
    /// Fixed side of the trade: input for exact-in, output for exact-out.
    pub amount: U256,
    pub trade_type: TradeType,
}

impl QuoteArgs {
    /// Fingerprint for caching and request coalescing.
    ///
    /// `remote` records whether a routing API is configured, so quotes from the
    /// remote and local paths never share an entry.
    pub fn cache_key(&self, remote: bool) -> String {
        format!(
            "{}:{}>{}:{}|{}|{}|{}",
            self.token_in_chain_id,
            self.token_in_address,
            self.token_out_chain_id,
            self.token_out_address,
            self.amount,
            self.trade_type,
            if remote { "api" } else { "client" },
        )
    }
}

/// One hop of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_out: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub route: Vec<Vec<RouteStep>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of a quote lookup: a quote, or the terminal "no route" state.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteResult {
    NoRoute,
    Quote(Quote),
}

impl QuoteResult {
    pub fn is_no_route(&self) -> bool {
        matches!(self, QuoteResult::NoRoute)
    }

    pub fn as_quote(&self) -> Option<&Quote> {
        match self {
            QuoteResult::Quote(q) => Some(q),
            QuoteResult::NoRoute => None,
        }
    }
}

impl Serialize for QuoteResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QuoteResult::NoRoute => serializer.serialize_str(NO_ROUTE),
            QuoteResult::Quote(q) => q.serialize(serializer),
        }
    }
}

/// Parse a wire amount: a non-negative decimal integer that fits in 256 bits.
pub fn parse_amount(value: &str) -> Result<U256, CharitySwapError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CharitySwapError::InvalidAmount {
            value: value.to_string(),
            reason: "expected a non-negative decimal integer".into(),
        });
    }
    U256::from_str_radix(value, 10).map_err(|e| CharitySwapError::InvalidAmount {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Apply the donation fee to a raw quote.
///
/// Exact input: each route's last `amountOut` becomes `floor(A * (1 - F))`.
/// Exact output: each route's first `amountIn` becomes `floor(A / (1 - F))`.
/// The no-route sentinel is returned as is.
///
/// Not idempotent. Apply exactly once per raw quote.
pub fn add_fee_to_quote(
    trade_type: TradeType,
    fee: &DonationFee,
    result: &QuoteResult,
) -> Result<QuoteResult, CharitySwapError> {
    let quote = match result {
        QuoteResult::NoRoute => return Ok(QuoteResult::NoRoute),
        QuoteResult::Quote(q) => q,
    };

    let route = quote
        .route
        .iter()
        .map(|hops| adjust_route(trade_type, fee, hops))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuoteResult::Quote(Quote {
        route,
        extra: quote.extra.clone(),
    }))
}

fn adjust_route(
    trade_type: TradeType,
    fee: &DonationFee,
    hops: &[RouteStep],
) -> Result<Vec<RouteStep>, CharitySwapError> {
    let mut adjusted = hops.to_vec();
    match trade_type {
        TradeType::ExactInput => {
            if let Some(step) = adjusted.last_mut() {
                if let Some(out) = step.amount_out.as_deref().filter(|s| !s.is_empty()) {
                    let amount = parse_amount(out).map_err(malformed)?;
                    step.amount_out = Some(fee.deduct(amount).to_string());
                }
            }
        }
        TradeType::ExactOutput => {
            if let Some(step) = adjusted.first_mut() {
                if let Some(inp) = step.amount_in.as_deref().filter(|s| !s.is_empty()) {
                    let amount = parse_amount(inp).map_err(malformed)?;
                    let gross = fee.gross_up(amount).ok_or_else(|| {
                        CharitySwapError::AmountOverflow {
                            context: format!("grossing up amountIn {inp} by fee {fee}"),
                        }
                    })?;
                    step.amount_in = Some(gross.to_string());
                }
            }
        }
    }
    Ok(adjusted)
}

fn malformed(err: CharitySwapError) -> CharitySwapError {
    CharitySwapError::MalformedQuote {
        reason: err.to_string(),
    }
}
