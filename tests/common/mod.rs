#![allow(dead_code)]

use alloy_primitives::{Address, U256, address};
use async_trait::async_trait;
use charityswap::domain::error::CharitySwapError;
use charityswap::domain::pool::V2Pool;
use charityswap::domain::quote::{Quote, QuoteArgs, QuoteResult, RouteStep, TradeType};
use charityswap::ports::quote_port::QuotePort;
use serde_json::Map;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
pub const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");

enum Answer {
    Quote(QuoteResult),
    Transport(String),
    Local(String),
}

/// Quote source with a canned answer that records every request.
pub struct MockQuotePort {
    name: &'static str,
    answer: Answer,
    calls: AtomicUsize,
    seen: Mutex<Vec<QuoteArgs>>,
}

impl MockQuotePort {
    fn with_answer(name: &'static str, answer: Answer) -> Self {
        Self {
            name,
            answer,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn quote(name: &'static str, result: QuoteResult) -> Self {
        Self::with_answer(name, Answer::Quote(result))
    }

    pub fn no_route(name: &'static str) -> Self {
        Self::with_answer(name, Answer::Quote(QuoteResult::NoRoute))
    }

    /// Fails the way an unreachable routing API does.
    pub fn network_error(name: &'static str, reason: &str) -> Self {
        Self::with_answer(name, Answer::Transport(reason.to_string()))
    }

    /// Fails the way the local router does.
    pub fn local_error(name: &'static str, reason: &str) -> Self {
        Self::with_answer(name, Answer::Local(reason.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<QuoteArgs> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuotePort for MockQuotePort {
    fn name(&self) -> &str {
        self.name
    }

    async fn get_quote(&self, args: &QuoteArgs) -> Result<QuoteResult, CharitySwapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(args.clone());
        match &self.answer {
            Answer::Quote(result) => Ok(result.clone()),
            Answer::Transport(reason) => Err(CharitySwapError::RemoteTransport {
                reason: reason.clone(),
            }),
            Answer::Local(reason) => Err(CharitySwapError::LocalRoute {
                reason: reason.clone(),
            }),
        }
    }
}

/// Single-route quote with the given first-step input and last-step output.
pub fn route_quote(amount_in: &str, amount_out: &str) -> QuoteResult {
    QuoteResult::Quote(Quote {
        route: vec![vec![RouteStep {
            amount_in: Some(amount_in.to_string()),
            amount_out: Some(amount_out.to_string()),
            extra: Map::new(),
        }]],
        extra: Map::new(),
    })
}

pub fn quote_args(amount: u64, trade_type: TradeType) -> QuoteArgs {
    QuoteArgs {
        token_in_address: WETH,
        token_in_chain_id: 1,
        token_out_address: USDC,
        token_out_chain_id: 1,
        amount: U256::from(amount),
        trade_type,
    }
}

pub fn first_amount_in(result: &QuoteResult) -> Option<String> {
    result.as_quote()?.route.first()?.first()?.amount_in.clone()
}

pub fn last_amount_out(result: &QuoteResult) -> Option<String> {
    result.as_quote()?.route.first()?.last()?.amount_out.clone()
}

pub fn pool(address: Address, token0: Address, token1: Address, r0: u64, r1: u64) -> V2Pool {
    V2Pool {
        chain_id: 1,
        address,
        token0,
        token1,
        reserve0: U256::from(r0),
        reserve1: U256::from(r1),
    }
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Pools file with one WETH/USDC pair (1000 : 2_000_000).
pub fn pools_json() -> String {
    serde_json::to_string(&vec![pool(
        address!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc"),
        WETH,
        USDC,
        1000,
        2_000_000,
    )])
    .unwrap()
}
