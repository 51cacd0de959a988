//! In-process quote source over a snapshot of V2 pools.
//!
//! Pools are read from a JSON file on the first quote and kept for the
//! process lifetime. Routing is exhaustive over simple paths up to
//! `max_hops` pools, which is fine for the few hundred pairs a snapshot
//! usually holds.

use crate::domain::error::CharitySwapError;
use crate::domain::pool::V2Pool;
use crate::domain::quote::{Quote, QuoteArgs, QuoteResult, RouteStep, TradeType};
use crate::ports::quote_port::QuotePort;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// One swap through one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hop {
    pool: usize,
    token_in: Address,
    token_out: Address,
}

/// A priced path: the amount paid in and received out.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PricedPath {
    hops: Vec<Hop>,
    amount_in: U256,
    amount_out: U256,
}

pub struct LocalRouterAdapter {
    pools_file: Option<PathBuf>,
    pools: OnceCell<Arc<Vec<V2Pool>>>,
    max_hops: usize,
}

impl LocalRouterAdapter {
    /// Router that loads `pools_file` lazily.
    pub fn new(pools_file: Option<PathBuf>, max_hops: usize) -> Self {
        Self {
            pools_file,
            pools: OnceCell::new(),
            max_hops: max_hops.max(1),
        }
    }

    /// Router over an already loaded pool set.
    pub fn with_pools(pools: Vec<V2Pool>, max_hops: usize) -> Self {
        Self {
            pools_file: None,
            pools: OnceCell::new_with(Some(Arc::new(pools))),
            max_hops: max_hops.max(1),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.pools.initialized()
    }

    async fn pools(&self) -> Result<Arc<Vec<V2Pool>>, CharitySwapError> {
        self.pools
            .get_or_try_init(|| async {
                let path = self
                    .pools_file
                    .as_deref()
                    .ok_or_else(|| CharitySwapError::LocalRoute {
                        reason: "no pools file configured".into(),
                    })?;
                load_pools(path).await.map(Arc::new)
            })
            .await
            .cloned()
    }
}

/// Read and parse a pools file.
pub async fn load_pools(path: &Path) -> Result<Vec<V2Pool>, CharitySwapError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CharitySwapError::LocalRoute {
            reason: format!("cannot read pools file {}: {e}", path.display()),
        })?;
    let pools: Vec<V2Pool> =
        serde_json::from_str(&raw).map_err(|e| CharitySwapError::LocalRoute {
            reason: format!("invalid pools file {}: {e}", path.display()),
        })?;
    info!(path = %path.display(), pools = pools.len(), "loaded pool snapshot");
    Ok(pools)
}

#[async_trait]
impl QuotePort for LocalRouterAdapter {
    fn name(&self) -> &str {
        "local-router"
    }

    async fn get_quote(&self, args: &QuoteArgs) -> Result<QuoteResult, CharitySwapError> {
        let pools = self.pools().await?;
        Ok(route(&pools, args, self.max_hops))
    }
}

/// Best route for `args` over `pools`, or the no-route sentinel.
fn route(pools: &[V2Pool], args: &QuoteArgs, max_hops: usize) -> QuoteResult {
    if args.token_in_chain_id != args.token_out_chain_id
        || args.token_in_address == args.token_out_address
        || args.amount.is_zero()
    {
        return QuoteResult::NoRoute;
    }

    let paths = find_paths(
        pools,
        args.token_in_chain_id,
        args.token_in_address,
        args.token_out_address,
        max_hops,
    );
    debug!(candidates = paths.len(), "local path search");

    let best = paths
        .into_iter()
        .filter_map(|hops| price_path(pools, hops, args.amount, args.trade_type))
        .reduce(|best, next| {
            let better = match args.trade_type {
                TradeType::ExactInput => next.amount_out > best.amount_out,
                TradeType::ExactOutput => next.amount_in < best.amount_in,
            };
            if better { next } else { best }
        });

    match best {
        Some(path) => QuoteResult::Quote(build_quote(pools, args, &path)),
        None => QuoteResult::NoRoute,
    }
}

/// Every simple path from `from` to `to` using at most `max_hops` pools on `chain_id`.
fn find_paths(
    pools: &[V2Pool],
    chain_id: u64,
    from: Address,
    to: Address,
    max_hops: usize,
) -> Vec<Vec<Hop>> {
    let mut found = Vec::new();
    let mut visited = vec![from];
    let mut current = Vec::new();
    walk(pools, chain_id, from, to, max_hops, &mut visited, &mut current, &mut found);
    found
}

#[allow(clippy::too_many_arguments)]
fn walk(
    pools: &[V2Pool],
    chain_id: u64,
    at: Address,
    to: Address,
    max_hops: usize,
    visited: &mut Vec<Address>,
    current: &mut Vec<Hop>,
    found: &mut Vec<Vec<Hop>>,
) {
    if current.len() == max_hops {
        return;
    }
    for (index, pool) in pools.iter().enumerate() {
        if pool.chain_id != chain_id || current.iter().any(|h| h.pool == index) {
            continue;
        }
        let Some(next) = pool.other(at) else {
            continue;
        };
        if visited.contains(&next) {
            continue;
        }
        current.push(Hop {
            pool: index,
            token_in: at,
            token_out: next,
        });
        if next == to {
            found.push(current.clone());
        } else {
            visited.push(next);
            walk(pools, chain_id, next, to, max_hops, visited, current, found);
            visited.pop();
        }
        current.pop();
    }
}

fn price_path(
    pools: &[V2Pool],
    hops: Vec<Hop>,
    amount: U256,
    trade_type: TradeType,
) -> Option<PricedPath> {
    match trade_type {
        TradeType::ExactInput => {
            let mut running = amount;
            for hop in &hops {
                running = pools[hop.pool].amount_out(hop.token_in, running)?;
            }
            Some(PricedPath {
                hops,
                amount_in: amount,
                amount_out: running,
            })
        }
        TradeType::ExactOutput => {
            let mut running = amount;
            for hop in hops.iter().rev() {
                running = pools[hop.pool].amount_in(hop.token_in, running)?;
            }
            Some(PricedPath {
                hops,
                amount_in: running,
                amount_out: amount,
            })
        }
    }
}

fn token_json(address: Address, chain_id: u64) -> Value {
    json!({ "address": address.to_string(), "chainId": chain_id })
}

fn build_quote(pools: &[V2Pool], args: &QuoteArgs, path: &PricedPath) -> Quote {
    let chain_id = args.token_in_chain_id;
    let last = path.hops.len().saturating_sub(1);
    let steps = path
        .hops
        .iter()
        .enumerate()
        .map(|(i, hop)| {
            let pool = &pools[hop.pool];
            let mut extra = Map::new();
            extra.insert("type".into(), json!("v2-pool"));
            extra.insert("address".into(), json!(pool.address.to_string()));
            extra.insert("tokenIn".into(), token_json(hop.token_in, chain_id));
            extra.insert("tokenOut".into(), token_json(hop.token_out, chain_id));
            RouteStep {
                amount_in: (i == 0).then(|| path.amount_in.to_string()),
                amount_out: (i == last).then(|| path.amount_out.to_string()),
                extra,
            }
        })
        .collect();

    let quoted = match args.trade_type {
        TradeType::ExactInput => path.amount_out,
        TradeType::ExactOutput => path.amount_in,
    };
    let mut extra = Map::new();
    extra.insert("amount".into(), json!(args.amount.to_string()));
    extra.insert("quote".into(), json!(quoted.to_string()));
    extra.insert("routeString".into(), json!(route_string(pools, path)));

    Quote {
        route: vec![steps],
        extra,
    }
}

fn route_string(pools: &[V2Pool], path: &PricedPath) -> String {
    let mut out = String::from("[V2] 100.00% = ");
    if let Some(first) = path.hops.first() {
        out.push_str(&first.token_in.to_string());
    }
    for hop in &path.hops {
        out.push_str(&format!(
            " -- [{}] --> {}",
            pools[hop.pool].address, hop.token_out
        ));
    }
    out
}
