//! Fee-adjusted quote retrieval.
//!
//! Quotes come from up to two [`QuotePort`] sources tried in fixed order: the
//! remote routing API (when configured), then the local router. The first
//! answer wins, gets the donation fee applied once, and is cached briefly.
//!
//! A remote `NO_ROUTE` is an answer, not a failure, so it never triggers the
//! local fallback. Every other remote failure is logged and swallowed; only a
//! local failure reaches the caller.

use crate::domain::error::CharitySwapError;
use crate::domain::fee::DonationFee;
use crate::domain::quote::{QuoteArgs, QuoteResult, add_fee_to_quote};
use crate::ports::quote_port::QuotePort;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How long a quote stays fresh.
pub const QUOTE_CACHE_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct CachedQuote {
    result: QuoteResult,
    stored_at: Instant,
}

/// One caller's hold on the per-key fetch gate.
///
/// Dropping it, on completion or cancellation, removes the map entry once no
/// other caller holds the same gate.
struct InflightGate<'a> {
    map: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    gate: Arc<Mutex<()>>,
}

impl<'a> InflightGate<'a> {
    fn join(map: &'a DashMap<String, Arc<Mutex<()>>>, key: &str) -> Self {
        let gate = map.entry(key.to_string()).or_default().clone();
        Self {
            map,
            key: key.to_string(),
            gate,
        }
    }
}

impl Drop for InflightGate<'_> {
    fn drop(&mut self) {
        // The map holds one reference and this gate another.
        self.map.remove_if(&self.key, |_, shared| {
            Arc::ptr_eq(shared, &self.gate) && Arc::strong_count(shared) <= 2
        });
    }
}

pub struct QuoteService {
    remote: Option<Arc<dyn QuotePort>>,
    local: Arc<dyn QuotePort>,
    fee: DonationFee,
    ttl: Duration,
    cache: DashMap<String, CachedQuote>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

impl QuoteService {
    pub fn new(
        remote: Option<Arc<dyn QuotePort>>,
        local: Arc<dyn QuotePort>,
        fee: DonationFee,
    ) -> Self {
        Self {
            remote,
            local,
            fee,
            ttl: QUOTE_CACHE_TTL,
            cache: DashMap::new(),
            inflight: DashMap::new(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn fee(&self) -> &DonationFee {
        &self.fee
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Fee-adjusted quote for `args`, served from cache when fresh.
    ///
    /// Identical concurrent requests share one fetch.
    pub async fn get_quote(&self, args: &QuoteArgs) -> Result<QuoteResult, CharitySwapError> {
        let key = args.cache_key(self.has_remote());
        if let Some(hit) = self.cached(&key) {
            debug!(%key, "quote cache hit");
            return Ok(hit);
        }

        let gate = InflightGate::join(&self.inflight, &key);
        let _lock = gate.gate.lock().await;

        if let Some(hit) = self.cached(&key) {
            debug!(%key, "quote served by coalesced request");
            return Ok(hit);
        }

        let result = self.fetch(args).await;
        if let Ok(ref quote) = result {
            self.store(key, quote.clone());
        }
        result
    }

    #[cfg(test)]
    fn inflight_len(&self) -> usize {
        self.inflight.len()
    }

    /// Drop every cached quote.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn fetch(&self, args: &QuoteArgs) -> Result<QuoteResult, CharitySwapError> {
        if let Some(remote) = &self.remote {
            let attempt = remote
                .get_quote(args)
                .await
                .and_then(|raw| add_fee_to_quote(args.trade_type, &self.fee, &raw));
            match attempt {
                Ok(quote) => {
                    debug!(source = remote.name(), no_route = quote.is_no_route(), "quote fetched");
                    return Ok(quote);
                }
                Err(e) => {
                    warn!(
                        source = remote.name(),
                        error = %e,
                        "quote failed on routing API, falling back to local router"
                    );
                }
            }
        }

        let attempt = self
            .local
            .get_quote(args)
            .await
            .and_then(|raw| add_fee_to_quote(args.trade_type, &self.fee, &raw));
        match attempt {
            Ok(quote) => {
                debug!(source = self.local.name(), no_route = quote.is_no_route(), "quote fetched");
                Ok(quote)
            }
            Err(e) => {
                warn!(source = self.local.name(), error = %e, "quote failed on local router");
                Err(CharitySwapError::QuoteFailed {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn cached(&self, key: &str) -> Option<QuoteResult> {
        let entry = self.cache.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.result.clone())
        } else {
            None
        }
    }

    fn store(&self, key: String, result: QuoteResult) {
        let ttl = self.ttl;
        self.cache.retain(|_, v| v.stored_at.elapsed() < ttl);
        self.cache.insert(
            key,
            CachedQuote {
                result,
                stored_at: Instant::now(),
            },
        );
    }
}
