//! Resolved runtime settings.

use crate::domain::config_validation::{
    DEFAULT_LISTEN, DEFAULT_MAX_HOPS, DEFAULT_PROTOCOLS, parse_cache_ttl, parse_contract_fee_ppm,
    parse_donation_fee, parse_listen, parse_max_hops, parse_pools_file, parse_protocols,
    parse_router_url, parse_timeout,
};
use crate::domain::error::CharitySwapError;
use crate::domain::fee::DonationFee;
use crate::domain::routing::QUOTE_CACHE_TTL;
use crate::ports::config_port::ConfigPort;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct Settings {
    pub router_url: Option<Url>,
    pub protocols: Vec<String>,
    pub timeout: Option<Duration>,
    pub cache_ttl: Duration,
    pub pools_file: Option<PathBuf>,
    pub max_hops: usize,
    pub fee: DonationFee,
    pub contract_fee_ppm: Option<u64>,
    pub log_level: Option<String>,
    pub json_logs: bool,
    pub listen: SocketAddr,
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, CharitySwapError> {
        Ok(Self {
            router_url: parse_router_url(config)?,
            protocols: parse_protocols(config)?,
            timeout: parse_timeout(config)?,
            cache_ttl: parse_cache_ttl(config)?,
            pools_file: parse_pools_file(config),
            max_hops: parse_max_hops(config)?,
            fee: parse_donation_fee(config)?,
            contract_fee_ppm: parse_contract_fee_ppm(config)?,
            log_level: config
                .get_string("logging", "level")
                .filter(|s| !s.trim().is_empty()),
            json_logs: config.get_bool("logging", "json", false),
            listen: parse_listen(config)?,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            router_url: None,
            protocols: DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect(),
            timeout: None,
            cache_ttl: QUOTE_CACHE_TTL,
            pools_file: None,
            max_hops: DEFAULT_MAX_HOPS,
            fee: DonationFee::default(),
            contract_fee_ppm: None,
            log_level: None,
            json_logs: false,
            listen: DEFAULT_LISTEN
                .parse()
                .unwrap_or(SocketAddr::from((Ipv4Addr::LOCALHOST, 3000))),
        }
    }
}
