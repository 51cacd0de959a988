//! Configuration validation.
//!
//! Each `parse_*` reads one setting and rejects bad values; the settings
//! builder reuses them so validation and construction cannot drift apart.

use crate::domain::error::CharitySwapError;
use crate::domain::fee::{DEFAULT_FEE_PPM, DonationFee, PPM};
use crate::ports::config_port::ConfigPort;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use url::Url;

pub const DEFAULT_PROTOCOLS: [&str; 2] = ["v2", "v3"];
pub const KNOWN_PROTOCOLS: [&str; 3] = ["v2", "v3", "mixed"];
pub const DEFAULT_MAX_HOPS: usize = 3;
pub const MAX_HOPS_LIMIT: usize = 4;
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), CharitySwapError> {
    parse_router_url(config)?;
    parse_protocols(config)?;
    parse_timeout(config)?;
    parse_cache_ttl(config)?;
    validate_pools_file(config)?;
    parse_max_hops(config)?;
    let fee = parse_donation_fee(config)?;
    let contract_fee = parse_contract_fee_ppm(config)?;
    if let Some(message) = fee_mismatch(&fee, contract_fee) {
        warn!("{message}");
    }
    parse_listen(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> CharitySwapError {
    CharitySwapError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_secs(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<u64>, CharitySwapError> {
    match non_empty(config, section, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("{key} must be a whole number of seconds"))),
    }
}

/// `[routing] router_url`, normalised to end with `/` so `quote` can be joined onto it.
pub fn parse_router_url(config: &dyn ConfigPort) -> Result<Option<Url>, CharitySwapError> {
    let Some(raw) = non_empty(config, "routing", "router_url") else {
        return Ok(None);
    };
    let url = Url::parse(&raw)
        .map_err(|e| invalid("routing", "router_url", format!("invalid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(Some(with_trailing_slash(url))),
        other => Err(invalid(
            "routing",
            "router_url",
            format!("unsupported scheme {other}, expected http or https"),
        )),
    }
}

/// `url` with its path ending in `/`, so relative joins append instead of replace.
pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

pub fn parse_protocols(config: &dyn ConfigPort) -> Result<Vec<String>, CharitySwapError> {
    let listed: Vec<String> = config
        .get_list("routing", "protocols")
        .into_iter()
        .map(|p| p.to_lowercase())
        .collect();
    if listed.is_empty() {
        return Ok(DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect());
    }
    if let Some(unknown) = listed.iter().find(|p| !KNOWN_PROTOCOLS.contains(&p.as_str())) {
        return Err(invalid(
            "routing",
            "protocols",
            format!("unknown protocol {unknown}, expected one of v2, v3, mixed"),
        ));
    }
    Ok(listed)
}

pub fn parse_timeout(config: &dyn ConfigPort) -> Result<Option<Duration>, CharitySwapError> {
    match parse_secs(config, "routing", "timeout_secs")? {
        Some(0) => Err(invalid("routing", "timeout_secs", "timeout_secs must be at least 1")),
        other => Ok(other.map(Duration::from_secs)),
    }
}

pub fn parse_cache_ttl(config: &dyn ConfigPort) -> Result<Duration, CharitySwapError> {
    Ok(parse_secs(config, "routing", "cache_ttl_secs")?
        .map(Duration::from_secs)
        .unwrap_or(crate::domain::routing::QUOTE_CACHE_TTL))
}

pub fn parse_pools_file(config: &dyn ConfigPort) -> Option<PathBuf> {
    non_empty(config, "local", "pools_file").map(PathBuf::from)
}

fn validate_pools_file(config: &dyn ConfigPort) -> Result<(), CharitySwapError> {
    match parse_pools_file(config) {
        Some(path) if !path.is_file() => Err(invalid(
            "local",
            "pools_file",
            format!("{} does not exist", path.display()),
        )),
        _ => Ok(()),
    }
}

pub fn parse_max_hops(config: &dyn ConfigPort) -> Result<usize, CharitySwapError> {
    let value = config.get_int("local", "max_hops", DEFAULT_MAX_HOPS as i64);
    if value < 1 || value > MAX_HOPS_LIMIT as i64 {
        return Err(invalid(
            "local",
            "max_hops",
            format!("max_hops must be between 1 and {MAX_HOPS_LIMIT}"),
        ));
    }
    Ok(value as usize)
}

/// `[charity] fee`: `n/d` or a percentage. Defaults to 5%.
pub fn parse_donation_fee(config: &dyn ConfigPort) -> Result<DonationFee, CharitySwapError> {
    match non_empty(config, "charity", "fee") {
        None => DonationFee::from_ppm(DEFAULT_FEE_PPM),
        Some(raw) => raw
            .parse::<DonationFee>()
            .map_err(|e| invalid("charity", "fee", e.to_string())),
    }
}

/// `[charity] contract_fee_ppm`: the fee the CharitySwap contract was deployed with.
pub fn parse_contract_fee_ppm(config: &dyn ConfigPort) -> Result<Option<u64>, CharitySwapError> {
    let Some(raw) = non_empty(config, "charity", "contract_fee_ppm") else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(ppm) if ppm < PPM => Ok(Some(ppm)),
        _ => Err(invalid(
            "charity",
            "contract_fee_ppm",
            format!("contract_fee_ppm must be an integer below {PPM}"),
        )),
    }
}

/// Describes a disagreement between the quoted fee and the on-chain fee, if any.
pub fn fee_mismatch(fee: &DonationFee, contract_fee_ppm: Option<u64>) -> Option<String> {
    let ppm = contract_fee_ppm?;
    if fee.matches_ppm(ppm) {
        None
    } else {
        Some(format!(
            "quoted donation fee {fee} differs from contract fee {ppm}/{PPM}; quotes will not match on-chain amounts"
        ))
    }
}

pub fn parse_listen(config: &dyn ConfigPort) -> Result<SocketAddr, CharitySwapError> {
    let raw = non_empty(config, "web", "listen").unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    raw.parse::<SocketAddr>()
        .map_err(|_| invalid("web", "listen", format!("invalid socket address {raw}")))
}
