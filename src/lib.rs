//! charityswap: token swap quotes with a built-in charity donation.
//!
//! Hexagonal architecture: fee arithmetic, quote transforms and routing policy
//! in [`domain`], port traits in [`ports`], concrete quote sources, config
//! files and the HTTP server in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
