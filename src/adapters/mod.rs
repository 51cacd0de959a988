//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod local_router_adapter;
pub mod routing_api_adapter;
#[cfg(feature = "web")]
pub mod web;
