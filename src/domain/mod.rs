//! Core domain types and logic.

pub mod config_validation;
pub mod error;
pub mod fee;
pub mod funds;
pub mod pool;
pub mod quote;
pub mod routing;
pub mod settings;
