//! Quote source port trait.

use crate::domain::error::CharitySwapError;
use crate::domain::quote::{QuoteArgs, QuoteResult};
use async_trait::async_trait;

/// A source of raw (fee-free) swap quotes.
///
/// Implementations return [`QuoteResult::NoRoute`] when the source answered
/// but found no path, and an error when it could not answer at all.
#[async_trait]
pub trait QuotePort: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn get_quote(&self, args: &QuoteArgs) -> Result<QuoteResult, CharitySwapError>;
}
