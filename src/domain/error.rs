//! Domain error types.

/// Top-level error type for charityswap.
#[derive(Debug, thiserror::Error)]
pub enum CharitySwapError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid donation fee {numerator}/{denominator}: fee must be in [0, 1)")]
    InvalidFee { numerator: u64, denominator: u64 },

    #[error("invalid amount {value:?}: {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("amount overflow: {context}")]
    AmountOverflow { context: String },

    #[error("unknown fund: {0}")]
    UnknownFund(String),

    #[error("routing API request failed: {reason}")]
    RemoteTransport { reason: String },

    #[error("routing API responded with {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("malformed quote: {reason}")]
    MalformedQuote { reason: String },

    #[error("local routing failed: {reason}")]
    LocalRoute { reason: String },

    #[error("failed to fetch quote: {reason}")]
    QuoteFailed { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for CharitySwapError {
    fn from(err: reqwest::Error) -> Self {
        CharitySwapError::RemoteTransport {
            reason: err.to_string(),
        }
    }
}

impl CharitySwapError {
    /// Process exit status for this error class.
    pub fn exit_status(&self) -> u8 {
        match self {
            CharitySwapError::Io(_) => 1,
            CharitySwapError::ConfigParse { .. }
            | CharitySwapError::ConfigMissing { .. }
            | CharitySwapError::ConfigInvalid { .. } => 2,
            CharitySwapError::RemoteTransport { .. }
            | CharitySwapError::RemoteStatus { .. }
            | CharitySwapError::MalformedQuote { .. }
            | CharitySwapError::LocalRoute { .. }
            | CharitySwapError::QuoteFailed { .. } => 3,
            CharitySwapError::InvalidFee { .. }
            | CharitySwapError::InvalidAmount { .. }
            | CharitySwapError::AmountOverflow { .. }
            | CharitySwapError::UnknownFund(_) => 4,
        }
    }
}

impl From<&CharitySwapError> for std::process::ExitCode {
    fn from(err: &CharitySwapError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
