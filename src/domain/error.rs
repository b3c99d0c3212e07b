//! Domain error types.
//!
//! Everything the core can fail on is scoped to a single ticker. A
//! [`SeriesError`] never aborts a batch; callers record it against the
//! ticker and move on.

/// Why a ticker's price history could not be analysed this cycle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("series is empty")]
    Empty,

    #[error("malformed series: {reason}")]
    Malformed { reason: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },
}

/// Top-level error type for revtrader.
#[derive(Debug, thiserror::Error)]
pub enum RevtraderError {
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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("{ticker}: {source}")]
    Series {
        ticker: String,
        #[source]
        source: SeriesError,
    },

    #[error("order error on {ticker}: {reason}")]
    Broker { ticker: String, reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RevtraderError {
    pub fn series(ticker: &str, source: SeriesError) -> Self {
        RevtraderError::Series {
            ticker: ticker.to_string(),
            source,
        }
    }

    /// Insufficient history is "no decision this cycle", not a failure.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            RevtraderError::Series {
                source: SeriesError::InsufficientData { .. },
                ..
            }
        )
    }
}

impl From<&RevtraderError> for std::process::ExitCode {
    fn from(err: &RevtraderError) -> Self {
        let code: u8 = match err {
            RevtraderError::Io(_) | RevtraderError::Report { .. } => 1,
            RevtraderError::ConfigParse { .. }
            | RevtraderError::ConfigMissing { .. }
            | RevtraderError::ConfigInvalid { .. } => 2,
            RevtraderError::Data { .. } => 3,
            RevtraderError::Broker { .. } => 4,
            RevtraderError::NoData { .. } | RevtraderError::Series { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
