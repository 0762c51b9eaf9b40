use thiserror::Error;

/// Why a page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchMiss {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchMiss {
    /// Rate limiting, server errors and network trouble are worth another attempt;
    /// anything else (404, 403, ...) will not change on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchMiss::Status(code) => *code == 429 || (500..=599).contains(code),
            FetchMiss::Timeout | FetchMiss::Transport(_) => true,
        }
    }
}

impl From<reqwest::Error> for FetchMiss {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchMiss::Timeout
        } else {
            FetchMiss::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("page has no `div.inner` content section")]
    MissingSection,
}
