//! Error types for the swap router

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RouterError>;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Pool catalog error: {0}")]
    CatalogError(String),

    #[error("No route found for token pair")]
    NoRouteFound,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures of the external quoting service.
///
/// These never leave the quoter: every one of them is turned into a
/// fee-only estimate for the hop that produced it.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("quote timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed quote response: {0}")]
    MalformedResponse(String),

    #[error("quote request encoding failed: {0}")]
    Encoding(String),

    #[error("quote service unavailable: {0}")]
    Unavailable(String),
}
