//! Unified error type for the pulse-bot.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Feed error for {symbol}: {message}")]
    Feed { symbol: String, message: String },

    #[error("Feed returned no history for {0}")]
    EmptyHistory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
