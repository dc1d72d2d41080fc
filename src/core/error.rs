//! Error types for the Tellus terrain engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("streaming error: {0}")]
    Streaming(String),

    #[error("generation error: {0}")]
    Generation(String),
}
