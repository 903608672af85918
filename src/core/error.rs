use thiserror::Error;

use crate::domain::{FetchError, ValidationError};

/// Gateway-wide error model; every variant becomes a single error block.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid arguments: {0}")]
    Validation(#[from] ValidationError),
    #[error("Error searching Xiaohongshu content: {0}")]
    Fetch(#[from] FetchError),
}
