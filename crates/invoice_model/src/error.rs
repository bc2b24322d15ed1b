//! Error types for invoice model operations

use crate::ItemId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("You must have at least one item.")]
    LastItem,

    #[error("Line item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Invalid logo image: {0}")]
    InvalidLogo(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
