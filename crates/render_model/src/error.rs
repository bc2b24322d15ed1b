//! Error types for render model

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Layout error: {0}")]
    Layout(#[from] layout_engine::LayoutError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
