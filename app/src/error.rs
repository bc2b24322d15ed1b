//! Error types for the application facade

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Model(#[from] invoice_model::ModelError),

    #[error("Layout error: {0}")]
    Layout(#[from] layout_engine::LayoutError),

    #[error("Render error: {0}")]
    Render(#[from] render_model::RenderError),

    #[error("PDF export error: {0}")]
    Pdf(#[from] store::PdfError),

    #[error("Storage error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Application state unavailable: {0}")]
    StatePoisoned(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
