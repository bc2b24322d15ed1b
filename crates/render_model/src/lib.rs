//! Render Model - Layout to render conversion
//!
//! This crate converts laid-out invoice pages into render items in page
//! points, and provides the renderer interface together with the HTML
//! preview renderer.

mod converter;
mod encoding;
mod error;
mod metrics;
mod preview;
mod render_item;
mod renderer;

pub use converter::*;
pub use encoding::*;
pub use error::*;
pub use metrics::*;
pub use preview::*;
pub use render_item::*;
pub use renderer::*;
