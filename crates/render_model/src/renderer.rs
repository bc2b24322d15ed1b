//! Renderer interface
//!
//! A renderer consumes laid-out pages and produces some output: markup for
//! an interactive preview, or the bytes of a paged document file.

use layout_engine::Page;

pub trait DocumentRenderer {
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    fn render(&mut self, pages: &[Page]) -> std::result::Result<Self::Output, Self::Error>;
}
