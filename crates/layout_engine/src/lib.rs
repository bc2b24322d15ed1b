//! Layout Engine - Description wrapping and pagination
//!
//! This crate turns a snapshot of an invoice (line items plus metadata) into
//! a sequence of fixed-size pages of positioned content blocks, ready for
//! any renderer.

mod config;
mod error;
mod layout_tree;
mod paginator;
mod text_wrap;

pub use config::*;
pub use error::*;
pub use layout_tree::*;
pub use paginator::*;
pub use text_wrap::*;
