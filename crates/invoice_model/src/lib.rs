//! Invoice Model - Line items, document metadata and the editing session
//!
//! This crate holds the data an invoice is built from. It has no notion of
//! pages or rendering; the layout engine consumes snapshots of it.

mod error;
mod format;
mod item_id;
mod line_item;
mod logo;
mod metadata;
mod naming;
mod numbering;
mod png;
mod session;
mod totals;

pub use error::*;
pub use format::*;
pub use item_id::*;
pub use line_item::*;
pub use logo::*;
pub use metadata::*;
pub use naming::*;
pub use numbering::*;
pub use png::*;
pub use session::*;
pub use totals::*;
