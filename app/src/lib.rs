//! Invoice App - application facade
//!
//! Ties the invoice model, layout engine, renderers and store together for
//! a UI shell: editing commands on a session, live HTML preview, PDF export
//! with user notifications, and logging setup.

mod commands;
mod error;
mod facade;
mod logging;
mod notifier;
mod state;

pub use commands::*;
pub use error::*;
pub use facade::*;
pub use logging::*;
pub use notifier::*;
pub use state::*;
