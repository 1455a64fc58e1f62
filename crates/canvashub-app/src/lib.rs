//! Canvas Hub Application
//!
//! Wires input routing, board mutation, render reconciliation and
//! persistence together behind a single [`App`].

mod app;
mod confirm;
mod event_handler;

pub use app::{App, AppError, AppResult};
pub use confirm::Confirm;
pub use event_handler::{EventHandler, Response};
