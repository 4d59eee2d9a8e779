//! Edit Engine - transactions, annotation commands and footnote lifecycle
//!
//! Every document change runs inside [`EditingEngine::update`], which works
//! on a copy-on-write snapshot and commits it atomically. Commands report a
//! [`CommandOutcome`] and queue [`EditorSignal`]s that are delivered to
//! subscribers once the change has committed.

mod caret;
mod command;
mod config;
mod controller;
mod error;
mod executor;
mod footnote_commands;
mod highlight_commands;
mod signals;

pub use command::*;
pub use config::*;
pub use controller::*;
pub use error::*;
pub use executor::*;
pub use footnote_commands::*;
pub use highlight_commands::*;
pub use signals::*;
