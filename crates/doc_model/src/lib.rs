//! Document Model - annotated rich-text document tree
//!
//! This crate provides the document tree used by the editing engine: an
//! arena of copy-on-write nodes with stable ids, the highlight and footnote
//! annotation node types, and the footnote registry that keeps reference
//! numbers in document order.

mod error;
mod format;
mod highlight;
mod node;
mod node_id;
mod run;
mod selection;
mod tree;
pub mod dom;
pub mod footnote;

pub use error::*;
pub use footnote::*;
pub use format::*;
pub use highlight::*;
pub use node::*;
pub use node_id::*;
pub use run::*;
pub use selection::*;
pub use tree::*;
