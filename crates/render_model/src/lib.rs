//! Render Model - portable document to HTML
//!
//! This crate turns portable documents into structured render nodes and
//! HTML, including highlights, footnote markers and a generated footnote
//! section.

mod config;
mod converter;
mod error;
mod footnotes;
mod html;
mod render_node;

pub use config::*;
pub use converter::*;
pub use error::*;
pub use footnotes::*;
pub use html::*;
pub use render_node::*;
