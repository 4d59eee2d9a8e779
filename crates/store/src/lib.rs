//! Store - portable document format
//!
//! Converts document trees to tagged JSON records and back. Import is
//! forward compatible: records this model does not understand are skipped
//! and reported as [`ImportWarning`]s instead of failing the load.

mod convert;
mod error;
mod portable;
mod serializer;
mod warning;

pub use convert::*;
pub use error::*;
pub use portable::*;
pub use serializer::*;
pub use warning::*;
