//! Input/output helpers.
//!
//! - lubricant CSV ingest + validation (`ingest`)
//! - curve grid export to CSV (`export`)
//! - curve JSON read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
