//! Viscosity models.
//!
//! Both models are small, pure functions over plain `f64` inputs so the pipeline
//! and the public entry points can share them without any state:
//!
//! - `walther`: ASTM D341 viscosity–temperature curve
//! - `viscosity_index`: ASTM D2270 Viscosity Index

pub mod viscosity_index;
pub mod walther;

pub use viscosity_index::*;
pub use walther::*;
