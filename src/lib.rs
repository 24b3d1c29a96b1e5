//! `visc-curves` library crate.
//!
//! Kinematic viscosity of lubricants versus temperature (Walther equation,
//! ASTM D341) and the Viscosity Index (ASTM D2270).
//!
//! The binary (`visc`) is a thin wrapper around this library so that:
//!
//! - the numeric core is testable without spawning processes
//! - front ends (dashboards, notebooks, services) can call the same functions
//! - code stays easy to navigate as the project grows
//!
//! Front ends that only need numbers should use the entry points re-exported here;
//! they return NaN instead of errors for rejected inputs.

pub mod api;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod models;
pub mod report;

pub use api::{evaluate_at, fit_and_evaluate, viscosity_index, walther_constants};
