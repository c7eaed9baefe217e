//! gateway-xds: Gateway API status and xDS snapshot layer
//!
//! This crate provides the pieces of a Gateway API control plane that sit
//! after translation: path validation, condition reporting, status building
//! and versioned Envoy snapshots.

pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod reports;
pub mod validation;
pub mod xds;

pub use crate::error::{Error, Result};
