//! Data layer of an electric-vehicle charging decision-support system.
//!
//! Converts travelled-distance distributions between their form and wire
//! representations, validates the per-zone inputs of a power analysis, and
//! maps analysis form state to the payload the simulation backend expects.

/// REST endpoints over the data layer.
#[cfg(feature = "api")]
pub mod api;
pub mod choropleth;
pub mod cli;
pub mod config;
pub mod distribution;
pub mod error;
pub mod geo;
pub mod io;
pub mod mappings;
pub mod numeric;
/// Analysis form, validation and backend payload mapping.
pub mod submission;
pub mod zones;

pub use error::{DssError, Result};
