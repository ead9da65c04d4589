//! File output for zone validation results.

pub mod export;
