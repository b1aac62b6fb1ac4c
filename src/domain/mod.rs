//! Domain model for tracefox
//!
//! Core types shared across the conversion pipeline plus the structured
//! error taxonomy. Everything here is plain data: construction happens in
//! the `trace` layer, consumption in `gecko`.

pub mod errors;
pub mod types;

pub use errors::ConvertError;
pub use types::{Library, Sample, SampleCategory, ThreadInfo, TimeProfilerSettings};
