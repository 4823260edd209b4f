//! The opaque domain-computation capability.
//!
//! The actual geospatial work (profiling math, CRS handling, text
//! normalization) is delegated to an external profiler tool; this module
//! only defines the seam and a CLI-backed implementation of it.

mod cli;
mod config;
mod error;
mod traits;
mod types;

pub use cli::CliProcessor;
pub use config::ProcessorConfig;
pub use error::ProcessorError;
pub use traits::Processor;
pub use types::{
    normalized_base_name, DatasetOutput, ProcessorInvocation, ProcessorOutput, ResourceKind,
};
