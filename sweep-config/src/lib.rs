//! Configuration management for the sweep utilities.
//!
//! Provides environment detection, configuration loading from optional YAML files
//! and `APP_` prefixed environment variables, and the shared configuration types
//! used by the pod cleanup and namespace labeling binaries.

mod environment;
mod load;
pub mod shared;

pub use environment::*;
pub use load::*;
