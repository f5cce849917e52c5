//! Tracing setup shared by the sweep binaries.
//!
//! Development builds get pretty, colored logs. Production-like environments get
//! JSON lines written through a non-blocking writer, optionally tagged with the
//! cluster name. Both go to stderr: stdout is reserved for the per-resource
//! result lines the binaries print.

mod logging;

pub use logging::*;
