mod base;
mod credentials;
mod labels;
mod namespace_labeler;
mod pass;
mod pod_cleanup;
mod sentry;

pub use base::*;
pub use credentials::*;
pub use labels::*;
pub use namespace_labeler::*;
pub use pass::*;
pub use pod_cleanup::*;
pub use sentry::*;
