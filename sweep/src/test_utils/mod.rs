//! In-memory stand-ins for a cluster and a progress observer.
//!
//! [`cluster::MemoryCluster`] keeps pods and namespaces in listing order and lets
//! tests inject faults: failing listings, failing or slow mutations, and resources
//! that disappear between the listing and their mutation.

pub mod cluster;
pub mod observer;
