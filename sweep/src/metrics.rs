use std::sync::Once;

use metrics::{Unit, describe_counter};

static REGISTER_METRICS: Once = Once::new();

pub const SWEEP_RESOURCES_MATCHED_TOTAL: &str = "sweep_resources_matched_total";
pub const SWEEP_RESOURCES_MUTATED_TOTAL: &str = "sweep_resources_mutated_total";
pub const SWEEP_RESOURCES_NOT_FOUND_TOTAL: &str = "sweep_resources_not_found_total";
pub const SWEEP_RESOURCES_FAILED_TOTAL: &str = "sweep_resources_failed_total";
pub const SWEEP: &str = "sweep";

/// Describes the metrics emitted by a pass. Safe to call more than once.
pub(crate) fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            SWEEP_RESOURCES_MATCHED_TOTAL,
            Unit::Count,
            "Total number of listed resources that matched the sweep criterion"
        );

        describe_counter!(
            SWEEP_RESOURCES_MUTATED_TOTAL,
            Unit::Count,
            "Total number of resources successfully mutated"
        );

        describe_counter!(
            SWEEP_RESOURCES_NOT_FOUND_TOTAL,
            Unit::Count,
            "Total number of matched resources that were already gone when mutated"
        );

        describe_counter!(
            SWEEP_RESOURCES_FAILED_TOTAL,
            Unit::Count,
            "Total number of mutations that failed"
        );
    });
}
