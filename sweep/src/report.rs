use std::io::Write;

use tracing::debug;

use crate::action::{MutationAction, format_labels};
use crate::pass::PassObserver;
use crate::resource::ResourceRef;

/// Prints one line per mutated resource to stdout.
///
/// Stdout carries nothing else, logs go to stderr, so the output can be piped.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutObserver;

impl PassObserver for StdoutObserver {
    fn on_mutated(&self, resource: &ResourceRef, action: &MutationAction) {
        // A closed pipe must not abort the pass.
        if let Err(err) = write_mutation_line(&mut std::io::stdout().lock(), resource, action) {
            debug!(resource = %resource, error = %err, "failed to write result line to stdout");
        }
    }
}

/// Writes the line reported for a mutated resource, followed by a newline.
pub fn write_mutation_line<W: Write>(
    out: &mut W,
    resource: &ResourceRef,
    action: &MutationAction,
) -> std::io::Result<()> {
    writeln!(out, "{}", mutation_line(resource, action))
}

/// Formats the line reported for a mutated resource, e.g. `Deleted pod default/web-0`.
pub fn mutation_line(resource: &ResourceRef, action: &MutationAction) -> String {
    let kind = resource.kind();

    match action {
        MutationAction::Delete { .. } => format!("Deleted {kind} {resource}"),
        MutationAction::MergeLabels { labels } => {
            format!("Labeled {kind} {resource} with {}", format_labels(labels))
        }
    }
}
