use std::sync::Mutex;

use crate::action::MutationAction;
use crate::error::{ErrorKind, SweepError};
use crate::pass::PassObserver;
use crate::resource::ResourceRef;

/// One callback received by a [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    Mutated(ResourceRef),
    NotFound(ResourceRef),
    Failed(ResourceRef, ErrorKind),
}

/// Observer remembering every callback in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Names of the mutated resources, in order.
    pub fn mutated_names(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ObservedEvent::Mutated(resource) => Some(resource.name().to_owned()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ObservedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl PassObserver for RecordingObserver {
    fn on_mutated(&self, resource: &ResourceRef, _action: &MutationAction) {
        self.push(ObservedEvent::Mutated(resource.clone()));
    }

    fn on_not_found(&self, resource: &ResourceRef) {
        self.push(ObservedEvent::NotFound(resource.clone()));
    }

    fn on_failed(&self, resource: &ResourceRef, err: &SweepError) {
        self.push(ObservedEvent::Failed(resource.clone(), err.kind()));
    }
}
