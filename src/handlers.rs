// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use crate::{
    events::{DomainEvent, EventType},
    notification::NotificationIntent,
};

pub mod issue;
pub mod merge_request;
pub mod note;
pub mod pipeline;
pub mod tag_push;

/// Turns one parsed webhook event into notification intents. Handlers are
/// pure: no I/O, no shared state, nothing but the event and the formatter.
pub trait EventHandler: Send + Sync {
    fn supports(&self, event_type: EventType) -> bool;
    fn handle(&self, event: &DomainEvent) -> Vec<NotificationIntent>;
}

/// Statically constructed handler list; exactly one entry supports each
/// event type.
pub fn registry() -> &'static [&'static dyn EventHandler] {
    static HANDLERS: [&dyn EventHandler; 5] = [
        &merge_request::MergeRequestHandler,
        &issue::IssueHandler,
        &note::NoteHandler,
        &pipeline::PipelineHandler,
        &tag_push::TagPushHandler,
    ];
    &HANDLERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_handler_per_event_type() {
        for event_type in EventType::ALL {
            let supporting = registry()
                .iter()
                .filter(|handler| handler.supports(event_type))
                .count();
            assert_eq!(supporting, 1, "{event_type:?}");
        }
    }
}
