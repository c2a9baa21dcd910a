// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use itertools::Itertools;

use crate::{
    events::{DomainEvent, EventType, objects::MergeRequestRef},
    format,
    handlers::EventHandler,
    notification::{MessageContent, NotificationIntent},
};

/// Routes comment events. Only comments on merge requests are announced,
/// addressed to the MR assignee and reviewers minus the comment author.
pub struct NoteHandler;

impl EventHandler for NoteHandler {
    fn supports(&self, event_type: EventType) -> bool {
        event_type == EventType::Note
    }

    fn handle(&self, event: &DomainEvent) -> Vec<NotificationIntent> {
        let DomainEvent::Note(event) = event else {
            return Vec::new();
        };

        if !event.note.noteable_type.eq_ignore_ascii_case("mergerequest") {
            return Vec::new();
        }

        let Some(merge_request) = &event.merge_request else {
            return Vec::new();
        };

        let keyboard = format::buttons_for_note(merge_request.url.as_deref());
        let text = format::new_comment_for_mr(
            &event.project.name,
            &merge_request.title,
            &event.user.name,
        );

        recipients(event.user.id, merge_request)
            .into_iter()
            .map(|recipient_id| {
                NotificationIntent::to_user(
                    recipient_id,
                    MessageContent {
                        text: text.clone(),
                        keyboard: keyboard.clone(),
                    },
                )
            })
            .collect()
    }
}

/// Assignee plus reviewers, minus the comment author, deduplicated.
/// GitLab omits the reviewer list on note payloads more often than not;
/// we do not backfill it from anywhere else.
fn recipients(author_id: i64, merge_request: &MergeRequestRef) -> Vec<i64> {
    let assignee = merge_request
        .assignee_id
        .into_iter()
        .filter(|id| *id != author_id);
    let reviewers = merge_request
        .reviewers
        .iter()
        .flatten()
        .map(|reviewer| reviewer.id)
        .filter(|id| *id != author_id);

    assignee.chain(reviewers).unique().collect()
}
