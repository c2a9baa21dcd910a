// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use crate::{
    events::{DomainEvent, EventType},
    format,
    handlers::EventHandler,
    notification::{MessageContent, NotificationIntent, Role},
};

/// Routes tag push events. Every new tag is announced; there is no
/// suppression condition.
pub struct TagPushHandler;

impl EventHandler for TagPushHandler {
    fn supports(&self, event_type: EventType) -> bool {
        event_type == EventType::TagPush
    }

    fn handle(&self, event: &DomainEvent) -> Vec<NotificationIntent> {
        let DomainEvent::TagPush(event) = event else {
            return Vec::new();
        };

        let text = format::new_tag(&event.project.name, event.tag_name());
        let keyboard = format::buttons_for_tag(Some(&event.tag_url()));
        let content = MessageContent { text, keyboard };

        vec![
            NotificationIntent::to_role(Role::Lead, content.clone()),
            NotificationIntent::to_role(Role::Pm, content),
        ]
    }
}
