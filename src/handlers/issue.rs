// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use crate::{
    events::{DomainEvent, EventType},
    format,
    handlers::EventHandler,
    notification::{MessageContent, NotificationIntent, Role},
};

/// Routes issue events. Only newly opened issues are announced.
pub struct IssueHandler;

impl EventHandler for IssueHandler {
    fn supports(&self, event_type: EventType) -> bool {
        event_type == EventType::Issue
    }

    fn handle(&self, event: &DomainEvent) -> Vec<NotificationIntent> {
        let DomainEvent::Issue(event) = event else {
            return Vec::new();
        };

        if event.issue.state.eq_ignore_ascii_case("closed") {
            return Vec::new();
        }

        if !event.issue.action.eq_ignore_ascii_case("open") {
            return Vec::new();
        }

        let text = format::new_issue(&event.project.name, &event.issue.title, &event.user.name);
        let keyboard = format::buttons_for_issue(event.issue.url.as_deref());
        let content = MessageContent { text, keyboard };

        vec![
            NotificationIntent::to_role(Role::Lead, content.clone()),
            NotificationIntent::to_role(Role::Pm, content),
        ]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::notification::RecipientSpec;

    fn issue_event(attributes: Value) -> Value {
        json!({
            "object_kind": "issue",
            "user": {"id": 9, "name": "Reporter"},
            "project": {"name": "Test Project", "web_url": "http://gitlab/test-project"},
            "object_attributes": attributes,
        })
    }

    fn handle(payload: Value) -> Vec<NotificationIntent> {
        let event = DomainEvent::parse(EventType::Issue, payload.to_string().as_bytes())
            .expect("payload should parse");
        IssueHandler.handle(&event)
    }

    #[test]
    fn supports_only_issue_events() {
        assert!(IssueHandler.supports(EventType::Issue));
        assert!(!IssueHandler.supports(EventType::MergeRequest));
    }

    #[test]
    fn closed_issue_produces_nothing() {
        let payload = issue_event(json!({
            "title": "Bug", "state": "closed", "action": "close",
        }));
        assert!(handle(payload).is_empty());
    }

    #[test]
    fn opened_issue_notifies_lead_and_pm() {
        let payload = issue_event(json!({
            "title": "Bug", "state": "opened", "action": "open",
            "url": "http://gitlab/test-project/-/issues/5",
        }));
        let intents = handle(payload);
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].recipient, RecipientSpec::Role(Role::Lead));
        assert_eq!(intents[1].recipient, RecipientSpec::Role(Role::Pm));
        assert_eq!(intents[0].content.text, intents[1].content.text);
        assert!(intents[0].content.text.contains("New Issue"));
        assert_eq!(
            intents[0].content.keyboard[0].buttons[0].url,
            "http://gitlab/test-project/-/issues/5"
        );
    }

    #[test]
    fn updated_issue_is_silent() {
        let payload = issue_event(json!({
            "title": "Bug", "state": "opened", "action": "update",
        }));
        assert!(handle(payload).is_empty());
    }
}
