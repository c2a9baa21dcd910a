// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use crate::{
    events::{DomainEvent, EventType, MergeRequestEvent, objects::User},
    format,
    handlers::EventHandler,
    notification::{KeyboardRow, MessageContent, NotificationIntent, Role},
};

/// Routes merge request events: creation, draft removal, reviewer
/// assignment, approval and merge.
pub struct MergeRequestHandler;

impl EventHandler for MergeRequestHandler {
    fn supports(&self, event_type: EventType) -> bool {
        event_type == EventType::MergeRequest
    }

    fn handle(&self, event: &DomainEvent) -> Vec<NotificationIntent> {
        let DomainEvent::MergeRequest(event) = event else {
            return Vec::new();
        };

        // closed MRs generate no notifications at all
        if event.merge_request.state.eq_ignore_ascii_case("closed") {
            return Vec::new();
        }

        let keyboard = format::buttons_for_mr(event.merge_request.url.as_deref());

        let mut intents = Vec::new();
        intents.extend(opened(event, &keyboard));
        intents.extend(undrafted(event, &keyboard));
        intents.extend(reviewer_assignment(event, &keyboard));
        intents.extend(approved(event, &keyboard));
        intents.extend(merged(event, &keyboard));
        intents
    }
}

fn opened(event: &MergeRequestEvent, keyboard: &[KeyboardRow]) -> Vec<NotificationIntent> {
    if !event.merge_request.action.eq_ignore_ascii_case("open") {
        return Vec::new();
    }
    let text = format::new_mr(
        &event.project.name,
        &event.merge_request.title,
        &event.user.name,
    );
    vec![NotificationIntent::to_role(
        Role::Lead,
        MessageContent {
            text,
            keyboard: keyboard.to_vec(),
        },
    )]
}

fn undrafted(event: &MergeRequestEvent, keyboard: &[KeyboardRow]) -> Vec<NotificationIntent> {
    let draft = event.changes.as_ref().and_then(|changes| changes.draft.as_ref());
    let Some(draft) = draft else {
        return Vec::new();
    };
    if draft.current != Some(false) {
        return Vec::new();
    }
    let text = format::mr_undraft(&event.project.name, &event.merge_request.title);
    vec![NotificationIntent::to_role(
        Role::Lead,
        MessageContent {
            text,
            keyboard: keyboard.to_vec(),
        },
    )]
}

fn reviewer_assignment(
    event: &MergeRequestEvent,
    keyboard: &[KeyboardRow],
) -> Vec<NotificationIntent> {
    new_reviewers(event)
        .iter()
        .filter(|reviewer| reviewer.id != event.user.id)
        .map(|reviewer| {
            let text =
                format::you_are_mr_reviewer(&event.project.name, &event.merge_request.title);
            NotificationIntent::to_user(
                reviewer.id,
                MessageContent {
                    text,
                    keyboard: keyboard.to_vec(),
                },
            )
        })
        .collect()
}

/// A freshly opened MR carries its reviewers at the top level; later
/// assignments arrive through the `changes` delta.
fn new_reviewers(event: &MergeRequestEvent) -> &[User] {
    if event.merge_request.action.eq_ignore_ascii_case("open") {
        if let Some(reviewers) = &event.reviewers {
            return reviewers;
        }
    }
    event
        .changes
        .as_ref()
        .and_then(|changes| changes.reviewers.as_ref())
        .and_then(|reviewers| reviewers.current.as_deref())
        .unwrap_or_default()
}

fn approved(event: &MergeRequestEvent, keyboard: &[KeyboardRow]) -> Vec<NotificationIntent> {
    if !event.merge_request.action.eq_ignore_ascii_case("approved") {
        return Vec::new();
    }
    let text = format::mr_approved(
        &event.project.name,
        &event.merge_request.title,
        &event.user.name,
    );
    let content = MessageContent {
        text,
        keyboard: keyboard.to_vec(),
    };

    let mut intents = Vec::new();
    if let Some(assignee_id) = event.merge_request.assignee_id {
        if assignee_id != event.user.id {
            intents.push(NotificationIntent::to_user(assignee_id, content.clone()));
        }
    }
    intents.push(NotificationIntent::to_role(Role::Lead, content));
    intents
}

fn merged(event: &MergeRequestEvent, keyboard: &[KeyboardRow]) -> Vec<NotificationIntent> {
    if !event.merge_request.action.eq_ignore_ascii_case("merge") {
        return Vec::new();
    }
    let text = format::mr_merged(
        &event.project.name,
        &event.merge_request.title,
        &event.user.name,
    );
    let content = MessageContent {
        text,
        keyboard: keyboard.to_vec(),
    };

    let mut intents = Vec::new();
    if let Some(assignee_id) = event.merge_request.assignee_id {
        if assignee_id != event.user.id {
            intents.push(NotificationIntent::to_user(assignee_id, content.clone()));
        }
    }
    intents.push(NotificationIntent::to_role(Role::Lead, content.clone()));
    intents.push(NotificationIntent::to_role(Role::Pm, content));
    intents
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::notification::RecipientSpec;

    fn mr_event(attributes: Value) -> Value {
        json!({
            "object_kind": "merge_request",
            "user": {"id": 7, "name": "Test User"},
            "project": {"name": "Test Project", "web_url": "http://gitlab/test-project"},
            "object_attributes": attributes,
        })
    }

    fn handle(payload: Value) -> Vec<NotificationIntent> {
        let event = DomainEvent::parse(EventType::MergeRequest, payload.to_string().as_bytes())
            .expect("payload should parse");
        MergeRequestHandler.handle(&event)
    }

    #[test]
    fn supports_only_merge_request_events() {
        assert!(MergeRequestHandler.supports(EventType::MergeRequest));
        assert!(!MergeRequestHandler.supports(EventType::Issue));
        assert!(!MergeRequestHandler.supports(EventType::Note));
    }

    #[test]
    fn closed_mr_produces_nothing() {
        let payload = mr_event(json!({
            "title": "Test MR", "state": "closed", "action": "close",
            "url": "http://gitlab/test",
        }));
        assert!(handle(payload).is_empty());
    }

    #[test]
    fn opened_mr_notifies_lead() {
        let payload = mr_event(json!({
            "title": "Test MR", "state": "opened", "action": "open",
            "url": "http://gitlab/test",
        }));
        let intents = handle(payload);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].recipient, RecipientSpec::Role(Role::Lead));
        assert!(intents[0].content.text.contains("New Merge Request"));
        assert_eq!(intents[0].content.keyboard.len(), 1);
        assert_eq!(intents[0].content.keyboard[0].buttons[0].url, "http://gitlab/test");
    }

    #[test]
    fn draft_removal_notifies_lead() {
        let mut payload = mr_event(json!({
            "title": "Test MR", "state": "opened", "action": "update",
            "url": "http://gitlab/test",
        }));
        payload["changes"] = json!({"draft": {"previous": true, "current": false}});
        let intents = handle(payload);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].recipient, RecipientSpec::Role(Role::Lead));
        assert!(intents[0].content.text.contains("ready for review"));
    }

    #[test]
    fn entering_draft_is_silent() {
        let mut payload = mr_event(json!({
            "title": "Test MR", "state": "opened", "action": "update",
        }));
        payload["changes"] = json!({"draft": {"previous": false, "current": true}});
        assert!(handle(payload).is_empty());
    }

    #[test]
    fn reviewer_assignment_notifies_each_reviewer() {
        let mut payload = mr_event(json!({
            "title": "Test MR", "state": "opened", "action": "update",
            "url": "http://gitlab/test",
        }));
        payload["changes"] = json!({
            "reviewers": {"current": [
                {"id": 1, "name": "Reviewer 1"},
                {"id": 2, "name": "Reviewer 2"},
            ]},
        });
        let intents = handle(payload);
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].recipient, RecipientSpec::User(1));
        assert_eq!(intents[1].recipient, RecipientSpec::User(2));
    }

    #[test]
    fn reviewer_assignment_skips_acting_user() {
        let mut payload = mr_event(json!({
            "title": "Test MR", "state": "opened", "action": "update",
        }));
        payload["changes"] = json!({
            "reviewers": {"current": [
                {"id": 7, "name": "Test User"},
                {"id": 2, "name": "Reviewer 2"},
            ]},
        });
        let intents = handle(payload);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].recipient, RecipientSpec::User(2));
    }

    #[test]
    fn opened_mr_takes_reviewers_from_top_level() {
        let mut payload = mr_event(json!({
            "title": "Test MR", "state": "opened", "action": "open",
        }));
        payload["reviewers"] = json!([{"id": 3, "name": "Reviewer 3"}]);
        let intents = handle(payload);
        // one "new MR" for the lead plus one reviewer notification
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].recipient, RecipientSpec::Role(Role::Lead));
        assert_eq!(intents[1].recipient, RecipientSpec::User(3));
    }

    #[test]
    fn approved_notifies_assignee_and_lead() {
        let payload = mr_event(json!({
            "title": "Test MR", "state": "opened", "action": "approved",
            "assignee_id": 42,
        }));
        let intents = handle(payload);
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].recipient, RecipientSpec::User(42));
        assert_eq!(intents[1].recipient, RecipientSpec::Role(Role::Lead));
        assert_eq!(intents[0].content.text, intents[1].content.text);
    }

    #[test]
    fn approved_by_assignee_notifies_lead_only() {
        let payload = mr_event(json!({
            "title": "Test MR", "state": "opened", "action": "approved",
            "assignee_id": 7,
        }));
        let intents = handle(payload);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].recipient, RecipientSpec::Role(Role::Lead));
    }

    #[test]
    fn merged_notifies_assignee_lead_and_pm_with_identical_text() {
        let payload = mr_event(json!({
            "title": "Test MR", "state": "merged", "action": "merge",
            "assignee_id": 42,
        }));
        let intents = handle(payload);
        assert_eq!(intents.len(), 3);
        assert_eq!(intents[0].recipient, RecipientSpec::User(42));
        assert_eq!(intents[1].recipient, RecipientSpec::Role(Role::Lead));
        assert_eq!(intents[2].recipient, RecipientSpec::Role(Role::Pm));
        assert_eq!(intents[0].content.text, intents[1].content.text);
        assert_eq!(intents[1].content.text, intents[2].content.text);
        assert!(intents[0].content.text.contains("merged"));
    }

    #[test]
    fn merged_without_assignee_skips_user_intent() {
        let payload = mr_event(json!({
            "title": "Test MR", "state": "merged", "action": "merge",
        }));
        let intents = handle(payload);
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].recipient, RecipientSpec::Role(Role::Lead));
        assert_eq!(intents[1].recipient, RecipientSpec::Role(Role::Pm));
    }
}
