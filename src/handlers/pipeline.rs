// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use crate::{
    events::{DomainEvent, EventType, PipelineEvent},
    format,
    handlers::EventHandler,
    notification::{KeyboardRow, MessageContent, NotificationIntent, Role},
};

/// Routes pipeline events: failures and successful deploy pipelines. The
/// two rules are independent; a pipeline can match neither.
pub struct PipelineHandler;

impl EventHandler for PipelineHandler {
    fn supports(&self, event_type: EventType) -> bool {
        event_type == EventType::Pipeline
    }

    fn handle(&self, event: &DomainEvent) -> Vec<NotificationIntent> {
        let DomainEvent::Pipeline(event) = event else {
            return Vec::new();
        };

        let keyboard = format::buttons_for_pipeline(event.pipeline.url.as_deref());

        let mut intents = Vec::new();
        intents.extend(failed(event, &keyboard));
        intents.extend(deployed(event, &keyboard));
        intents
    }
}

fn failed(event: &PipelineEvent, keyboard: &[KeyboardRow]) -> Vec<NotificationIntent> {
    if !event.pipeline.status.eq_ignore_ascii_case("failed") {
        return Vec::new();
    }
    let text = format::pipeline_failed(&event.project.name, &event.pipeline.git_ref);
    let content = MessageContent {
        text,
        keyboard: keyboard.to_vec(),
    };

    // MR pipelines concern whoever triggered them; branch pipelines go to
    // the broadcast audience
    if event.merge_request.is_some() {
        vec![NotificationIntent::to_user(event.user.id, content)]
    } else {
        vec![NotificationIntent::broadcast(content)]
    }
}

fn deployed(event: &PipelineEvent, keyboard: &[KeyboardRow]) -> Vec<NotificationIntent> {
    if !event.pipeline.status.eq_ignore_ascii_case("success") {
        return Vec::new();
    }
    if !has_deploy_stage(event) {
        return Vec::new();
    }
    let text = format::pipeline_deployed(&event.project.name, &event.pipeline.git_ref);
    let content = MessageContent {
        text,
        keyboard: keyboard.to_vec(),
    };
    vec![
        NotificationIntent::to_role(Role::Lead, content.clone()),
        NotificationIntent::to_role(Role::Pm, content.clone()),
        NotificationIntent::to_role(Role::Dev, content),
    ]
}

fn has_deploy_stage(event: &PipelineEvent) -> bool {
    event
        .builds
        .iter()
        .any(|build| build.stage.eq_ignore_ascii_case("deploy"))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::notification::RecipientSpec;

    fn pipeline_event(status: &str, builds: Value) -> Value {
        json!({
            "object_kind": "pipeline",
            "user": {"id": 7, "name": "Runner"},
            "project": {"name": "Test Project", "web_url": "http://gitlab/test-project"},
            "object_attributes": {
                "id": 31,
                "status": status,
                "ref": "main",
                "url": "http://gitlab/test-project/-/pipelines/31",
            },
            "builds": builds,
        })
    }

    fn handle(payload: Value) -> Vec<NotificationIntent> {
        let event = DomainEvent::parse(EventType::Pipeline, payload.to_string().as_bytes())
            .expect("payload should parse");
        PipelineHandler.handle(&event)
    }

    #[test]
    fn supports_only_pipeline_events() {
        assert!(PipelineHandler.supports(EventType::Pipeline));
        assert!(!PipelineHandler.supports(EventType::TagPush));
    }

    #[test]
    fn failed_pipeline_without_mr_broadcasts() {
        let payload = pipeline_event("failed", json!([]));
        let intents = handle(payload);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].recipient, RecipientSpec::Broadcast);
        assert!(intents[0].content.text.contains("Pipeline failed"));
        assert!(intents[0].content.text.contains("main"));
    }

    #[test]
    fn failed_mr_pipeline_notifies_acting_user() {
        let mut payload = pipeline_event("failed", json!([]));
        payload["merge_request"] = json!({"iid": 4, "title": "Test MR"});
        let intents = handle(payload);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].recipient, RecipientSpec::User(7));
    }

    #[test]
    fn successful_deploy_notifies_lead_pm_and_dev() {
        let payload = pipeline_event(
            "success",
            json!([
                {"id": 1, "stage": "build", "status": "success"},
                {"id": 2, "stage": "Deploy", "status": "success"},
            ]),
        );
        let intents = handle(payload);
        assert_eq!(intents.len(), 3);
        assert_eq!(intents[0].recipient, RecipientSpec::Role(Role::Lead));
        assert_eq!(intents[1].recipient, RecipientSpec::Role(Role::Pm));
        assert_eq!(intents[2].recipient, RecipientSpec::Role(Role::Dev));
        assert_eq!(intents[0].content.text, intents[2].content.text);
    }

    #[test]
    fn success_without_deploy_stage_is_silent() {
        let payload = pipeline_event(
            "success",
            json!([
                {"id": 1, "stage": "build", "status": "success"},
                {"id": 2, "stage": "test", "status": "success"},
            ]),
        );
        assert!(handle(payload).is_empty());
    }

    #[test]
    fn running_pipeline_matches_neither_rule() {
        let payload = pipeline_event("running", json!([{"id": 1, "stage": "deploy"}]));
        assert!(handle(payload).is_empty());
    }
}
