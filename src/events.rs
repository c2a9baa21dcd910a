// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use serde::Deserialize;
use thiserror::Error;

use self::objects::{Build, Changes, Issue, MergeRequest, MergeRequestRef, Note, Pipeline, Project, User};

pub mod objects;

/// Closed set of webhook event kinds we route. Each variant is bound to
/// the label GitLab sends in the `X-Gitlab-Event` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    MergeRequest,
    Issue,
    Note,
    Pipeline,
    TagPush,
}

#[derive(Debug, Error)]
#[error("unsupported event label: {label}")]
pub struct UnknownEventLabel {
    pub label: String,
}

#[derive(Debug, Error)]
#[error("malformed {event_type:?} payload: {source}")]
pub struct EventParseError {
    pub event_type: EventType,
    #[source]
    pub source: serde_json::Error,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::MergeRequest,
        EventType::Issue,
        EventType::Note,
        EventType::Pipeline,
        EventType::TagPush,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventType::MergeRequest => "Merge Request Hook",
            EventType::Issue => "Issue Hook",
            EventType::Note => "Note Hook",
            EventType::Pipeline => "Pipeline Hook",
            EventType::TagPush => "Tag Push Hook",
        }
    }

    /// Exact, case-sensitive match against the known label table.
    pub fn classify(label: &str) -> Result<EventType, UnknownEventLabel> {
        Self::ALL
            .into_iter()
            .find(|event_type| event_type.label() == label)
            .ok_or_else(|| UnknownEventLabel {
                label: label.to_string(),
            })
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MergeRequestEvent {
    pub user: User,
    pub project: Project,
    #[serde(rename = "object_attributes")]
    pub merge_request: MergeRequest,
    #[serde(default)]
    pub changes: Option<Changes>,
    #[serde(default)]
    pub reviewers: Option<Vec<User>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IssueEvent {
    pub user: User,
    pub project: Project,
    #[serde(rename = "object_attributes")]
    pub issue: Issue,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NoteEvent {
    /// Comment author.
    pub user: User,
    pub project: Project,
    #[serde(rename = "object_attributes")]
    pub note: Note,
    #[serde(default)]
    pub merge_request: Option<MergeRequestRef>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PipelineEvent {
    pub user: User,
    pub project: Project,
    #[serde(rename = "object_attributes")]
    pub pipeline: Pipeline,
    #[serde(default)]
    pub merge_request: Option<MergeRequestRef>,
    #[serde(default)]
    pub builds: Vec<Build>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TagPushEvent {
    pub user: User,
    pub project: Project,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

impl TagPushEvent {
    /// Final `/`-delimited segment of the ref, e.g. `refs/tags/v1.0.0` -> `v1.0.0`.
    pub fn tag_name(&self) -> &str {
        self.git_ref.rsplit('/').next().unwrap_or(&self.git_ref)
    }

    pub fn tag_url(&self) -> String {
        format!("{}/-/tags/{}", self.project.web_url, self.tag_name())
    }
}

/// Typed representation of one inbound webhook payload. Constructed once
/// by [`DomainEvent::parse`], immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    MergeRequest(MergeRequestEvent),
    Issue(IssueEvent),
    Note(NoteEvent),
    Pipeline(PipelineEvent),
    TagPush(TagPushEvent),
}

impl DomainEvent {
    /// Deserialize the raw payload into the variant matching `event_type`.
    /// Unknown payload fields are ignored; only fields required for routing
    /// fail the parse when absent.
    pub fn parse(event_type: EventType, payload: &[u8]) -> Result<DomainEvent, EventParseError> {
        let parsed = match event_type {
            EventType::MergeRequest => {
                serde_json::from_slice(payload).map(DomainEvent::MergeRequest)
            }
            EventType::Issue => serde_json::from_slice(payload).map(DomainEvent::Issue),
            EventType::Note => serde_json::from_slice(payload).map(DomainEvent::Note),
            EventType::Pipeline => serde_json::from_slice(payload).map(DomainEvent::Pipeline),
            EventType::TagPush => serde_json::from_slice(payload).map(DomainEvent::TagPush),
        };
        parsed.map_err(|source| EventParseError { event_type, source })
    }

    pub fn event_type(&self) -> EventType {
        match self {
            DomainEvent::MergeRequest(_) => EventType::MergeRequest,
            DomainEvent::Issue(_) => EventType::Issue,
            DomainEvent::Note(_) => EventType::Note,
            DomainEvent::Pipeline(_) => EventType::Pipeline,
            DomainEvent::TagPush(_) => EventType::TagPush,
        }
    }
}
