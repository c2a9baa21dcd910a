// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use serde::Deserialize;

/// Acting or referenced GitLab user. The id is required because recipient
/// routing keys on it; everything else is display data.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub web_url: String,
}

/// Subject of a merge request event. `state` and `action` drive routing,
/// so their absence is a parse failure.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MergeRequest {
    #[serde(default)]
    pub iid: Option<i64>,
    #[serde(default)]
    pub title: String,
    pub state: String,
    pub action: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target_branch: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
}

/// Merge request as referenced from note and pipeline payloads. GitLab
/// sends a reduced object there (no action, sometimes no reviewers), so
/// every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MergeRequestRef {
    #[serde(default)]
    pub iid: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub reviewers: Option<Vec<User>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Issue {
    #[serde(default)]
    pub iid: Option<i64>,
    #[serde(default)]
    pub title: String,
    pub state: String,
    pub action: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Note {
    pub noteable_type: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Pipeline {
    #[serde(default)]
    pub id: Option<i64>,
    pub status: String,
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// One entry of the pipeline `builds` list; only the stage name matters
/// for the deploy rule.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Build {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub status: String,
}

/// `changes` deltas attached to merge request events. Only present when
/// the webhook reports a transition.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Changes {
    #[serde(default)]
    pub draft: Option<DraftChanges>,
    #[serde(default)]
    pub reviewers: Option<ReviewersChanges>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DraftChanges {
    #[serde(default)]
    pub previous: Option<bool>,
    #[serde(default)]
    pub current: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ReviewersChanges {
    #[serde(default)]
    pub previous: Option<Vec<User>>,
    #[serde(default)]
    pub current: Option<Vec<User>>,
}
