// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

//! Message templates for every notification kind. All functions are pure:
//! same inputs, same text, no hidden state.

use crate::notification::{KeyboardRow, LinkButton};

pub fn new_mr(project: &str, title: &str, author: &str) -> String {
    format!("🆕 *New Merge Request created!*\n\nProject: _{project}_\nMR: *{title}*\nAuthor: {author}\n")
}

pub fn mr_undraft(project: &str, title: &str) -> String {
    format!(
        "📝 *Merge Request is ready for review!*\n\nProject: _{project}_\nMR: *{title}*\nMR was moved from draft status\n"
    )
}

pub fn you_are_mr_reviewer(project: &str, title: &str) -> String {
    format!(
        "👀 *You are assigned as MR reviewer!*\n\nProject: _{project}_\nMR: *{title}*\nPlease review this merge request\n"
    )
}

pub fn mr_approved(project: &str, title: &str, approver: &str) -> String {
    format!(
        "✅ *Merge Request approved!*\n\nProject: _{project}_\nMR: *{title}*\nApproved by: {approver}\n"
    )
}

pub fn mr_merged(project: &str, title: &str, merger: &str) -> String {
    format!(
        "🚀 *Merge Request merged!*\n\nProject: _{project}_\nMR: *{title}*\nMerged by: {merger}\n"
    )
}

pub fn new_comment_for_mr(project: &str, title: &str, author: &str) -> String {
    format!(
        "💬 *New comment on Merge Request!*\n\nProject: _{project}_\nMR: *{title}*\nComment by: {author}\n"
    )
}

pub fn new_issue(project: &str, title: &str, author: &str) -> String {
    format!("🐛 *New Issue created!*\n\nProject: _{project}_\nIssue: *{title}*\nAuthor: {author}\n")
}

pub fn new_tag(project: &str, tag: &str) -> String {
    format!("🏷️ *New Tag created!*\n\nProject: _{project}_\nTag: *{tag}*\n")
}

pub fn pipeline_failed(project: &str, pipeline: &str) -> String {
    format!(
        "❌ *Pipeline failed!*\n\nProject: _{project}_\nPipeline: *{pipeline}*\nPlease check the pipeline logs\n"
    )
}

pub fn pipeline_deployed(project: &str, pipeline: &str) -> String {
    format!(
        "🚀 *Pipeline deployed successfully!*\n\nProject: _{project}_\nPipeline: *{pipeline}*\nDeployment completed\n"
    )
}

pub fn buttons_for_mr(url: Option<&str>) -> Vec<KeyboardRow> {
    link_buttons("🔗 Open MR", url)
}

pub fn buttons_for_note(url: Option<&str>) -> Vec<KeyboardRow> {
    link_buttons("💬 Open comment", url)
}

pub fn buttons_for_issue(url: Option<&str>) -> Vec<KeyboardRow> {
    link_buttons("🐛 Open issue", url)
}

pub fn buttons_for_pipeline(url: Option<&str>) -> Vec<KeyboardRow> {
    link_buttons("🚀 Open pipeline", url)
}

pub fn buttons_for_tag(url: Option<&str>) -> Vec<KeyboardRow> {
    link_buttons("🏷️ Open tag", url)
}

/// One-row, one-button keyboard pointing at `url`. A missing or blank URL
/// yields an empty keyboard instead of an error.
pub fn link_buttons(label: &str, url: Option<&str>) -> Vec<KeyboardRow> {
    match url {
        Some(url) if !url.is_empty() => vec![KeyboardRow {
            buttons: vec![LinkButton {
                label: label.to_string(),
                url: url.to_string(),
            }],
        }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_are_pure() {
        let first = new_mr("proj", "Add feature", "Alice");
        let second = new_mr("proj", "Add feature", "Alice");
        assert_eq!(first, second);

        let first = pipeline_deployed("proj", "main");
        let second = pipeline_deployed("proj", "main");
        assert_eq!(first, second);
    }

    #[test]
    fn templates_substitute_all_slots() {
        let text = mr_merged("backend", "Fix race", "Bob");
        assert!(text.contains("backend"));
        assert!(text.contains("Fix race"));
        assert!(text.contains("Bob"));
    }

    #[test]
    fn link_buttons_build_single_row() {
        let keyboard = buttons_for_mr(Some("http://gitlab/mr/1"));
        assert_eq!(keyboard.len(), 1);
        assert_eq!(keyboard[0].buttons.len(), 1);
        assert_eq!(keyboard[0].buttons[0].label, "🔗 Open MR");
        assert_eq!(keyboard[0].buttons[0].url, "http://gitlab/mr/1");
    }

    #[test]
    fn blank_url_yields_empty_keyboard() {
        assert!(link_buttons("🔗 Open MR", None).is_empty());
        assert!(link_buttons("🔗 Open MR", Some("")).is_empty());
    }
}
