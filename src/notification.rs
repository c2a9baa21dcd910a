// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

/// Organizational role a mapping can carry. Also usable as a notification
/// target: a role intent fans out to every mapping holding that role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Lead,
    Pm,
    Dev,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Lead => "lead",
            Role::Pm => "pm",
            Role::Dev => "dev",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead" => Ok(Role::Lead),
            "pm" => Ok(Role::Pm),
            "dev" => Ok(Role::Dev),
            other => Err(anyhow::anyhow!("unknown role: {other}")),
        }
    }
}

/// Who a single notification is addressed to. `Broadcast` carries no
/// explicit target; the dispatcher resolves it against the configured
/// broadcast role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientSpec {
    /// A concrete GitLab user, resolved through the identity mapping store.
    User(i64),
    /// Every mapping holding the given role.
    Role(Role),
    Broadcast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardRow {
    pub buttons: Vec<LinkButton>,
}

/// Formatted message body plus its inline keyboard, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent {
    pub text: String,
    pub keyboard: Vec<KeyboardRow>,
}

/// One notification a handler wants delivered. Produced by handlers,
/// consumed by the dispatcher, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub recipient: RecipientSpec,
    pub content: MessageContent,
}

impl NotificationIntent {
    pub fn to_user(user_id: i64, content: MessageContent) -> Self {
        Self {
            recipient: RecipientSpec::User(user_id),
            content,
        }
    }

    pub fn to_role(role: Role, content: MessageContent) -> Self {
        Self {
            recipient: RecipientSpec::Role(role),
            content,
        }
    }

    pub fn broadcast(content: MessageContent) -> Self {
        Self {
            recipient: RecipientSpec::Broadcast,
            content,
        }
    }
}
