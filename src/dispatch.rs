// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use std::sync::Arc;

use futures::future::join_all;

use crate::{
    chat::ChatClient,
    events::{DomainEvent, EventType},
    handlers,
    notification::{MessageContent, NotificationIntent, RecipientSpec, Role},
    store::{IdentityStore, UserMapping},
};

/// Ties classification, parsing, handling, recipient resolution and
/// delivery together. One instance serves every inbound webhook call.
pub struct Dispatcher {
    store: Arc<dyn IdentityStore>,
    chat: Arc<dyn ChatClient>,
    broadcast_role: Role,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn IdentityStore>, chat: Arc<dyn ChatClient>, broadcast_role: Role) -> Self {
        Self {
            store,
            chat,
            broadcast_role,
        }
    }

    /// Process one raw webhook call. Never fails: every error is logged
    /// and contained, so the caller only learns the payload was accepted.
    pub async fn dispatch(&self, raw_label: &str, payload: &[u8]) {
        let event_type = match EventType::classify(raw_label) {
            Ok(event_type) => event_type,
            Err(e) => {
                tracing::warn!("{e}");
                tracing::debug!(
                    payload = %String::from_utf8_lossy(payload),
                    "Unsupported webhook payload"
                );
                return;
            }
        };

        let event = match DomainEvent::parse(event_type, payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("{e}");
                tracing::debug!(
                    payload = %String::from_utf8_lossy(payload),
                    "Bad webhook payload"
                );
                return;
            }
        };

        let Some(handler) = handlers::registry()
            .iter()
            .find(|handler| handler.supports(event_type))
        else {
            tracing::warn!(event_type = ?event_type, "No handler registered");
            return;
        };

        let intents = handler.handle(&event);
        tracing::debug!(event_type = ?event.event_type(), intents = intents.len(), "Handled event");

        // intents are independent; a slow or failing delivery in one must
        // not hold back the others
        join_all(intents.into_iter().map(|intent| self.deliver(intent))).await;
    }

    async fn deliver(&self, intent: NotificationIntent) {
        let NotificationIntent { recipient, content } = intent;

        let mappings = match recipient {
            RecipientSpec::User(user_id) => match self.store.by_external_user_id(user_id).await {
                Ok(Some(mapping)) => vec![mapping],
                Ok(None) => {
                    tracing::warn!(user_id, "No mapping for GitLab user, skipping notification");
                    return;
                }
                Err(e) => {
                    tracing::error!(user_id, error = ?e, "Mapping lookup failed");
                    return;
                }
            },
            RecipientSpec::Role(role) => self.all_by_role(role).await,
            // broadcast carries no target of its own; it goes to the
            // configured broadcast role
            RecipientSpec::Broadcast => self.all_by_role(self.broadcast_role).await,
        };

        for mapping in mappings {
            self.send_to(&mapping, &content).await;
        }
    }

    async fn all_by_role(&self, role: Role) -> Vec<UserMapping> {
        match self.store.all_by_role(role).await {
            Ok(mappings) => mappings,
            Err(e) => {
                tracing::error!(%role, error = ?e, "Role lookup failed");
                Vec::new()
            }
        }
    }

    async fn send_to(&self, mapping: &UserMapping, content: &MessageContent) {
        if let Err(e) = self
            .chat
            .send(mapping.destination_id, &content.text, &content.keyboard)
            .await
        {
            tracing::error!(
                destination = mapping.destination_id,
                error = ?e,
                "Failed to deliver notification"
            );
        }
    }
}
