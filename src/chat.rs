// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{config::Config, notification::KeyboardRow};

/// Outbound delivery: send one formatted message with an optional inline
/// keyboard to one destination.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send(&self, destination_id: i64, text: &str, keyboard: &[KeyboardRow]) -> Result<()>;
}

pub struct TelegramClient {
    http: reqwest::Client,
    token: SecretString,
    api_base: Url,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .timeout(config.telegram.send_timeout)
            .build()?;
        Ok(Self {
            http,
            token: config.telegram.bot_token.clone(),
            api_base: config.telegram.api_base.clone(),
        })
    }

    fn method_url(&self, method: &str) -> Result<Url> {
        let url = self
            .api_base
            .join(&format!("bot{}/{method}", self.token.expose_secret()))?;
        Ok(url)
    }
}

fn to_reply_markup(keyboard: &[KeyboardRow]) -> Option<InlineKeyboardMarkup> {
    if keyboard.is_empty() {
        return None;
    }
    Some(InlineKeyboardMarkup {
        inline_keyboard: keyboard
            .iter()
            .map(|row| {
                row.buttons
                    .iter()
                    .map(|button| InlineKeyboardButton {
                        text: button.label.clone(),
                        url: button.url.clone(),
                    })
                    .collect()
            })
            .collect(),
    })
}

#[async_trait]
impl ChatClient for TelegramClient {
    async fn send(&self, destination_id: i64, text: &str, keyboard: &[KeyboardRow]) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: destination_id,
            text,
            parse_mode: "Markdown",
            reply_markup: to_reply_markup(keyboard),
        };

        let response = self
            .http
            .post(self.method_url("sendMessage")?)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ApiResponse>()
            .await?;

        if !response.ok {
            bail!(
                "telegram rejected message: {}",
                response.description.unwrap_or_default()
            );
        }

        tracing::debug!(chat_id = destination_id, "Message sent");
        Ok(())
    }
}
