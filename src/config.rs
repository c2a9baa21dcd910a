// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use std::{path::Path, str::FromStr, time::Duration};

use anyhow::{Result, anyhow};
use reqwest::Url;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, de::Error};

use crate::notification::Role;

const DEFAULT_CONFIG: &str = include_str!("config.yml");
const LOCAL_CONFIG_FILE: &str = "config-local.yml";

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<tracing::Level, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    tracing::Level::from_str(&s).map_err(|e| D::Error::custom(e.to_string()))
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: tracing::Level,
    pub otel: OtelMode,
    pub http_api: HttpApiConfig,
    pub gitlab: GitlabConfig,
    pub telegram: TelegramConfig,
    /// Role that receives notifications addressed to nobody in particular.
    pub broadcast_role: Role,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct HttpApiConfig {
    pub bind_host: String,
    pub bind_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum OtelMode {
    On,
    Stdout,
    Off,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitlabConfig {
    pub webhook_secret: SecretString,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    pub api_base: Url,
    #[serde(
        rename = "send_timeout_secs",
        deserialize_with = "duration_from_secs",
        default = "default_send_timeout"
    )]
    pub send_timeout: Duration,
}

fn default_send_timeout() -> Duration {
    Duration::from_secs(10)
}

pub fn duration_from_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

impl Config {
    pub fn new() -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Yaml,
            ))
            .add_source(
                config::Environment::with_prefix("NOTIFIER")
                    .prefix_separator("_")
                    .separator("__"),
            );

        if Path::new(LOCAL_CONFIG_FILE).exists() {
            builder = builder.add_source(config::File::with_name(LOCAL_CONFIG_FILE));
        }

        builder
            .build()?
            .try_deserialize()
            .map_err(|e| anyhow!("Failed to deserialize config: {}", e))
    }
}
