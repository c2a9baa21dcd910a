// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use std::{path::Path, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{
    Row, SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};

use crate::notification::Role;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// One row of the mapping table: a GitLab user, their chat destination and
/// their organizational role. Administered outside this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMapping {
    pub external_user_id: i64,
    pub destination_id: i64,
    pub role: Role,
}

/// Read-only capability over the identity mapping table. Narrow on purpose
/// so dispatch can run against an in-memory fake in tests.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn by_external_user_id(&self, id: i64) -> Result<Option<UserMapping>>;
    async fn by_destination_id(&self, id: i64) -> Result<Option<UserMapping>>;
    async fn all_by_role(&self, role: Role) -> Result<Vec<UserMapping>>;
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(data_dir: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .create_if_missing(true)
            .filename(Path::new(data_dir).join("mappings.db"));
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }

    fn mapping_from_row(row: &SqliteRow) -> Result<UserMapping> {
        Ok(UserMapping {
            external_user_id: row.try_get("external_user_id")?,
            destination_id: row.try_get("destination_id")?,
            role: row.try_get::<String, _>("role")?.parse()?,
        })
    }
}

#[async_trait]
impl IdentityStore for SqliteStore {
    async fn by_external_user_id(&self, id: i64) -> Result<Option<UserMapping>> {
        let row = sqlx::query(
            "SELECT external_user_id, destination_id, role FROM user_mapping WHERE external_user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::mapping_from_row).transpose()
    }

    async fn by_destination_id(&self, id: i64) -> Result<Option<UserMapping>> {
        let row = sqlx::query(
            "SELECT external_user_id, destination_id, role FROM user_mapping WHERE destination_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::mapping_from_row).transpose()
    }

    async fn all_by_role(&self, role: Role) -> Result<Vec<UserMapping>> {
        let rows = sqlx::query(
            "SELECT external_user_id, destination_id, role FROM user_mapping WHERE role = ?",
        )
        .bind(role.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::mapping_from_row).collect()
    }
}
