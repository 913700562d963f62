use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Error as SqlxError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DbConfig {
    path: String,
    max_connections: Option<u32>,
}

impl DbConfig {
    const MAX_CONN_FALLBACK: u32 = 5;

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(Self::MAX_CONN_FALLBACK)
    }

    /// Config pointing at an on-disk database, for tests that need more than
    /// one connection.
    #[cfg(test)]
    pub fn with_path(path: &std::path::Path, max_connections: u32) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            max_connections: Some(max_connections),
        }
    }
}

pub struct DbConnection {
    pool: SqlitePool,
}

impl DbConnection {
    pub async fn connect(config: &DbConfig) -> Result<Self, SqlxError> {
        // Foreign keys drive the resource_tags cascades; the database file is
        // created on first boot.
        let options = SqliteConnectOptions::new()
            .filename(config.path())
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections())
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Single-connection in-memory database, one per caller.
    #[cfg(test)]
    pub async fn connect_in_memory() -> Result<Self, SqlxError> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
