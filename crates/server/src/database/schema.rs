use sqlx::{Error as SqlxError, Sqlite, Transaction};
use tracing::instrument;

use crate::database::connection::DbConnection;

impl DbConnection {
    /// Creates all tables if missing; ran on every boot.
    pub async fn init_schema(&self) -> Result<(), SqlxError> {
        let mut transaction = self.pool().begin().await?;
        create_all_tables(&mut transaction).await?;
        transaction.commit().await?;
        Ok(())
    }

    pub async fn drop_schema(&self) -> Result<(), SqlxError> {
        let mut transaction = self.pool().begin().await?;
        drop_all_tables(&mut transaction).await?;
        transaction.commit().await?;
        Ok(())
    }
}

#[instrument(skip_all)]
pub async fn create_all_tables(transaction: &mut Transaction<'_, Sqlite>) -> Result<(), SqlxError> {
    sqlx::query(
        "
            CREATE TABLE IF NOT EXISTS resources (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL UNIQUE,
                description     TEXT NOT NULL,
                url             TEXT NOT NULL,
                image           TEXT,
                status          TEXT NOT NULL DEFAULT 'pending',
                created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at      TIMESTAMP
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    sqlx::query(
        "
            CREATE TABLE IF NOT EXISTS tags (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL UNIQUE
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    sqlx::query(
        "
            CREATE TABLE IF NOT EXISTS resource_tags (
                resource_id     INTEGER NOT NULL REFERENCES resources(id) ON UPDATE CASCADE ON DELETE CASCADE,
                tag_id          INTEGER NOT NULL REFERENCES tags(id) ON UPDATE CASCADE ON DELETE CASCADE,
                CONSTRAINT resource_tag_pkey PRIMARY KEY (resource_id, tag_id)
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    // parent_id carries no REFERENCES clause: parent existence and cycles are
    // the caller's responsibility.
    sqlx::query(
        "
            CREATE TABLE IF NOT EXISTS categories (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                icon            TEXT NOT NULL,
                tags            TEXT NOT NULL DEFAULT '[]',
                parent_id       INTEGER
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    Ok(())
}

#[instrument(skip_all)]
pub async fn drop_all_tables(transaction: &mut Transaction<'_, Sqlite>) -> Result<(), SqlxError> {
    let statements = [
        "DROP TABLE IF EXISTS resource_tags;",
        "DROP TABLE IF EXISTS categories;",
        "DROP TABLE IF EXISTS tags;",
        "DROP TABLE IF EXISTS resources;",
    ];
    for statement in &statements {
        sqlx::query(statement).execute(transaction.as_mut()).await?;
    }
    Ok(())
}
