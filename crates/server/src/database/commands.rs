use std::collections::HashSet;

use sqlx::types::Json;
use sqlx::{Error as SqlxError, SqliteExecutor};
use tracing::{info, instrument};

use crate::database::connection::DbConnection;
use crate::models::category::{CategoryResponse, CategoryRow, CreateCategoryRequest};
use crate::models::resource::{CreateResourceRequest, ResourceId, ResourceResponse, ResourceRow};
use crate::models::tag::{TagId, TagResponse};

#[instrument(skip_all)]
pub async fn insert_resource<'a, E: SqliteExecutor<'a>>(
    executor: E,
    request: &CreateResourceRequest,
) -> Result<ResourceRow, SqlxError> {
    sqlx::query_as(
        "
            INSERT INTO resources (title, description, url, image, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, url, image, status, created_at, updated_at;
        ",
    )
    .bind(&request.title)
    .bind(&request.description)
    .bind(&request.url)
    .bind(request.image.as_ref())
    .bind(&request.status)
    .fetch_one(executor)
    .await
}

/// Inserts the tag or, when the name is already taken, returns the existing
/// row. The no-op DO UPDATE arm is what makes RETURNING yield a row on both
/// paths, so lookup and insert stay one atomic statement.
#[instrument(skip(executor))]
pub async fn find_or_create_tag<'a, E: SqliteExecutor<'a>>(
    executor: E,
    name: &str,
) -> Result<TagResponse, SqlxError> {
    sqlx::query_as(
        "
            INSERT INTO tags (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = excluded.name
            RETURNING id, name;
        ",
    )
    .bind(name)
    .fetch_one(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn link_resource_tag<'a, E: SqliteExecutor<'a>>(
    executor: E,
    resource_id: ResourceId,
    tag_id: TagId,
) -> Result<(), SqlxError> {
    sqlx::query(
        "
            INSERT INTO resource_tags (resource_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING;
        ",
    )
    .bind(resource_id)
    .bind(tag_id)
    .execute(executor)
    .await?;
    Ok(())
}

#[instrument(skip(executor))]
pub async fn delete_resource_by_id<'a, E: SqliteExecutor<'a>>(
    executor: E,
    id: ResourceId,
) -> Result<u64, SqlxError> {
    let result = sqlx::query("DELETE FROM resources WHERE id = $1;")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

#[instrument(skip(executor))]
pub async fn delete_resource_by_title<'a, E: SqliteExecutor<'a>>(
    executor: E,
    title: &str,
) -> Result<u64, SqlxError> {
    let result = sqlx::query("DELETE FROM resources WHERE title = $1;")
        .bind(title)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

#[instrument(skip(executor))]
pub async fn delete_tag_by_id<'a, E: SqliteExecutor<'a>>(
    executor: E,
    id: TagId,
) -> Result<u64, SqlxError> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1;")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

#[instrument(skip(executor))]
pub async fn delete_tag_by_name<'a, E: SqliteExecutor<'a>>(
    executor: E,
    name: &str,
) -> Result<u64, SqlxError> {
    let result = sqlx::query("DELETE FROM tags WHERE name = $1;")
        .bind(name)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

#[instrument(skip_all)]
pub async fn insert_category<'a, E: SqliteExecutor<'a>>(
    executor: E,
    request: &CreateCategoryRequest,
) -> Result<CategoryRow, SqlxError> {
    sqlx::query_as(
        "
            INSERT INTO categories (name, icon, tags, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, icon, tags, parent_id;
        ",
    )
    .bind(&request.name)
    .bind(&request.icon)
    .bind(Json(&request.tags))
    .bind(request.parent_id)
    .fetch_one(executor)
    .await
}

/// Keeps the first occurrence of each name, in request order.
fn dedup_tag_names(names: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .filter(|name| seen.insert(*name))
        .collect()
}

impl DbConnection {
    /// Persists the resource together with its tag links in one transaction,
    /// creating any tag that does not exist yet.
    pub async fn create_resource(
        &self,
        request: &CreateResourceRequest,
    ) -> Result<ResourceResponse, SqlxError> {
        let mut transaction = self.pool().begin().await?;
        let row = insert_resource(transaction.as_mut(), request).await?;
        let mut tags = Vec::new();
        for name in dedup_tag_names(&request.tags) {
            let tag = find_or_create_tag(transaction.as_mut(), name).await?;
            link_resource_tag(transaction.as_mut(), row.id, tag.id).await?;
            tags.push(tag);
        }
        transaction.commit().await?;
        info!("created resource {} with {} tags", row.id, tags.len());
        Ok(ResourceResponse::from_row(row, tags))
    }

    pub async fn delete_resource(&self, id: ResourceId) -> Result<u64, SqlxError> {
        delete_resource_by_id(self.pool(), id).await
    }

    pub async fn delete_resource_by_title(&self, title: &str) -> Result<u64, SqlxError> {
        delete_resource_by_title(self.pool(), title).await
    }

    pub async fn delete_tag(&self, id: TagId) -> Result<u64, SqlxError> {
        delete_tag_by_id(self.pool(), id).await
    }

    pub async fn delete_tag_by_name(&self, name: &str) -> Result<u64, SqlxError> {
        delete_tag_by_name(self.pool(), name).await
    }

    pub async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<CategoryResponse, SqlxError> {
        let row = insert_category(self.pool(), request).await?;
        info!("created category {}", row.id);
        Ok(CategoryResponse::from(row))
    }
}
