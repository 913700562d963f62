use sqlx::{Error as SqlxError, SqliteExecutor};
use tracing::instrument;

use crate::database::connection::DbConnection;
use crate::database::utils::like_pattern;
use crate::models::category::{CategoryId, CategoryResponse, CategoryRow};
use crate::models::listing::Listing;
use crate::models::resource::{
    ResourceId, ResourceResponse, ResourceRow, ResourceSearch, SearchResourcesResponse,
};
use crate::models::tag::{TagId, TagResponse};

impl DbConnection {
    /// Fetches one resource with its tags, or `None` when the id is unknown.
    pub async fn get_resource(
        &self,
        id: ResourceId,
    ) -> Result<Option<ResourceResponse>, SqlxError> {
        let mut transaction = self.pool().begin().await?;
        let row = match get_resource_row(transaction.as_mut(), id).await? {
            Some(row) => row,
            None => return Ok(None),
        };
        let tags = list_tags_for_resource(transaction.as_mut(), row.id).await?;
        transaction.commit().await?;
        Ok(Some(ResourceResponse::from_row(row, tags)))
    }

    pub async fn list_resources(
        &self,
        listing: &Listing,
    ) -> Result<Vec<ResourceResponse>, SqlxError> {
        let mut transaction = self.pool().begin().await?;
        let rows = list_resource_rows(transaction.as_mut(), listing).await?;
        let mut resources = Vec::with_capacity(rows.len());
        for row in rows {
            let tags = list_tags_for_resource(transaction.as_mut(), row.id).await?;
            resources.push(ResourceResponse::from_row(row, tags));
        }
        transaction.commit().await?;
        Ok(resources)
    }

    /// Runs the count and the page inside one transaction so `total` always
    /// describes the same snapshot the returned page was cut from.
    pub async fn search_resources(
        &self,
        search: &ResourceSearch,
    ) -> Result<SearchResourcesResponse, SqlxError> {
        let pattern = search.query.as_deref().map(like_pattern);
        let mut transaction = self.pool().begin().await?;
        let total = count_matching_resources(
            transaction.as_mut(),
            pattern.as_deref(),
            search.tag.as_deref(),
        )
        .await?;
        let rows = list_matching_resource_rows(
            transaction.as_mut(),
            pattern.as_deref(),
            search.tag.as_deref(),
            &search.listing,
        )
        .await?;
        let mut recursos = Vec::with_capacity(rows.len());
        for row in rows {
            let tags = list_tags_for_resource(transaction.as_mut(), row.id).await?;
            recursos.push(ResourceResponse::from_row(row, tags));
        }
        transaction.commit().await?;
        Ok(SearchResourcesResponse {
            total,
            recursos,
            skip: search.listing.skip,
            limit: search.listing.limit,
        })
    }

    pub async fn list_tags(&self) -> Result<Vec<TagResponse>, SqlxError> {
        list_all_tags(self.pool()).await
    }

    pub async fn get_tag(&self, id: TagId) -> Result<Option<TagResponse>, SqlxError> {
        get_tag_row(self.pool(), id).await
    }

    pub async fn list_categories(
        &self,
        listing: &Listing,
    ) -> Result<Vec<CategoryResponse>, SqlxError> {
        let rows = list_category_rows(self.pool(), listing).await?;
        Ok(rows.into_iter().map(CategoryResponse::from).collect())
    }

    pub async fn get_category(
        &self,
        id: CategoryId,
    ) -> Result<Option<CategoryResponse>, SqlxError> {
        let row = get_category_row(self.pool(), id).await?;
        Ok(row.map(CategoryResponse::from))
    }
}

#[instrument(skip(executor))]
pub async fn get_resource_row<'a, E: SqliteExecutor<'a>>(
    executor: E,
    id: ResourceId,
) -> Result<Option<ResourceRow>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        id, title, description, url, image, status, created_at, updated_at
    FROM
        resources
    WHERE
        id = $1;
    ",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn list_resource_rows<'a, E: SqliteExecutor<'a>>(
    executor: E,
    listing: &Listing,
) -> Result<Vec<ResourceRow>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        id, title, description, url, image, status, created_at, updated_at
    FROM
        resources
    ORDER BY
        id
    LIMIT $1 OFFSET $2;
    ",
    )
    .bind(listing.limit)
    .bind(listing.skip)
    .fetch_all(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn list_tags_for_resource<'a, E: SqliteExecutor<'a>>(
    executor: E,
    resource_id: ResourceId,
) -> Result<Vec<TagResponse>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        tags.id AS id, tags.name AS name
    FROM
        resource_tags JOIN tags ON resource_tags.tag_id = tags.id
    WHERE
        resource_tags.resource_id = $1
    ORDER BY
        tags.id;
    ",
    )
    .bind(resource_id)
    .fetch_all(executor)
    .await
}

/// NULL filters are skipped by the `$N IS NULL` arms, so one statement covers
/// every filter combination. `LIKE` folds case for ASCII letters only;
/// accented characters match exactly.
#[instrument(skip(executor))]
pub async fn count_matching_resources<'a, E: SqliteExecutor<'a>>(
    executor: E,
    pattern: Option<&str>,
    tag: Option<&str>,
) -> Result<i64, SqlxError> {
    sqlx::query_scalar(
        "
    SELECT
        COUNT(*)
    FROM
        resources
    WHERE
        ($1 IS NULL OR title LIKE $1 ESCAPE '\\' OR description LIKE $1 ESCAPE '\\')
        AND ($2 IS NULL OR EXISTS (
            SELECT 1 FROM resource_tags JOIN tags ON resource_tags.tag_id = tags.id
            WHERE resource_tags.resource_id = resources.id AND tags.name = $2
        ));
    ",
    )
    .bind(pattern)
    .bind(tag)
    .fetch_one(executor)
    .await
}

/// Same predicate (and `LIKE` semantics) as [`count_matching_resources`],
/// paged.
#[instrument(skip(executor))]
pub async fn list_matching_resource_rows<'a, E: SqliteExecutor<'a>>(
    executor: E,
    pattern: Option<&str>,
    tag: Option<&str>,
    listing: &Listing,
) -> Result<Vec<ResourceRow>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        id, title, description, url, image, status, created_at, updated_at
    FROM
        resources
    WHERE
        ($1 IS NULL OR title LIKE $1 ESCAPE '\\' OR description LIKE $1 ESCAPE '\\')
        AND ($2 IS NULL OR EXISTS (
            SELECT 1 FROM resource_tags JOIN tags ON resource_tags.tag_id = tags.id
            WHERE resource_tags.resource_id = resources.id AND tags.name = $2
        ))
    ORDER BY
        id
    LIMIT $3 OFFSET $4;
    ",
    )
    .bind(pattern)
    .bind(tag)
    .bind(listing.limit)
    .bind(listing.skip)
    .fetch_all(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn list_all_tags<'a, E: SqliteExecutor<'a>>(
    executor: E,
) -> Result<Vec<TagResponse>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        id, name
    FROM
        tags
    ORDER BY
        name;
    ",
    )
    .fetch_all(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn get_tag_row<'a, E: SqliteExecutor<'a>>(
    executor: E,
    id: TagId,
) -> Result<Option<TagResponse>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        id, name
    FROM
        tags
    WHERE
        id = $1;
    ",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn list_category_rows<'a, E: SqliteExecutor<'a>>(
    executor: E,
    listing: &Listing,
) -> Result<Vec<CategoryRow>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        id, name, icon, tags, parent_id
    FROM
        categories
    ORDER BY
        id
    LIMIT $1 OFFSET $2;
    ",
    )
    .bind(listing.limit)
    .bind(listing.skip)
    .fetch_all(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn get_category_row<'a, E: SqliteExecutor<'a>>(
    executor: E,
    id: CategoryId,
) -> Result<Option<CategoryRow>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        id, name, icon, tags, parent_id
    FROM
        categories
    WHERE
        id = $1;
    ",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}
