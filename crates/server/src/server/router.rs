use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

use crate::error::{is_unique_violation, RequestError};
use crate::models::category::{
    validate_create_category, CategoryId, CategoryResponse, CreateCategoryRequest,
};
use crate::models::listing::{Listing, ListingQuery};
use crate::models::resource::{
    validate_create_resource, CreateResourceRequest, ResourceId, ResourceResponse, ResourceSearch,
    SearchResourcesResponse,
};
use crate::models::tag::{TagId, TagResponse};
use crate::models::MessageResponse;
use crate::server::constants::{
    CATEGORY_NOT_FOUND, DUPLICATE_TITLE, RESOURCE_DELETED, RESOURCE_NOT_FOUND, TAG_DELETED,
    TAG_NOT_FOUND, WELCOME_MESSAGE,
};
use crate::server::state::AppState;

pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.config.server.address.clone();
    let mut origins = Vec::new();
    for origin in &state.config.server.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);
    let app = router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("starting server on: {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/recursos/", post(create_resource).get(list_resources))
        .route("/recursos/buscar/", get(search_resources))
        .route("/recursos/:id", get(get_resource).delete(delete_resource))
        .route("/recursos/nombre/:titulo", delete(delete_resource_by_title))
        .route("/tags/", get(list_tags))
        .route("/tags/:id", get(get_tag).delete(delete_tag))
        .route("/tags/nombre/:nombre", delete(delete_tag_by_name))
        .route(
            "/api/categories/",
            post(create_category).get(list_categories),
        )
        .route("/api/categories/:id", get(get_category))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub tag: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new(WELCOME_MESSAGE))
}

pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateResourceRequest>,
) -> Result<Json<ResourceResponse>, RequestError> {
    validate_create_resource(&request)?;
    match state.db_connection.create_resource(&request).await {
        Ok(resource) => Ok(Json(resource)),
        Err(e) if is_unique_violation(&e) => {
            Err(RequestError::Conflict(DUPLICATE_TITLE.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Vec<ResourceResponse>>, RequestError> {
    let listing = Listing::from_query(query)?;
    let resources = state.db_connection.list_resources(&listing).await?;
    Ok(Json(resources))
}

pub async fn search_resources(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResourcesResponse>, RequestError> {
    let listing = Listing::from_query(ListingQuery {
        skip: params.skip,
        limit: params.limit,
    })?;
    let search = ResourceSearch {
        query: params.q,
        tag: params.tag,
        listing,
    };
    let response = state.db_connection.search_resources(&search).await?;
    Ok(Json(response))
}

pub async fn get_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ResourceId>,
) -> Result<Json<ResourceResponse>, RequestError> {
    let resource = state
        .db_connection
        .get_resource(id)
        .await?
        .ok_or_else(|| RequestError::NotFound(RESOURCE_NOT_FOUND.to_string()))?;
    Ok(Json(resource))
}

pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ResourceId>,
) -> Result<Json<MessageResponse>, RequestError> {
    let deleted = state.db_connection.delete_resource(id).await?;
    if deleted == 0 {
        return Err(RequestError::NotFound(RESOURCE_NOT_FOUND.to_string()));
    }
    Ok(Json(MessageResponse::new(RESOURCE_DELETED)))
}

pub async fn delete_resource_by_title(
    State(state): State<Arc<AppState>>,
    Path(titulo): Path<String>,
) -> Result<Json<MessageResponse>, RequestError> {
    let deleted = state.db_connection.delete_resource_by_title(&titulo).await?;
    if deleted == 0 {
        return Err(RequestError::NotFound(RESOURCE_NOT_FOUND.to_string()));
    }
    Ok(Json(MessageResponse::new(RESOURCE_DELETED)))
}

pub async fn list_tags(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TagResponse>>, RequestError> {
    let tags = state.db_connection.list_tags().await?;
    Ok(Json(tags))
}

pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TagId>,
) -> Result<Json<TagResponse>, RequestError> {
    let tag = state
        .db_connection
        .get_tag(id)
        .await?
        .ok_or_else(|| RequestError::NotFound(TAG_NOT_FOUND.to_string()))?;
    Ok(Json(tag))
}

pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TagId>,
) -> Result<Json<MessageResponse>, RequestError> {
    let deleted = state.db_connection.delete_tag(id).await?;
    if deleted == 0 {
        return Err(RequestError::NotFound(TAG_NOT_FOUND.to_string()));
    }
    Ok(Json(MessageResponse::new(TAG_DELETED)))
}

pub async fn delete_tag_by_name(
    State(state): State<Arc<AppState>>,
    Path(nombre): Path<String>,
) -> Result<Json<MessageResponse>, RequestError> {
    let deleted = state.db_connection.delete_tag_by_name(&nombre).await?;
    if deleted == 0 {
        return Err(RequestError::NotFound(TAG_NOT_FOUND.to_string()));
    }
    Ok(Json(MessageResponse::new(TAG_DELETED)))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<Json<CategoryResponse>, RequestError> {
    validate_create_category(&request)?;
    let category = state.db_connection.create_category(&request).await?;
    Ok(Json(category))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Vec<CategoryResponse>>, RequestError> {
    let listing = Listing::from_query(query)?;
    let categories = state.db_connection.list_categories(&listing).await?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CategoryId>,
) -> Result<Json<CategoryResponse>, RequestError> {
    let category = state
        .db_connection
        .get_category(id)
        .await?
        .ok_or_else(|| RequestError::NotFound(CATEGORY_NOT_FOUND.to_string()))?;
    Ok(Json(category))
}
