use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::core::CrudOperations;
use crate::errors::ApiError;
use crate::filtering::{Page, calculate_content_range};
use crate::models::{CountResponse, DeleteResponse, ListQuery, QueryParams, Record, SelectOption};

/// Router state: the operations for one resource.
#[derive(Clone)]
pub struct CrudState(pub Arc<dyn CrudOperations>);

fn page_response(
    state: &CrudState,
    page: Page<Record>,
) -> (HeaderMap, Json<Page<Record>>) {
    let headers = calculate_content_range(
        page.offset(),
        page.per_page,
        page.total,
        &state.0.resource().name,
    );
    (headers, Json(page))
}

#[utoipa::path(
    get,
    path = "/",
    params(ListQuery),
    responses(
        (status = axum::http::StatusCode::OK, description = "One page of matching records", body = Object),
        (status = axum::http::StatusCode::BAD_REQUEST, description = "Invalid sort or include"),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    summary = "List records",
    description = "Filters by any searchable field, optionally with an operator suffix, then sorts and paginates."
)]
pub async fn get_all_handler(
    State(state): State<CrudState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<(HeaderMap, Json<Page<Record>>), ApiError> {
    let page = state.0.get_all(&QueryParams::from(pairs)).await?;
    Ok(page_response(&state, page))
}

#[utoipa::path(
    get,
    path = "/search",
    params(ListQuery),
    responses(
        (status = axum::http::StatusCode::OK, description = "One page of matching records", body = Object),
        (status = axum::http::StatusCode::BAD_REQUEST, description = "Invalid sort or include"),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    summary = "Search records"
)]
pub async fn search_handler(
    State(state): State<CrudState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<(HeaderMap, Json<Page<Record>>), ApiError> {
    let page = state.0.search(&QueryParams::from(pairs)).await?;
    Ok(page_response(&state, page))
}

#[utoipa::path(
    get,
    path = "/count",
    responses(
        (status = axum::http::StatusCode::OK, description = "Number of matching records", body = CountResponse),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    summary = "Count records"
)]
pub async fn count_handler(
    State(state): State<CrudState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state.0.count(&QueryParams::from(pairs)).await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    get,
    path = "/options",
    responses(
        (status = axum::http::StatusCode::OK, description = "Key/label pairs ordered by label", body = [SelectOption]),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    summary = "List select options"
)]
pub async fn options_handler(
    State(state): State<CrudState>,
) -> Result<Json<Vec<SelectOption>>, ApiError> {
    Ok(Json(state.0.get_options().await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = String, Path, description = "Primary key")),
    responses(
        (status = axum::http::StatusCode::OK, description = "The requested record", body = Object),
        (status = axum::http::StatusCode::NOT_FOUND, description = "Record not found"),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    summary = "Get one record"
)]
pub async fn get_one_handler(
    State(state): State<CrudState>,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Record>, ApiError> {
    state
        .0
        .get_by_id(&id, &QueryParams::from(pairs))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(&state.0.resource().name, Some(id)))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = Object,
    responses(
        (status = axum::http::StatusCode::CREATED, description = "The created record", body = Object),
        (status = axum::http::StatusCode::CONFLICT, description = "Duplicate entry"),
        (status = axum::http::StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid attribute values"),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    summary = "Create one record"
)]
pub async fn create_one_handler(
    State(state): State<CrudState>,
    Query(pairs): Query<Vec<(String, String)>>,
    Json(body): Json<Record>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let mut params = QueryParams::from(pairs);
    params.merge_json(&body);
    let record = state.0.store(&params).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = String, Path, description = "Primary key")),
    request_body = Object,
    responses(
        (status = axum::http::StatusCode::OK, description = "The updated record", body = Object),
        (status = axum::http::StatusCode::NOT_FOUND, description = "Record not found"),
        (status = axum::http::StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid attribute values"),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    summary = "Update one record"
)]
pub async fn update_one_handler(
    State(state): State<CrudState>,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    Json(body): Json<Record>,
) -> Result<Json<Record>, ApiError> {
    let mut params = QueryParams::from(pairs);
    params.merge_json(&body);
    Ok(Json(state.0.modify(&params, &id).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = String, Path, description = "Primary key")),
    responses(
        (status = axum::http::StatusCode::OK, description = "Whether a record was deleted", body = DeleteResponse),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    summary = "Delete one record"
)]
pub async fn delete_one_handler(
    State(state): State<CrudState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.0.remove(&id).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// Every operation of one resource, ready to be nested under its path.
///
/// ```rust,ignore
/// let (router, api) = OpenApiRouter::new()
///     .nest("/users", resource_router(Arc::new(users)))
///     .split_for_parts();
/// ```
pub fn resource_router(ops: Arc<dyn CrudOperations>) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_all_handler, create_one_handler))
        .routes(routes!(search_handler))
        .routes(routes!(count_handler))
        .routes(routes!(options_handler))
        .routes(routes!(get_one_handler, update_one_handler, delete_one_handler))
        .with_state(CrudState(ops))
}
