use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_forge, AppState};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use sf_core::error::CategoryError;
use sf_core::types::io::{CategoryFilter, CreateCategoryInput, UpdateCategoryInput};
use sf_core::types::{Category, CategoryId};
use sf_events::types::EventSource;
use std::str::FromStr;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/categories", post(create).get(list))
        .route(
            "/admin/categories/{id}",
            get(get_category).patch(update).delete(delete),
        )
        .with_state(state)
}

fn parse_id(id: &str, correlation: Option<String>) -> Result<CategoryId, Response> {
    CategoryId::from_str(id).map_err(|err| {
        map_error(
            &sf_core::SkillForgeError::Category(CategoryError::InvalidInput {
                message: err.to_string(),
            }),
            correlation,
        )
        .into_response()
    })
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryInput,
    responses((status = 200, body = Category))
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateCategoryInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.categories().create(&ctx, input) {
        Ok(category) => Json(category).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    params(CategoryFilter),
    responses((status = 200, body = Vec<Category>))
)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(filter): Query<CategoryFilter>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match forge.categories().list(filter) {
        Ok(categories) => Json(categories).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/categories/{id}",
    params(("id" = String, Path, description = "Category ID")),
    responses((status = 200, body = Category))
)]
pub(crate) async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let category_id = match parse_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match forge.categories().get(&category_id) {
        Ok(category) => Json(category).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/admin/categories/{id}",
    params(("id" = String, Path, description = "Category ID")),
    request_body = UpdateCategoryInput,
    responses((status = 200, body = Category))
)]
pub(crate) async fn update(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCategoryInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let category_id = match parse_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.categories().update(&ctx, &category_id, input) {
        Ok(category) => Json(category).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = String, Path, description = "Category ID")),
    responses((status = 200))
)]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let category_id = match parse_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.categories().delete(&ctx, &category_id) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
