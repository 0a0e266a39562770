use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_forge, AppState};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use sf_core::error::PackageError;
use sf_core::types::io::{CreatePackageInput, PackageFilter, UpdatePackageInput};
use sf_core::types::{DiamondPackage, PackageId};
use sf_events::types::EventSource;
use std::str::FromStr;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/diamond-packages", post(create).get(list))
        .route(
            "/admin/diamond-packages/{id}",
            get(get_package).patch(update).delete(delete),
        )
        .with_state(state)
}

fn parse_id(id: &str, correlation: Option<String>) -> Result<PackageId, Response> {
    PackageId::from_str(id).map_err(|err| {
        map_error(
            &sf_core::SkillForgeError::Package(PackageError::InvalidInput {
                message: err.to_string(),
            }),
            correlation,
        )
        .into_response()
    })
}

#[utoipa::path(
    post,
    path = "/api/admin/diamond-packages",
    request_body = CreatePackageInput,
    responses((status = 200, body = DiamondPackage))
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreatePackageInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.packages().create(&ctx, input) {
        Ok(package) => Json(package).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/diamond-packages",
    params(PackageFilter),
    responses((status = 200, body = Vec<DiamondPackage>))
)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(filter): Query<PackageFilter>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match forge.packages().list(filter) {
        Ok(packages) => Json(packages).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/diamond-packages/{id}",
    params(("id" = String, Path, description = "Package ID")),
    responses((status = 200, body = DiamondPackage))
)]
pub(crate) async fn get_package(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let package_id = match parse_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match forge.packages().get(&package_id) {
        Ok(package) => Json(package).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/admin/diamond-packages/{id}",
    params(("id" = String, Path, description = "Package ID")),
    request_body = UpdatePackageInput,
    responses((status = 200, body = DiamondPackage))
)]
pub(crate) async fn update(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePackageInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let package_id = match parse_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.packages().update(&ctx, &package_id, input) {
        Ok(package) => Json(package).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/diamond-packages/{id}",
    params(("id" = String, Path, description = "Package ID")),
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
    let package_id = match parse_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.packages().delete(&ctx, &package_id) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
