use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_forge, AppState};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use sf_core::error::TipError;
use sf_core::types::io::{CreateTipInput, TipFilter, UpdateTipInput};
use sf_core::types::{PythonTip, TipId};
use sf_events::types::EventSource;
use std::str::FromStr;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/python-tips", post(create).get(list))
        .route(
            "/admin/python-tips/{id}",
            get(get_tip).patch(update).delete(delete),
        )
        .with_state(state)
}

fn parse_id(id: &str, correlation: Option<String>) -> Result<TipId, Response> {
    TipId::from_str(id).map_err(|err| {
        map_error(
            &sf_core::SkillForgeError::Tip(TipError::InvalidInput {
                message: err.to_string(),
            }),
            correlation,
        )
        .into_response()
    })
}

#[utoipa::path(
    post,
    path = "/api/admin/python-tips",
    request_body = CreateTipInput,
    responses((status = 200, body = PythonTip))
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateTipInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.tips().create(&ctx, input) {
        Ok(tip) => Json(tip).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/python-tips",
    params(TipFilter),
    responses((status = 200, body = Vec<PythonTip>))
)]
pub(crate) async fn list(State(state): State<AppState>, Query(filter): Query<TipFilter>) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match forge.tips().list(filter) {
        Ok(tips) => Json(tips).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/python-tips/{id}",
    params(("id" = String, Path, description = "Tip ID")),
    responses((status = 200, body = PythonTip))
)]
pub(crate) async fn get_tip(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let tip_id = match parse_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match forge.tips().get(&tip_id) {
        Ok(tip) => Json(tip).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/admin/python-tips/{id}",
    params(("id" = String, Path, description = "Tip ID")),
    request_body = UpdateTipInput,
    responses((status = 200, body = PythonTip))
)]
pub(crate) async fn update(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTipInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let tip_id = match parse_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.tips().update(&ctx, &tip_id, input) {
        Ok(tip) => Json(tip).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/python-tips/{id}",
    params(("id" = String, Path, description = "Tip ID")),
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
    let tip_id = match parse_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.tips().delete(&ctx, &tip_id) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
