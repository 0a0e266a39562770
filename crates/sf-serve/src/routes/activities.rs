use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_forge, AppState};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use sf_core::error::ActivityError;
use sf_core::types::io::{ActivityFilter, CreateActivityInput, UpdateActivityInput};
use sf_core::types::{ActivityId, LearningActivity};
use sf_events::types::EventSource;
use std::str::FromStr;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/learning-activities", post(create).get(list))
        .route(
            "/admin/learning-activities/{id}",
            get(get_activity).patch(update).delete(delete),
        )
        .with_state(state)
}

fn parse_id(id: &str, correlation: Option<String>) -> Result<ActivityId, Response> {
    ActivityId::from_str(id).map_err(|err| {
        map_error(
            &sf_core::SkillForgeError::Activity(ActivityError::InvalidInput {
                message: err.to_string(),
            }),
            correlation,
        )
        .into_response()
    })
}

#[utoipa::path(
    post,
    path = "/api/admin/learning-activities",
    request_body = CreateActivityInput,
    responses((status = 200, body = LearningActivity))
)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateActivityInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.activities().create(&ctx, input) {
        Ok(activity) => Json(activity).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/learning-activities",
    params(ActivityFilter),
    responses((status = 200, body = Vec<LearningActivity>))
)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ActivityFilter>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match forge.activities().list(filter) {
        Ok(activities) => Json(activities).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/learning-activities/{id}",
    params(("id" = String, Path, description = "Activity ID")),
    responses((status = 200, body = LearningActivity))
)]
pub(crate) async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let activity_id = match parse_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match forge.activities().get(&activity_id) {
        Ok(activity) => Json(activity).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/admin/learning-activities/{id}",
    params(("id" = String, Path, description = "Activity ID")),
    request_body = UpdateActivityInput,
    responses((status = 200, body = LearningActivity))
)]
pub(crate) async fn update(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<UpdateActivityInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let activity_id = match parse_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.activities().update(&ctx, &activity_id, input) {
        Ok(activity) => Json(activity).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/learning-activities/{id}",
    params(("id" = String, Path, description = "Activity ID")),
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
    let activity_id = match parse_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.activities().delete(&ctx, &activity_id) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
