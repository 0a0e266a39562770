use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_forge, AppState};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use sf_core::error::QuestError;
use sf_core::types::io::{ClaimInput, ProgressInput, RegenerateInput};
use sf_core::types::quest::{ClaimReceipt, DailyQuest};
use sf_core::types::{PlayerId, QuestId};
use sf_events::types::EventSource;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct BoardQuery {
    player_id: PlayerId,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/daily-quests", get(board))
        .route("/daily-quests/regenerate", post(regenerate))
        .route("/daily-quests/{id}", get(get_quest))
        .route("/daily-quests/{id}/claim", post(claim))
        .route("/daily-quests/{id}/progress", post(progress))
        .with_state(state)
}

fn parse_quest_id(id: &str, correlation: Option<String>) -> Result<QuestId, Response> {
    QuestId::from_str(id).map_err(|err| {
        map_error(
            &sf_core::SkillForgeError::Quest(QuestError::InvalidInput {
                message: err.to_string(),
            }),
            correlation,
        )
        .into_response()
    })
}

#[utoipa::path(
    get,
    path = "/api/daily-quests",
    params(BoardQuery),
    responses((status = 200, body = Vec<DailyQuest>))
)]
pub(crate) async fn board(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Query(query): Query<BoardQuery>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.quests().board(&ctx, &query.player_id) {
        Ok(quests) => Json(quests).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/daily-quests/{id}",
    params(("id" = String, Path, description = "Quest ID")),
    responses((status = 200, body = DailyQuest))
)]
pub(crate) async fn get_quest(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let quest_id = match parse_quest_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match forge.quests().get(&quest_id) {
        Ok(Some(quest)) => Json(quest).into_response(),
        Ok(None) => map_error(
            &sf_core::SkillForgeError::Quest(QuestError::NotFound),
            None,
        )
        .into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/daily-quests/{id}/claim",
    params(("id" = String, Path, description = "Quest ID")),
    request_body = ClaimInput,
    responses((status = 200, body = ClaimReceipt))
)]
pub(crate) async fn claim(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<ClaimInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let quest_id = match parse_quest_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.quests().claim(&ctx, &quest_id, input) {
        Ok(receipt) => Json(receipt).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/daily-quests/{id}/progress",
    params(("id" = String, Path, description = "Quest ID")),
    request_body = ProgressInput,
    responses((status = 200, body = DailyQuest))
)]
pub(crate) async fn progress(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<ProgressInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let quest_id = match parse_quest_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.quests().progress(&ctx, &quest_id, input) {
        Ok(quest) => Json(quest).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/daily-quests/regenerate",
    request_body = RegenerateInput,
    responses((status = 200, body = Vec<DailyQuest>))
)]
pub(crate) async fn regenerate(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<RegenerateInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.quests().regenerate(&ctx, input) {
        Ok(quests) => Json(quests).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
