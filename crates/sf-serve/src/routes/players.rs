use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_forge, AppState};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use sf_core::error::PlayerError;
use sf_core::types::io::CreatePlayerInput;
use sf_core::types::{Player, PlayerId};
use sf_events::types::EventSource;
use std::str::FromStr;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/players", post(register))
        .route("/players/{id}", get(get_player))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/players",
    request_body = CreatePlayerInput,
    responses((status = 200, body = Player))
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreatePlayerInput>,
) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = sf_core::RequestContext::new(EventSource::Ui, Some(correlation.0));
    match forge.players().register(&ctx, input) {
        Ok(player) => Json(player).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/players/{id}",
    params(("id" = String, Path, description = "Player ID")),
    responses((status = 200, body = Player))
)]
pub(crate) async fn get_player(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let forge = match build_forge(&state) {
        Ok(forge) => forge,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let player_id = match PlayerId::from_str(&id) {
        Ok(value) => value,
        Err(err) => {
            return map_error(
                &sf_core::SkillForgeError::Player(PlayerError::InvalidInput {
                    message: err.to_string(),
                }),
                None,
            )
            .into_response()
        }
    };
    match forge.players().get(&player_id) {
        Ok(player) => Json(player).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}
