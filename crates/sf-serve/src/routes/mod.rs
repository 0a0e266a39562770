pub mod activities;
pub mod categories;
pub mod error;
pub mod events;
pub mod packages;
pub mod players;
pub mod quests;
pub mod tips;

use crate::middleware::correlation::correlation_middleware;
use crate::middleware::idempotency::IdempotencyLayer;
use crate::{openapi, AppState};
use axum::middleware;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(quests::router(state.clone()))
        .merge(players::router(state.clone()))
        .merge(categories::router(state.clone()))
        .merge(tips::router(state.clone()))
        .merge(packages::router(state.clone()))
        .merge(activities::router(state.clone()))
        .merge(events::router(state.clone()))
        .merge(openapi::router())
        .layer(IdempotencyLayer::new(state.clone()))
        .route_layer(middleware::from_fn(correlation_middleware));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
