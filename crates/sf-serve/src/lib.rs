pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod sse;

use axum::http::Request;
use axum::Router;
use middleware::correlation::CorrelationId;
use sf_core::{SkillForge, SkillForgeError};
use sf_db::schema;
use sf_db::store::DbStore;
use sf_events::bus::EventBus;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify};

#[derive(Clone, Default)]
pub struct IdempotencyLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
}

impl IdempotencyLocks {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub(crate) fn map(&self) -> &Mutex<HashMap<String, Arc<Notify>>> {
        &self.inner
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_path: String,
    pub event_bus: EventBus,
    pub idempotency: IdempotencyLocks,
}

pub fn build_forge(state: &AppState) -> Result<SkillForge<DbStore>, SkillForgeError> {
    let conn = schema::open_and_migrate(&state.db_path).map_err(|err| {
        SkillForgeError::Internal {
            message: err.to_string(),
        }
    })?;
    let store = DbStore::new(conn);
    Ok(SkillForge::new(store, state.event_bus.clone()))
}

pub fn correlation_id_from_request<B>(request: &Request<B>) -> Option<String> {
    request
        .extensions()
        .get::<CorrelationId>()
        .map(|value| value.0.clone())
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app(state)).await
}
