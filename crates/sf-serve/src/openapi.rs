use utoipa::OpenApi;

use crate::routes::events::EventsQuery;
use crate::routes::quests::BoardQuery;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use sf_core::types::catalog::{Category, DiamondPackage, LearningActivity, PythonTip};
use sf_core::types::enums::{ActivityKind, Difficulty};
use sf_core::types::ids::{
    ActivityId, CategoryId, PackageId, PlayerId, QuestId, TemplateId, TipId,
};
use sf_core::types::io::{
    ActivityFilter, CategoryFilter, ClaimInput, CreateActivityInput, CreateCategoryInput,
    CreatePackageInput, CreatePlayerInput, CreateTipInput, PackageFilter, ProgressInput,
    RegenerateInput, TipFilter, UpdateActivityInput, UpdateCategoryInput, UpdatePackageInput,
    UpdateTipInput, UpsertOutcome,
};
use sf_core::types::player::Player;
use sf_core::types::quest::{ClaimReceipt, DailyQuest, QuestTemplate};
use sf_events::types::{EventRecord, EventSource};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::quests::board,
        crate::routes::quests::get_quest,
        crate::routes::quests::claim,
        crate::routes::quests::progress,
        crate::routes::quests::regenerate,
        crate::routes::players::register,
        crate::routes::players::get_player,
        crate::routes::categories::create,
        crate::routes::categories::list,
        crate::routes::categories::get_category,
        crate::routes::categories::update,
        crate::routes::categories::delete,
        crate::routes::tips::create,
        crate::routes::tips::list,
        crate::routes::tips::get_tip,
        crate::routes::tips::update,
        crate::routes::tips::delete,
        crate::routes::packages::create,
        crate::routes::packages::list,
        crate::routes::packages::get_package,
        crate::routes::packages::update,
        crate::routes::packages::delete,
        crate::routes::activities::create,
        crate::routes::activities::list,
        crate::routes::activities::get_activity,
        crate::routes::activities::update,
        crate::routes::activities::delete,
        crate::routes::events::list_events,
        crate::routes::events::subscribe,
        crate::routes::events::stream
    ),
    components(schemas(
        DailyQuest,
        QuestTemplate,
        ClaimReceipt,
        ClaimInput,
        ProgressInput,
        RegenerateInput,
        BoardQuery,
        Player,
        CreatePlayerInput,
        Category,
        CreateCategoryInput,
        UpdateCategoryInput,
        CategoryFilter,
        PythonTip,
        CreateTipInput,
        UpdateTipInput,
        TipFilter,
        DiamondPackage,
        CreatePackageInput,
        UpdatePackageInput,
        PackageFilter,
        LearningActivity,
        CreateActivityInput,
        UpdateActivityInput,
        ActivityFilter,
        UpsertOutcome,
        EventRecord,
        EventsQuery,
        QuestId,
        TemplateId,
        PlayerId,
        CategoryId,
        TipId,
        PackageId,
        ActivityId,
        Difficulty,
        ActivityKind,
        EventSource
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn ensure_initialized() {
    let _ = ApiDoc::openapi();
}

pub fn router() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn swagger_ui() -> impl IntoResponse {
    let html = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>SkillForge API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      window.ui = SwaggerUIBundle({ url: '/api/openapi.json', dom_id: '#swagger-ui' });
    </script>
  </body>
</html>
"#;
    axum::response::Html(html)
}
