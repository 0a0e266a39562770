use crate::types::enums::{ActivityKind, Difficulty};
use crate::types::ids::{CategoryId, PlayerId, TemplateId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

/// Fully-resolved quest the generator hands to the store; the repository
/// mints the id and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewQuest {
    pub player_id: PlayerId,
    pub template_id: Option<TemplateId>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub target_value: u32,
    pub reward_diamonds: u32,
    pub reward_xp: u32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewTemplate {
    pub name: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub target_value: u32,
    pub reward_diamonds: u32,
    pub reward_xp: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProgressInput {
    pub player_id: PlayerId,
    pub amount: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClaimInput {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegenerateInput {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatePlayerInput {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateCategoryInput {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

/// Partial update; absent fields are left untouched. `slug` is the seed key
/// and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct CategoryFilter {
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateTipInput {
    pub title: String,
    pub content: String,
    pub code_example: Option<String>,
    pub category_id: CategoryId,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateTipInput {
    pub content: Option<String>,
    pub code_example: Option<String>,
    pub category_id: Option<CategoryId>,
    pub difficulty: Option<Difficulty>,
    pub xp_reward: Option<u32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct TipFilter {
    pub category_id: Option<CategoryId>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatePackageInput {
    pub name: String,
    pub diamonds: u32,
    pub bonus_diamonds: u32,
    pub price_cents: u32,
    pub sort_order: u32,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdatePackageInput {
    pub diamonds: Option<u32>,
    pub bonus_diamonds: Option<u32>,
    pub price_cents: Option<u32>,
    pub sort_order: Option<u32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct PackageFilter {
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateActivityInput {
    pub title: String,
    pub kind: ActivityKind,
    pub description: String,
    pub content: Value,
    pub difficulty: Difficulty,
    pub reward_diamonds: u32,
    pub reward_xp: u32,
    pub sort_order: u32,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateActivityInput {
    pub description: Option<String>,
    pub content: Option<Value>,
    pub difficulty: Option<Difficulty>,
    pub reward_diamonds: Option<u32>,
    pub reward_xp: Option<u32>,
    pub sort_order: Option<u32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct ActivityFilter {
    pub kind: Option<ActivityKind>,
    pub is_active: Option<bool>,
}

/// Whether an upsert inserted a fresh row or touched an existing one.
/// Seeders report these counts; idempotency tests assert zero inserts on a
/// second run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}
