use crate::types::enums::{ActivityKind, Difficulty};
use crate::types::ids::{ActivityId, CategoryId, PackageId, TipId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Grouping for Python tips; `slug` is the stable seed key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PythonTip {
    pub id: TipId,
    pub title: String,
    pub content: String,
    pub code_example: Option<String>,
    pub category_id: CategoryId,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DiamondPackage {
    pub id: PackageId,
    pub name: String,
    pub diamonds: u32,
    pub bonus_diamonds: u32,
    pub price_cents: u32,
    pub sort_order: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A unit of learnable content; `content` is an opaque JSON blob whose shape
/// is owned by the client rendering the activity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LearningActivity {
    pub id: ActivityId,
    pub title: String,
    pub kind: ActivityKind,
    pub description: String,
    pub content: Value,
    pub difficulty: Difficulty,
    pub reward_diamonds: u32,
    pub reward_xp: u32,
    pub sort_order: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
