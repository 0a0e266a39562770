use crate::types::enums::Difficulty;
use crate::types::ids::{PlayerId, QuestId, TemplateId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A per-player, per-day tracked objective with a numeric target and a fixed
/// diamond/XP reward. Claiming converts the reward into balance credits,
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailyQuest {
    pub id: QuestId,
    pub player_id: PlayerId,
    pub template_id: Option<TemplateId>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub target_value: u32,
    pub progress: u32,
    pub is_completed: bool,
    pub is_claimed: bool,
    pub reward_diamonds: u32,
    pub reward_xp: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl DailyQuest {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Seeded blueprint the daily generator instantiates quests from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuestTemplate {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub target_value: u32,
    pub reward_diamonds: u32,
    pub reward_xp: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response of a successful claim: what was granted and the new balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClaimReceipt {
    pub quest_id: QuestId,
    pub diamonds_granted: u32,
    pub xp_granted: u32,
    pub diamonds_total: u32,
    pub xp_total: u32,
}
