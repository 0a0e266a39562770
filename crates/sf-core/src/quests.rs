use crate::error::QuestError;
use crate::types::io::{NewQuest, NewTemplate, UpsertOutcome};
use crate::types::{DailyQuest, Difficulty, PlayerId, QuestId, QuestTemplate};
use chrono::{DateTime, Utc};

pub trait QuestRepository {
    fn create(&self, input: NewQuest) -> Result<DailyQuest, QuestError>;
    fn get(&self, id: &QuestId) -> Result<Option<DailyQuest>, QuestError>;
    /// Quests created inside the half-open window `[from, to)`.
    fn list_window(
        &self,
        player_id: &PlayerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyQuest>, QuestError>;
    fn set_progress(
        &self,
        id: &QuestId,
        progress: u32,
        is_completed: bool,
    ) -> Result<DailyQuest, QuestError>;
    /// One-way claim flip, conditional on the quest being unclaimed.
    /// Returns false when the row was already claimed.
    fn claim(&self, id: &QuestId, claimed_at: DateTime<Utc>) -> Result<bool, QuestError>;
    /// Removes the window's unclaimed quests; claimed ones are settled
    /// history and survive. Returns the number of rows removed.
    fn delete_unclaimed_window(
        &self,
        player_id: &PlayerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, QuestError>;
}

pub trait TemplateRepository {
    fn upsert(&self, input: NewTemplate) -> Result<(QuestTemplate, UpsertOutcome), QuestError>;
    fn list_active(&self, difficulty: Option<Difficulty>) -> Result<Vec<QuestTemplate>, QuestError>;
    fn count(&self) -> Result<u64, QuestError>;
}
