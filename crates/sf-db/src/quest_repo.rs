use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use sf_core::error::QuestError;
use sf_core::quests::QuestRepository;
use sf_core::types::ids::{PlayerId, QuestId, TemplateId};
use sf_core::types::io::NewQuest;
use sf_core::types::DailyQuest;
use std::str::FromStr;
use ulid::Ulid;

pub struct QuestRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> QuestRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const QUEST_COLUMNS: &str = "id, player_id, template_id, name, description, category, difficulty, \
     target_value, progress, is_completed, is_claimed, reward_diamonds, reward_xp, \
     created_at, expires_at, claimed_at";

impl<'a> QuestRepository for QuestRepo<'a> {
    fn create(&self, input: NewQuest) -> Result<DailyQuest, QuestError> {
        let now = Utc::now();
        let quest = DailyQuest {
            id: new_quest_id()?,
            player_id: input.player_id,
            template_id: input.template_id,
            name: input.name,
            description: input.description,
            category: input.category,
            difficulty: input.difficulty,
            target_value: input.target_value,
            progress: 0,
            is_completed: false,
            is_claimed: false,
            reward_diamonds: input.reward_diamonds,
            reward_xp: input.reward_xp,
            created_at: now,
            expires_at: input.expires_at,
            claimed_at: None,
        };

        let sql = "INSERT INTO daily_quests (id, player_id, template_id, name, description, \
             category, difficulty, target_value, progress, is_completed, is_claimed, \
             reward_diamonds, reward_xp, created_at, expires_at, claimed_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)";
        let params = (
            quest.id.as_str(),
            quest.player_id.as_str(),
            quest.template_id.as_ref().map(TemplateId::as_str),
            quest.name.clone(),
            quest.description.clone(),
            quest.category.clone(),
            encode_enum(&quest.difficulty).map_err(invalid_input)?,
            quest.target_value,
            quest.progress,
            quest.is_completed,
            quest.is_claimed,
            quest.reward_diamonds,
            quest.reward_xp,
            to_rfc3339(&quest.created_at),
            to_rfc3339(&quest.expires_at),
            quest.claimed_at.map(|value| to_rfc3339(&value)),
        );
        self.conn.execute(sql, params).map_err(invalid_input)?;

        Ok(quest)
    }

    fn get(&self, id: &QuestId) -> Result<Option<DailyQuest>, QuestError> {
        let sql = format!("SELECT {QUEST_COLUMNS} FROM daily_quests WHERE id = ?1");
        let mut stmt = self.conn.prepare(&sql).map_err(invalid_input)?;
        let mut rows = stmt.query([id.as_str()]).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_quest_row(row).map(Some)
    }

    fn list_window(
        &self,
        player_id: &PlayerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyQuest>, QuestError> {
        let sql = format!(
            "SELECT {QUEST_COLUMNS} FROM daily_quests \
             WHERE player_id = ?1 AND created_at >= ?2 AND created_at < ?3 \
             ORDER BY created_at ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(invalid_input)?;
        let mut rows = stmt
            .query((player_id.as_str(), to_rfc3339(&from), to_rfc3339(&to)))
            .map_err(invalid_input)?;
        let mut quests = Vec::new();
        while let Some(row) = rows.next().map_err(invalid_input)? {
            quests.push(map_quest_row(row)?);
        }
        Ok(quests)
    }

    fn set_progress(
        &self,
        id: &QuestId,
        progress: u32,
        is_completed: bool,
    ) -> Result<DailyQuest, QuestError> {
        let affected = self
            .conn
            .execute(
                "UPDATE daily_quests SET progress = ?1, is_completed = ?2 WHERE id = ?3",
                (progress, is_completed, id.as_str()),
            )
            .map_err(invalid_input)?;
        if affected == 0 {
            return Err(QuestError::NotFound);
        }
        self.get(id)?.ok_or(QuestError::NotFound)
    }

    fn claim(&self, id: &QuestId, claimed_at: DateTime<Utc>) -> Result<bool, QuestError> {
        // Conditional flip; a concurrent claimer loses by affecting 0 rows.
        let affected = self
            .conn
            .execute(
                "UPDATE daily_quests SET is_claimed = 1, claimed_at = ?1 \
                 WHERE id = ?2 AND is_claimed = 0",
                (to_rfc3339(&claimed_at), id.as_str()),
            )
            .map_err(invalid_input)?;
        Ok(affected > 0)
    }

    fn delete_unclaimed_window(
        &self,
        player_id: &PlayerId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, QuestError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM daily_quests \
                 WHERE player_id = ?1 AND is_claimed = 0 \
                 AND created_at >= ?2 AND created_at < ?3",
                (player_id.as_str(), to_rfc3339(&from), to_rfc3339(&to)),
            )
            .map_err(invalid_input)?;
        Ok(affected as u64)
    }
}

fn invalid_input<E: std::fmt::Display>(err: E) -> QuestError {
    QuestError::InvalidInput {
        message: err.to_string(),
    }
}

fn new_quest_id() -> Result<QuestId, QuestError> {
    let value = format!("{}{}", QuestId::PREFIX, Ulid::new());
    QuestId::new(value).map_err(invalid_input)
}

fn map_quest_row(row: &rusqlite::Row<'_>) -> Result<DailyQuest, QuestError> {
    let id: String = row.get(0).map_err(invalid_input)?;
    let player_id: String = row.get(1).map_err(invalid_input)?;
    let template_id: Option<String> = row.get(2).map_err(invalid_input)?;
    let name: String = row.get(3).map_err(invalid_input)?;
    let description: String = row.get(4).map_err(invalid_input)?;
    let category: String = row.get(5).map_err(invalid_input)?;
    let difficulty: String = row.get(6).map_err(invalid_input)?;
    let target_value: u32 = row.get(7).map_err(invalid_input)?;
    let progress: u32 = row.get(8).map_err(invalid_input)?;
    let is_completed: bool = row.get(9).map_err(invalid_input)?;
    let is_claimed: bool = row.get(10).map_err(invalid_input)?;
    let reward_diamonds: u32 = row.get(11).map_err(invalid_input)?;
    let reward_xp: u32 = row.get(12).map_err(invalid_input)?;
    let created_at: String = row.get(13).map_err(invalid_input)?;
    let expires_at: String = row.get(14).map_err(invalid_input)?;
    let claimed_at: Option<String> = row.get(15).map_err(invalid_input)?;

    Ok(DailyQuest {
        id: QuestId::from_str(&id).map_err(invalid_input)?,
        player_id: PlayerId::from_str(&player_id).map_err(invalid_input)?,
        template_id: template_id
            .map(|value| TemplateId::from_str(&value))
            .transpose()
            .map_err(invalid_input)?,
        name,
        description,
        category,
        difficulty: decode_enum(&difficulty).map_err(invalid_input)?,
        target_value,
        progress,
        is_completed,
        is_claimed,
        reward_diamonds,
        reward_xp,
        created_at: from_rfc3339(&created_at).map_err(invalid_input)?,
        expires_at: from_rfc3339(&expires_at).map_err(invalid_input)?,
        claimed_at: claimed_at
            .map(|value| from_rfc3339(&value))
            .transpose()
            .map_err(invalid_input)?,
    })
}
