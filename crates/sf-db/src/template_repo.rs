use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};
use chrono::Utc;
use rusqlite::Connection;
use sf_core::error::QuestError;
use sf_core::quests::TemplateRepository;
use sf_core::types::enums::Difficulty;
use sf_core::types::ids::TemplateId;
use sf_core::types::io::{NewTemplate, UpsertOutcome};
use sf_core::types::QuestTemplate;
use std::str::FromStr;
use ulid::Ulid;

pub struct TemplateRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> TemplateRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get_by_name(&self, name: &str) -> Result<Option<QuestTemplate>, QuestError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, description, category, difficulty, target_value, \
                 reward_diamonds, reward_xp, is_active, created_at, updated_at \
                 FROM quest_templates WHERE name = ?1",
            )
            .map_err(invalid_input)?;
        let mut rows = stmt.query([name]).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_template_row(row).map(Some)
    }
}

impl<'a> TemplateRepository for TemplateRepo<'a> {
    fn upsert(&self, input: NewTemplate) -> Result<(QuestTemplate, UpsertOutcome), QuestError> {
        let now = Utc::now();
        if let Some(existing) = self.get_by_name(&input.name)? {
            let template = QuestTemplate {
                id: existing.id,
                name: input.name,
                description: input.description,
                category: input.category,
                difficulty: input.difficulty,
                target_value: input.target_value,
                reward_diamonds: input.reward_diamonds,
                reward_xp: input.reward_xp,
                is_active: input.is_active,
                created_at: existing.created_at,
                updated_at: now,
            };
            let sql = "UPDATE quest_templates SET description = ?1, category = ?2, \
                 difficulty = ?3, target_value = ?4, reward_diamonds = ?5, reward_xp = ?6, \
                 is_active = ?7, updated_at = ?8 WHERE id = ?9";
            let params = (
                template.description.clone(),
                template.category.clone(),
                encode_enum(&template.difficulty).map_err(invalid_input)?,
                template.target_value,
                template.reward_diamonds,
                template.reward_xp,
                template.is_active,
                to_rfc3339(&template.updated_at),
                template.id.as_str(),
            );
            self.conn.execute(sql, params).map_err(invalid_input)?;
            return Ok((template, UpsertOutcome::Updated));
        }

        let template = QuestTemplate {
            id: new_template_id()?,
            name: input.name,
            description: input.description,
            category: input.category,
            difficulty: input.difficulty,
            target_value: input.target_value,
            reward_diamonds: input.reward_diamonds,
            reward_xp: input.reward_xp,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        let sql = "INSERT INTO quest_templates (id, name, description, category, difficulty, \
             target_value, reward_diamonds, reward_xp, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";
        let params = (
            template.id.as_str(),
            template.name.clone(),
            template.description.clone(),
            template.category.clone(),
            encode_enum(&template.difficulty).map_err(invalid_input)?,
            template.target_value,
            template.reward_diamonds,
            template.reward_xp,
            template.is_active,
            to_rfc3339(&template.created_at),
            to_rfc3339(&template.updated_at),
        );
        self.conn.execute(sql, params).map_err(invalid_input)?;
        Ok((template, UpsertOutcome::Inserted))
    }

    fn list_active(
        &self,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<QuestTemplate>, QuestError> {
        let mut sql = "SELECT id, name, description, category, difficulty, target_value, \
             reward_diamonds, reward_xp, is_active, created_at, updated_at \
             FROM quest_templates WHERE is_active = 1"
            .to_string();
        if difficulty.is_some() {
            sql.push_str(" AND difficulty = ?1");
        }
        sql.push_str(" ORDER BY name ASC");

        let mut stmt = self.conn.prepare(&sql).map_err(invalid_input)?;
        let mut rows = match difficulty {
            Some(difficulty) => {
                let encoded = encode_enum(&difficulty).map_err(invalid_input)?;
                stmt.query([encoded]).map_err(invalid_input)?
            }
            None => stmt.query([]).map_err(invalid_input)?,
        };
        let mut templates = Vec::new();
        while let Some(row) = rows.next().map_err(invalid_input)? {
            templates.push(map_template_row(row)?);
        }
        Ok(templates)
    }

    fn count(&self) -> Result<u64, QuestError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quest_templates", [], |row| row.get(0))
            .map_err(invalid_input)?;
        Ok(count as u64)
    }
}

fn invalid_input<E: std::fmt::Display>(err: E) -> QuestError {
    QuestError::InvalidInput {
        message: err.to_string(),
    }
}

fn new_template_id() -> Result<TemplateId, QuestError> {
    let value = format!("{}{}", TemplateId::PREFIX, Ulid::new());
    TemplateId::new(value).map_err(invalid_input)
}

fn map_template_row(row: &rusqlite::Row<'_>) -> Result<QuestTemplate, QuestError> {
    let id: String = row.get(0).map_err(invalid_input)?;
    let name: String = row.get(1).map_err(invalid_input)?;
    let description: String = row.get(2).map_err(invalid_input)?;
    let category: String = row.get(3).map_err(invalid_input)?;
    let difficulty: String = row.get(4).map_err(invalid_input)?;
    let target_value: u32 = row.get(5).map_err(invalid_input)?;
    let reward_diamonds: u32 = row.get(6).map_err(invalid_input)?;
    let reward_xp: u32 = row.get(7).map_err(invalid_input)?;
    let is_active: bool = row.get(8).map_err(invalid_input)?;
    let created_at: String = row.get(9).map_err(invalid_input)?;
    let updated_at: String = row.get(10).map_err(invalid_input)?;

    Ok(QuestTemplate {
        id: TemplateId::from_str(&id).map_err(invalid_input)?,
        name,
        description,
        category,
        difficulty: decode_enum(&difficulty).map_err(invalid_input)?,
        target_value,
        reward_diamonds,
        reward_xp,
        is_active,
        created_at: from_rfc3339(&created_at).map_err(invalid_input)?,
        updated_at: from_rfc3339(&updated_at).map_err(invalid_input)?,
    })
}
