use crate::util::{
    decode_enum, decode_json, encode_enum, encode_json, from_rfc3339, is_constraint_violation,
    to_rfc3339,
};
use chrono::Utc;
use rusqlite::Connection;
use sf_core::catalog::ActivityRepository;
use sf_core::error::ActivityError;
use sf_core::types::enums::ActivityKind;
use sf_core::types::ids::ActivityId;
use sf_core::types::io::{ActivityFilter, CreateActivityInput, UpdateActivityInput, UpsertOutcome};
use sf_core::types::LearningActivity;
use std::str::FromStr;
use ulid::Ulid;

pub struct ActivityRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> ActivityRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get_by_title_kind(
        &self,
        title: &str,
        kind: ActivityKind,
    ) -> Result<Option<LearningActivity>, ActivityError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, kind, description, content_json, difficulty, \
                 reward_diamonds, reward_xp, sort_order, is_active, created_at, updated_at \
                 FROM learning_activities WHERE title = ?1 AND kind = ?2",
            )
            .map_err(invalid_input)?;
        let encoded = encode_enum(&kind).map_err(invalid_input)?;
        let mut rows = stmt.query((title, encoded)).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_activity_row(row).map(Some)
    }
}

impl<'a> ActivityRepository for ActivityRepo<'a> {
    fn create(&self, input: CreateActivityInput) -> Result<LearningActivity, ActivityError> {
        let now = Utc::now();
        let activity = LearningActivity {
            id: new_activity_id()?,
            title: input.title,
            kind: input.kind,
            description: input.description,
            content: input.content,
            difficulty: input.difficulty,
            reward_diamonds: input.reward_diamonds,
            reward_xp: input.reward_xp,
            sort_order: input.sort_order,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        let sql = "INSERT INTO learning_activities (id, title, kind, description, content_json, \
             difficulty, reward_diamonds, reward_xp, sort_order, is_active, created_at, \
             updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
        let params = (
            activity.id.as_str(),
            activity.title.clone(),
            encode_enum(&activity.kind).map_err(invalid_input)?,
            activity.description.clone(),
            encode_json(&activity.content).map_err(invalid_input)?,
            encode_enum(&activity.difficulty).map_err(invalid_input)?,
            activity.reward_diamonds,
            activity.reward_xp,
            activity.sort_order,
            activity.is_active,
            to_rfc3339(&activity.created_at),
            to_rfc3339(&activity.updated_at),
        );
        self.conn.execute(sql, params).map_err(|err| {
            if is_constraint_violation(&err) {
                ActivityError::TitleConflict
            } else {
                invalid_input(err)
            }
        })?;
        Ok(activity)
    }

    fn get(&self, id: &ActivityId) -> Result<Option<LearningActivity>, ActivityError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, kind, description, content_json, difficulty, \
                 reward_diamonds, reward_xp, sort_order, is_active, created_at, updated_at \
                 FROM learning_activities WHERE id = ?1",
            )
            .map_err(invalid_input)?;
        let mut rows = stmt.query([id.as_str()]).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_activity_row(row).map(Some)
    }

    fn list(&self, filter: ActivityFilter) -> Result<Vec<LearningActivity>, ActivityError> {
        let mut sql = "SELECT id, title, kind, description, content_json, difficulty, \
             reward_diamonds, reward_xp, sort_order, is_active, created_at, updated_at \
             FROM learning_activities"
            .to_string();
        let mut clauses = Vec::new();
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(kind) = filter.kind {
            clauses.push(format!("kind = ?{}", params.len() + 1));
            params.push(encode_enum(&kind).map_err(invalid_input)?.into());
        }
        if let Some(is_active) = filter.is_active {
            clauses.push(format!("is_active = ?{}", params.len() + 1));
            params.push(i64::from(is_active).into());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY sort_order ASC, title ASC");

        let mut stmt = self.conn.prepare(&sql).map_err(invalid_input)?;
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .map_err(invalid_input)?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next().map_err(invalid_input)? {
            activities.push(map_activity_row(row)?);
        }
        Ok(activities)
    }

    fn update(
        &self,
        id: &ActivityId,
        input: UpdateActivityInput,
    ) -> Result<LearningActivity, ActivityError> {
        let mut activity = self.get(id)?.ok_or(ActivityError::NotFound)?;
        if let Some(description) = input.description {
            activity.description = description;
        }
        if let Some(content) = input.content {
            activity.content = content;
        }
        if let Some(difficulty) = input.difficulty {
            activity.difficulty = difficulty;
        }
        if let Some(reward_diamonds) = input.reward_diamonds {
            activity.reward_diamonds = reward_diamonds;
        }
        if let Some(reward_xp) = input.reward_xp {
            activity.reward_xp = reward_xp;
        }
        if let Some(sort_order) = input.sort_order {
            activity.sort_order = sort_order;
        }
        if let Some(is_active) = input.is_active {
            activity.is_active = is_active;
        }
        activity.updated_at = Utc::now();

        let sql = "UPDATE learning_activities SET description = ?1, content_json = ?2, \
             difficulty = ?3, reward_diamonds = ?4, reward_xp = ?5, sort_order = ?6, \
             is_active = ?7, updated_at = ?8 WHERE id = ?9";
        let params = (
            activity.description.clone(),
            encode_json(&activity.content).map_err(invalid_input)?,
            encode_enum(&activity.difficulty).map_err(invalid_input)?,
            activity.reward_diamonds,
            activity.reward_xp,
            activity.sort_order,
            activity.is_active,
            to_rfc3339(&activity.updated_at),
            activity.id.as_str(),
        );
        self.conn.execute(sql, params).map_err(invalid_input)?;
        Ok(activity)
    }

    fn delete(&self, id: &ActivityId) -> Result<(), ActivityError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM learning_activities WHERE id = ?1",
                [id.as_str()],
            )
            .map_err(invalid_input)?;
        if affected == 0 {
            return Err(ActivityError::NotFound);
        }
        Ok(())
    }

    fn upsert(
        &self,
        input: CreateActivityInput,
    ) -> Result<(LearningActivity, UpsertOutcome), ActivityError> {
        if let Some(existing) = self.get_by_title_kind(&input.title, input.kind)? {
            let updated = self.update(
                &existing.id,
                UpdateActivityInput {
                    description: Some(input.description),
                    content: Some(input.content),
                    difficulty: Some(input.difficulty),
                    reward_diamonds: Some(input.reward_diamonds),
                    reward_xp: Some(input.reward_xp),
                    sort_order: Some(input.sort_order),
                    is_active: input.is_active,
                },
            )?;
            return Ok((updated, UpsertOutcome::Updated));
        }
        let activity = self.create(input)?;
        Ok((activity, UpsertOutcome::Inserted))
    }
}

fn invalid_input<E: std::fmt::Display>(err: E) -> ActivityError {
    ActivityError::InvalidInput {
        message: err.to_string(),
    }
}

fn new_activity_id() -> Result<ActivityId, ActivityError> {
    let value = format!("{}{}", ActivityId::PREFIX, Ulid::new());
    ActivityId::new(value).map_err(invalid_input)
}

fn map_activity_row(row: &rusqlite::Row<'_>) -> Result<LearningActivity, ActivityError> {
    let id: String = row.get(0).map_err(invalid_input)?;
    let title: String = row.get(1).map_err(invalid_input)?;
    let kind: String = row.get(2).map_err(invalid_input)?;
    let description: String = row.get(3).map_err(invalid_input)?;
    let content_json: String = row.get(4).map_err(invalid_input)?;
    let difficulty: String = row.get(5).map_err(invalid_input)?;
    let reward_diamonds: u32 = row.get(6).map_err(invalid_input)?;
    let reward_xp: u32 = row.get(7).map_err(invalid_input)?;
    let sort_order: u32 = row.get(8).map_err(invalid_input)?;
    let is_active: bool = row.get(9).map_err(invalid_input)?;
    let created_at: String = row.get(10).map_err(invalid_input)?;
    let updated_at: String = row.get(11).map_err(invalid_input)?;

    Ok(LearningActivity {
        id: ActivityId::from_str(&id).map_err(invalid_input)?,
        title,
        kind: decode_enum(&kind).map_err(invalid_input)?,
        description,
        content: decode_json(&content_json).map_err(invalid_input)?,
        difficulty: decode_enum(&difficulty).map_err(invalid_input)?,
        reward_diamonds,
        reward_xp,
        sort_order,
        is_active,
        created_at: from_rfc3339(&created_at).map_err(invalid_input)?,
        updated_at: from_rfc3339(&updated_at).map_err(invalid_input)?,
    })
}
