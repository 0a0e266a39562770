use crate::util::{decode_enum, encode_enum, from_rfc3339, is_constraint_violation, to_rfc3339};
use chrono::Utc;
use rusqlite::Connection;
use sf_core::catalog::TipRepository;
use sf_core::error::TipError;
use sf_core::types::ids::{CategoryId, TipId};
use sf_core::types::io::{CreateTipInput, TipFilter, UpdateTipInput, UpsertOutcome};
use sf_core::types::PythonTip;
use std::str::FromStr;
use ulid::Ulid;

pub struct TipRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> TipRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get_by_title(&self, title: &str) -> Result<Option<PythonTip>, TipError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, content, code_example, category_id, difficulty, xp_reward, \
                 is_active, created_at, updated_at FROM python_tips WHERE title = ?1",
            )
            .map_err(invalid_input)?;
        let mut rows = stmt.query([title]).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_tip_row(row).map(Some)
    }
}

impl<'a> TipRepository for TipRepo<'a> {
    fn create(&self, input: CreateTipInput) -> Result<PythonTip, TipError> {
        let now = Utc::now();
        let tip = PythonTip {
            id: new_tip_id()?,
            title: input.title,
            content: input.content,
            code_example: input.code_example,
            category_id: input.category_id,
            difficulty: input.difficulty,
            xp_reward: input.xp_reward,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        let sql = "INSERT INTO python_tips (id, title, content, code_example, category_id, \
             difficulty, xp_reward, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
        let params = (
            tip.id.as_str(),
            tip.title.clone(),
            tip.content.clone(),
            tip.code_example.clone(),
            tip.category_id.as_str(),
            encode_enum(&tip.difficulty).map_err(invalid_input)?,
            tip.xp_reward,
            tip.is_active,
            to_rfc3339(&tip.created_at),
            to_rfc3339(&tip.updated_at),
        );
        self.conn.execute(sql, params).map_err(|err| {
            if is_constraint_violation(&err) {
                TipError::TitleConflict
            } else {
                invalid_input(err)
            }
        })?;
        Ok(tip)
    }

    fn get(&self, id: &TipId) -> Result<Option<PythonTip>, TipError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, content, code_example, category_id, difficulty, xp_reward, \
                 is_active, created_at, updated_at FROM python_tips WHERE id = ?1",
            )
            .map_err(invalid_input)?;
        let mut rows = stmt.query([id.as_str()]).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_tip_row(row).map(Some)
    }

    fn list(&self, filter: TipFilter) -> Result<Vec<PythonTip>, TipError> {
        let mut sql = "SELECT id, title, content, code_example, category_id, difficulty, \
             xp_reward, is_active, created_at, updated_at FROM python_tips"
            .to_string();
        let mut clauses = Vec::new();
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(category_id) = &filter.category_id {
            clauses.push(format!("category_id = ?{}", params.len() + 1));
            params.push(category_id.as_str().to_string().into());
        }
        if let Some(is_active) = filter.is_active {
            clauses.push(format!("is_active = ?{}", params.len() + 1));
            params.push(i64::from(is_active).into());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY title ASC");

        let mut stmt = self.conn.prepare(&sql).map_err(invalid_input)?;
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .map_err(invalid_input)?;
        let mut tips = Vec::new();
        while let Some(row) = rows.next().map_err(invalid_input)? {
            tips.push(map_tip_row(row)?);
        }
        Ok(tips)
    }

    fn update(&self, id: &TipId, input: UpdateTipInput) -> Result<PythonTip, TipError> {
        let mut tip = self.get(id)?.ok_or(TipError::NotFound)?;
        if let Some(content) = input.content {
            tip.content = content;
        }
        if let Some(code_example) = input.code_example {
            tip.code_example = Some(code_example);
        }
        if let Some(category_id) = input.category_id {
            tip.category_id = category_id;
        }
        if let Some(difficulty) = input.difficulty {
            tip.difficulty = difficulty;
        }
        if let Some(xp_reward) = input.xp_reward {
            tip.xp_reward = xp_reward;
        }
        if let Some(is_active) = input.is_active {
            tip.is_active = is_active;
        }
        tip.updated_at = Utc::now();

        let sql = "UPDATE python_tips SET content = ?1, code_example = ?2, category_id = ?3, \
             difficulty = ?4, xp_reward = ?5, is_active = ?6, updated_at = ?7 WHERE id = ?8";
        let params = (
            tip.content.clone(),
            tip.code_example.clone(),
            tip.category_id.as_str(),
            encode_enum(&tip.difficulty).map_err(invalid_input)?,
            tip.xp_reward,
            tip.is_active,
            to_rfc3339(&tip.updated_at),
            tip.id.as_str(),
        );
        self.conn.execute(sql, params).map_err(invalid_input)?;
        Ok(tip)
    }

    fn delete(&self, id: &TipId) -> Result<(), TipError> {
        let affected = self
            .conn
            .execute("DELETE FROM python_tips WHERE id = ?1", [id.as_str()])
            .map_err(invalid_input)?;
        if affected == 0 {
            return Err(TipError::NotFound);
        }
        Ok(())
    }

    fn count_for_category(&self, category_id: &CategoryId) -> Result<u64, TipError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM python_tips WHERE category_id = ?1",
                [category_id.as_str()],
                |row| row.get(0),
            )
            .map_err(invalid_input)?;
        Ok(count as u64)
    }

    fn upsert(&self, input: CreateTipInput) -> Result<(PythonTip, UpsertOutcome), TipError> {
        if let Some(existing) = self.get_by_title(&input.title)? {
            let updated = self.update(
                &existing.id,
                UpdateTipInput {
                    content: Some(input.content),
                    code_example: input.code_example,
                    category_id: Some(input.category_id),
                    difficulty: Some(input.difficulty),
                    xp_reward: Some(input.xp_reward),
                    is_active: input.is_active,
                },
            )?;
            return Ok((updated, UpsertOutcome::Updated));
        }
        let tip = self.create(input)?;
        Ok((tip, UpsertOutcome::Inserted))
    }
}

fn invalid_input<E: std::fmt::Display>(err: E) -> TipError {
    TipError::InvalidInput {
        message: err.to_string(),
    }
}

fn new_tip_id() -> Result<TipId, TipError> {
    let value = format!("{}{}", TipId::PREFIX, Ulid::new());
    TipId::new(value).map_err(invalid_input)
}

fn map_tip_row(row: &rusqlite::Row<'_>) -> Result<PythonTip, TipError> {
    let id: String = row.get(0).map_err(invalid_input)?;
    let title: String = row.get(1).map_err(invalid_input)?;
    let content: String = row.get(2).map_err(invalid_input)?;
    let code_example: Option<String> = row.get(3).map_err(invalid_input)?;
    let category_id: String = row.get(4).map_err(invalid_input)?;
    let difficulty: String = row.get(5).map_err(invalid_input)?;
    let xp_reward: u32 = row.get(6).map_err(invalid_input)?;
    let is_active: bool = row.get(7).map_err(invalid_input)?;
    let created_at: String = row.get(8).map_err(invalid_input)?;
    let updated_at: String = row.get(9).map_err(invalid_input)?;

    Ok(PythonTip {
        id: TipId::from_str(&id).map_err(invalid_input)?,
        title,
        content,
        code_example,
        category_id: CategoryId::from_str(&category_id).map_err(invalid_input)?,
        difficulty: decode_enum(&difficulty).map_err(invalid_input)?,
        xp_reward,
        is_active,
        created_at: from_rfc3339(&created_at).map_err(invalid_input)?,
        updated_at: from_rfc3339(&updated_at).map_err(invalid_input)?,
    })
}
