use crate::util::{from_rfc3339, is_constraint_violation, to_rfc3339};
use chrono::Utc;
use rusqlite::Connection;
use sf_core::catalog::CategoryRepository;
use sf_core::error::CategoryError;
use sf_core::types::ids::CategoryId;
use sf_core::types::io::{CategoryFilter, CreateCategoryInput, UpdateCategoryInput, UpsertOutcome};
use sf_core::types::Category;
use std::str::FromStr;
use ulid::Ulid;

pub struct CategoryRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> CategoryRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> CategoryRepository for CategoryRepo<'a> {
    fn create(&self, input: CreateCategoryInput) -> Result<Category, CategoryError> {
        let now = Utc::now();
        let category = Category {
            id: new_category_id()?,
            name: input.name,
            slug: input.slug,
            description: input.description,
            color: input.color,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        let sql = "INSERT INTO categories (id, name, slug, description, color, is_active, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
        let params = (
            category.id.as_str(),
            category.name.clone(),
            category.slug.clone(),
            category.description.clone(),
            category.color.clone(),
            category.is_active,
            to_rfc3339(&category.created_at),
            to_rfc3339(&category.updated_at),
        );
        self.conn.execute(sql, params).map_err(|err| {
            if is_constraint_violation(&err) {
                CategoryError::SlugConflict
            } else {
                invalid_input(err)
            }
        })?;
        Ok(category)
    }

    fn get(&self, id: &CategoryId) -> Result<Option<Category>, CategoryError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, slug, description, color, is_active, created_at, updated_at \
                 FROM categories WHERE id = ?1",
            )
            .map_err(invalid_input)?;
        let mut rows = stmt.query([id.as_str()]).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_category_row(row).map(Some)
    }

    fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, CategoryError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, slug, description, color, is_active, created_at, updated_at \
                 FROM categories WHERE slug = ?1",
            )
            .map_err(invalid_input)?;
        let mut rows = stmt.query([slug]).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_category_row(row).map(Some)
    }

    fn list(&self, filter: CategoryFilter) -> Result<Vec<Category>, CategoryError> {
        let mut sql = "SELECT id, name, slug, description, color, is_active, created_at, \
             updated_at FROM categories"
            .to_string();
        if filter.is_active.is_some() {
            sql.push_str(" WHERE is_active = ?1");
        }
        sql.push_str(" ORDER BY name ASC");

        let mut stmt = self.conn.prepare(&sql).map_err(invalid_input)?;
        let mut rows = match filter.is_active {
            Some(is_active) => stmt.query([is_active]).map_err(invalid_input)?,
            None => stmt.query([]).map_err(invalid_input)?,
        };
        let mut categories = Vec::new();
        while let Some(row) = rows.next().map_err(invalid_input)? {
            categories.push(map_category_row(row)?);
        }
        Ok(categories)
    }

    fn update(
        &self,
        id: &CategoryId,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryError> {
        let mut category = self.get(id)?.ok_or(CategoryError::NotFound)?;
        if let Some(name) = input.name {
            category.name = name;
        }
        if let Some(description) = input.description {
            category.description = description;
        }
        if let Some(color) = input.color {
            category.color = Some(color);
        }
        if let Some(is_active) = input.is_active {
            category.is_active = is_active;
        }
        category.updated_at = Utc::now();

        let sql = "UPDATE categories SET name = ?1, description = ?2, color = ?3, \
             is_active = ?4, updated_at = ?5 WHERE id = ?6";
        let params = (
            category.name.clone(),
            category.description.clone(),
            category.color.clone(),
            category.is_active,
            to_rfc3339(&category.updated_at),
            category.id.as_str(),
        );
        self.conn.execute(sql, params).map_err(invalid_input)?;
        Ok(category)
    }

    fn delete(&self, id: &CategoryId) -> Result<(), CategoryError> {
        let affected = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", [id.as_str()])
            .map_err(|err| {
                if is_constraint_violation(&err) {
                    CategoryError::HasTips
                } else {
                    invalid_input(err)
                }
            })?;
        if affected == 0 {
            return Err(CategoryError::NotFound);
        }
        Ok(())
    }

    fn upsert(
        &self,
        input: CreateCategoryInput,
    ) -> Result<(Category, UpsertOutcome), CategoryError> {
        if let Some(existing) = self.get_by_slug(&input.slug)? {
            let updated = self.update(
                &existing.id,
                UpdateCategoryInput {
                    name: Some(input.name),
                    description: Some(input.description),
                    color: input.color,
                    is_active: input.is_active,
                },
            )?;
            return Ok((updated, UpsertOutcome::Updated));
        }
        let category = self.create(input)?;
        Ok((category, UpsertOutcome::Inserted))
    }
}

fn invalid_input<E: std::fmt::Display>(err: E) -> CategoryError {
    CategoryError::InvalidInput {
        message: err.to_string(),
    }
}

fn new_category_id() -> Result<CategoryId, CategoryError> {
    let value = format!("{}{}", CategoryId::PREFIX, Ulid::new());
    CategoryId::new(value).map_err(invalid_input)
}

fn map_category_row(row: &rusqlite::Row<'_>) -> Result<Category, CategoryError> {
    let id: String = row.get(0).map_err(invalid_input)?;
    let name: String = row.get(1).map_err(invalid_input)?;
    let slug: String = row.get(2).map_err(invalid_input)?;
    let description: String = row.get(3).map_err(invalid_input)?;
    let color: Option<String> = row.get(4).map_err(invalid_input)?;
    let is_active: bool = row.get(5).map_err(invalid_input)?;
    let created_at: String = row.get(6).map_err(invalid_input)?;
    let updated_at: String = row.get(7).map_err(invalid_input)?;

    Ok(Category {
        id: CategoryId::from_str(&id).map_err(invalid_input)?,
        name,
        slug,
        description,
        color,
        is_active,
        created_at: from_rfc3339(&created_at).map_err(invalid_input)?,
        updated_at: from_rfc3339(&updated_at).map_err(invalid_input)?,
    })
}
