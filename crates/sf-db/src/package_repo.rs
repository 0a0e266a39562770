use crate::util::{from_rfc3339, is_constraint_violation, to_rfc3339};
use chrono::Utc;
use rusqlite::Connection;
use sf_core::catalog::PackageRepository;
use sf_core::error::PackageError;
use sf_core::types::ids::PackageId;
use sf_core::types::io::{CreatePackageInput, PackageFilter, UpdatePackageInput, UpsertOutcome};
use sf_core::types::DiamondPackage;
use std::str::FromStr;
use ulid::Ulid;

pub struct PackageRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> PackageRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get_by_name(&self, name: &str) -> Result<Option<DiamondPackage>, PackageError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, diamonds, bonus_diamonds, price_cents, sort_order, is_active, \
                 created_at, updated_at FROM diamond_packages WHERE name = ?1",
            )
            .map_err(invalid_input)?;
        let mut rows = stmt.query([name]).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_package_row(row).map(Some)
    }
}

impl<'a> PackageRepository for PackageRepo<'a> {
    fn create(&self, input: CreatePackageInput) -> Result<DiamondPackage, PackageError> {
        let now = Utc::now();
        let package = DiamondPackage {
            id: new_package_id()?,
            name: input.name,
            diamonds: input.diamonds,
            bonus_diamonds: input.bonus_diamonds,
            price_cents: input.price_cents,
            sort_order: input.sort_order,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        let sql = "INSERT INTO diamond_packages (id, name, diamonds, bonus_diamonds, \
             price_cents, sort_order, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
        let params = (
            package.id.as_str(),
            package.name.clone(),
            package.diamonds,
            package.bonus_diamonds,
            package.price_cents,
            package.sort_order,
            package.is_active,
            to_rfc3339(&package.created_at),
            to_rfc3339(&package.updated_at),
        );
        self.conn.execute(sql, params).map_err(|err| {
            if is_constraint_violation(&err) {
                PackageError::NameConflict
            } else {
                invalid_input(err)
            }
        })?;
        Ok(package)
    }

    fn get(&self, id: &PackageId) -> Result<Option<DiamondPackage>, PackageError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, diamonds, bonus_diamonds, price_cents, sort_order, is_active, \
                 created_at, updated_at FROM diamond_packages WHERE id = ?1",
            )
            .map_err(invalid_input)?;
        let mut rows = stmt.query([id.as_str()]).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_package_row(row).map(Some)
    }

    fn list(&self, filter: PackageFilter) -> Result<Vec<DiamondPackage>, PackageError> {
        let mut sql = "SELECT id, name, diamonds, bonus_diamonds, price_cents, sort_order, \
             is_active, created_at, updated_at FROM diamond_packages"
            .to_string();
        if filter.is_active.is_some() {
            sql.push_str(" WHERE is_active = ?1");
        }
        sql.push_str(" ORDER BY sort_order ASC, name ASC");

        let mut stmt = self.conn.prepare(&sql).map_err(invalid_input)?;
        let mut rows = match filter.is_active {
            Some(is_active) => stmt.query([is_active]).map_err(invalid_input)?,
            None => stmt.query([]).map_err(invalid_input)?,
        };
        let mut packages = Vec::new();
        while let Some(row) = rows.next().map_err(invalid_input)? {
            packages.push(map_package_row(row)?);
        }
        Ok(packages)
    }

    fn update(
        &self,
        id: &PackageId,
        input: UpdatePackageInput,
    ) -> Result<DiamondPackage, PackageError> {
        let mut package = self.get(id)?.ok_or(PackageError::NotFound)?;
        if let Some(diamonds) = input.diamonds {
            package.diamonds = diamonds;
        }
        if let Some(bonus_diamonds) = input.bonus_diamonds {
            package.bonus_diamonds = bonus_diamonds;
        }
        if let Some(price_cents) = input.price_cents {
            package.price_cents = price_cents;
        }
        if let Some(sort_order) = input.sort_order {
            package.sort_order = sort_order;
        }
        if let Some(is_active) = input.is_active {
            package.is_active = is_active;
        }
        package.updated_at = Utc::now();

        let sql = "UPDATE diamond_packages SET diamonds = ?1, bonus_diamonds = ?2, \
             price_cents = ?3, sort_order = ?4, is_active = ?5, updated_at = ?6 WHERE id = ?7";
        let params = (
            package.diamonds,
            package.bonus_diamonds,
            package.price_cents,
            package.sort_order,
            package.is_active,
            to_rfc3339(&package.updated_at),
            package.id.as_str(),
        );
        self.conn.execute(sql, params).map_err(invalid_input)?;
        Ok(package)
    }

    fn delete(&self, id: &PackageId) -> Result<(), PackageError> {
        let affected = self
            .conn
            .execute("DELETE FROM diamond_packages WHERE id = ?1", [id.as_str()])
            .map_err(invalid_input)?;
        if affected == 0 {
            return Err(PackageError::NotFound);
        }
        Ok(())
    }

    fn upsert(
        &self,
        input: CreatePackageInput,
    ) -> Result<(DiamondPackage, UpsertOutcome), PackageError> {
        if let Some(existing) = self.get_by_name(&input.name)? {
            let updated = self.update(
                &existing.id,
                UpdatePackageInput {
                    diamonds: Some(input.diamonds),
                    bonus_diamonds: Some(input.bonus_diamonds),
                    price_cents: Some(input.price_cents),
                    sort_order: Some(input.sort_order),
                    is_active: input.is_active,
                },
            )?;
            return Ok((updated, UpsertOutcome::Updated));
        }
        let package = self.create(input)?;
        Ok((package, UpsertOutcome::Inserted))
    }
}

fn invalid_input<E: std::fmt::Display>(err: E) -> PackageError {
    PackageError::InvalidInput {
        message: err.to_string(),
    }
}

fn new_package_id() -> Result<PackageId, PackageError> {
    let value = format!("{}{}", PackageId::PREFIX, Ulid::new());
    PackageId::new(value).map_err(invalid_input)
}

fn map_package_row(row: &rusqlite::Row<'_>) -> Result<DiamondPackage, PackageError> {
    let id: String = row.get(0).map_err(invalid_input)?;
    let name: String = row.get(1).map_err(invalid_input)?;
    let diamonds: u32 = row.get(2).map_err(invalid_input)?;
    let bonus_diamonds: u32 = row.get(3).map_err(invalid_input)?;
    let price_cents: u32 = row.get(4).map_err(invalid_input)?;
    let sort_order: u32 = row.get(5).map_err(invalid_input)?;
    let is_active: bool = row.get(6).map_err(invalid_input)?;
    let created_at: String = row.get(7).map_err(invalid_input)?;
    let updated_at: String = row.get(8).map_err(invalid_input)?;

    Ok(DiamondPackage {
        id: PackageId::from_str(&id).map_err(invalid_input)?,
        name,
        diamonds,
        bonus_diamonds,
        price_cents,
        sort_order,
        is_active,
        created_at: from_rfc3339(&created_at).map_err(invalid_input)?,
        updated_at: from_rfc3339(&updated_at).map_err(invalid_input)?,
    })
}
