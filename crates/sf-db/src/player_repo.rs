use crate::util::{from_rfc3339, to_rfc3339};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use sf_core::error::PlayerError;
use sf_core::players::PlayerRepository;
use sf_core::types::ids::PlayerId;
use sf_core::types::io::CreatePlayerInput;
use sf_core::types::Player;
use std::str::FromStr;
use ulid::Ulid;

pub struct PlayerRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> PlayerRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> PlayerRepository for PlayerRepo<'a> {
    fn create(&self, input: CreatePlayerInput) -> Result<Player, PlayerError> {
        let now = Utc::now();
        let player = Player {
            id: new_player_id()?,
            display_name: input.display_name,
            diamonds: 0,
            xp: 0,
            last_regenerated_at: None,
            created_at: now,
            updated_at: now,
        };
        let sql = "INSERT INTO players (id, display_name, diamonds, xp, last_regenerated_at, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
        let params = (
            player.id.as_str(),
            player.display_name.clone(),
            player.diamonds,
            player.xp,
            Option::<String>::None,
            to_rfc3339(&player.created_at),
            to_rfc3339(&player.updated_at),
        );
        self.conn.execute(sql, params).map_err(invalid_input)?;
        Ok(player)
    }

    fn get(&self, id: &PlayerId) -> Result<Option<Player>, PlayerError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, display_name, diamonds, xp, last_regenerated_at, created_at, \
                 updated_at FROM players WHERE id = ?1",
            )
            .map_err(invalid_input)?;
        let mut rows = stmt.query([id.as_str()]).map_err(invalid_input)?;
        let Some(row) = rows.next().map_err(invalid_input)? else {
            return Ok(None);
        };
        map_player_row(row).map(Some)
    }

    fn credit(&self, id: &PlayerId, diamonds: u32, xp: u32) -> Result<Player, PlayerError> {
        let now = Utc::now();
        let affected = self
            .conn
            .execute(
                "UPDATE players SET diamonds = diamonds + ?1, xp = xp + ?2, updated_at = ?3 \
                 WHERE id = ?4",
                (diamonds, xp, to_rfc3339(&now), id.as_str()),
            )
            .map_err(invalid_input)?;
        if affected == 0 {
            return Err(PlayerError::NotFound);
        }
        self.get(id)?.ok_or(PlayerError::NotFound)
    }

    fn set_last_regenerated(
        &self,
        id: &PlayerId,
        at: DateTime<Utc>,
    ) -> Result<Player, PlayerError> {
        let affected = self
            .conn
            .execute(
                "UPDATE players SET last_regenerated_at = ?1, updated_at = ?2 WHERE id = ?3",
                (to_rfc3339(&at), to_rfc3339(&at), id.as_str()),
            )
            .map_err(invalid_input)?;
        if affected == 0 {
            return Err(PlayerError::NotFound);
        }
        self.get(id)?.ok_or(PlayerError::NotFound)
    }
}

fn invalid_input<E: std::fmt::Display>(err: E) -> PlayerError {
    PlayerError::InvalidInput {
        message: err.to_string(),
    }
}

fn new_player_id() -> Result<PlayerId, PlayerError> {
    let value = format!("{}{}", PlayerId::PREFIX, Ulid::new());
    PlayerId::new(value).map_err(invalid_input)
}

fn map_player_row(row: &rusqlite::Row<'_>) -> Result<Player, PlayerError> {
    let id: String = row.get(0).map_err(invalid_input)?;
    let display_name: String = row.get(1).map_err(invalid_input)?;
    let diamonds: u32 = row.get(2).map_err(invalid_input)?;
    let xp: u32 = row.get(3).map_err(invalid_input)?;
    let last_regenerated_at: Option<String> = row.get(4).map_err(invalid_input)?;
    let created_at: String = row.get(5).map_err(invalid_input)?;
    let updated_at: String = row.get(6).map_err(invalid_input)?;

    Ok(Player {
        id: PlayerId::from_str(&id).map_err(invalid_input)?,
        display_name,
        diamonds,
        xp,
        last_regenerated_at: last_regenerated_at
            .map(|value| from_rfc3339(&value))
            .transpose()
            .map_err(invalid_input)?,
        created_at: from_rfc3339(&created_at).map_err(invalid_input)?,
        updated_at: from_rfc3339(&updated_at).map_err(invalid_input)?,
    })
}
