use crate::error::PlayerError;
use crate::types::io::CreatePlayerInput;
use crate::types::{Player, PlayerId};
use chrono::{DateTime, Utc};

pub trait PlayerRepository {
    fn create(&self, input: CreatePlayerInput) -> Result<Player, PlayerError>;
    fn get(&self, id: &PlayerId) -> Result<Option<Player>, PlayerError>;
    /// Adds to both balances and returns the updated player.
    fn credit(&self, id: &PlayerId, diamonds: u32, xp: u32) -> Result<Player, PlayerError>;
    fn set_last_regenerated(
        &self,
        id: &PlayerId,
        at: DateTime<Utc>,
    ) -> Result<Player, PlayerError>;
}
