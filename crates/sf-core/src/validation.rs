use crate::error::{CategoryError, PlayerError, QuestError};
use crate::types::{DailyQuest, PlayerId};
use chrono::{DateTime, Utc};

/// Claim preconditions, checked in precedence order: ownership, the one-way
/// claim flag, expiry, completion. Ownership misses report `NotFound` so
/// quest ids never leak across players.
pub fn validate_claim(
    quest: &DailyQuest,
    player_id: &PlayerId,
    now: DateTime<Utc>,
) -> Result<(), QuestError> {
    if quest.player_id != *player_id {
        return Err(QuestError::NotFound);
    }
    if quest.is_claimed {
        return Err(QuestError::AlreadyClaimed);
    }
    if quest.is_expired(now) {
        return Err(QuestError::Expired);
    }
    if !quest.is_completed {
        return Err(QuestError::NotCompleted);
    }
    Ok(())
}

pub fn validate_progress_amount(amount: u32) -> Result<(), QuestError> {
    if amount == 0 {
        return Err(QuestError::InvalidInput {
            message: "amount must be positive".to_string(),
        });
    }
    Ok(())
}

pub fn validate_target_value(target_value: u32) -> Result<(), QuestError> {
    if target_value == 0 {
        return Err(QuestError::InvalidInput {
            message: "target_value must be positive".to_string(),
        });
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), CategoryError> {
    let valid = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CategoryError::InvalidInput {
            message: format!("invalid slug: {slug}"),
        })
    }
}

pub fn validate_display_name(name: &str) -> Result<(), PlayerError> {
    if name.trim().is_empty() {
        return Err(PlayerError::InvalidInput {
            message: "display_name must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::enums::Difficulty;
    use crate::types::ids::{PlayerId, QuestId};
    use chrono::Duration;
    use std::str::FromStr;
    use ulid::Ulid;

    fn quest(player: &PlayerId, now: DateTime<Utc>) -> DailyQuest {
        DailyQuest {
            id: QuestId::from_str(&format!("quest_{}", Ulid::nil())).unwrap(),
            player_id: player.clone(),
            template_id: None,
            name: "Solve problems".to_string(),
            description: "Solve three problems".to_string(),
            category: "practice".to_string(),
            difficulty: Difficulty::Easy,
            target_value: 3,
            progress: 3,
            is_completed: true,
            is_claimed: false,
            reward_diamonds: 25,
            reward_xp: 50,
            created_at: now,
            expires_at: now + Duration::hours(1),
            claimed_at: None,
        }
    }

    fn player() -> PlayerId {
        PlayerId::from_str(&format!("usr_{}", Ulid::nil())).unwrap()
    }

    #[test]
    fn completed_unclaimed_unexpired_quest_is_claimable() {
        let now = Utc::now();
        let owner = player();
        assert!(validate_claim(&quest(&owner, now), &owner, now).is_ok());
    }

    #[test]
    fn foreign_quest_reports_not_found() {
        let now = Utc::now();
        let other = PlayerId::from_str(&format!("usr_{}", Ulid::new())).unwrap();
        let q = quest(&player(), now);
        assert!(matches!(
            validate_claim(&q, &other, now),
            Err(QuestError::NotFound)
        ));
    }

    #[test]
    fn claimed_wins_over_expired() {
        let now = Utc::now();
        let owner = player();
        let mut q = quest(&owner, now);
        q.is_claimed = true;
        q.claimed_at = Some(now);
        q.expires_at = now - Duration::hours(1);
        assert!(matches!(
            validate_claim(&q, &owner, now),
            Err(QuestError::AlreadyClaimed)
        ));
    }

    #[test]
    fn expired_wins_over_incomplete() {
        let now = Utc::now();
        let owner = player();
        let mut q = quest(&owner, now);
        q.progress = 1;
        q.is_completed = false;
        q.expires_at = now - Duration::seconds(1);
        assert!(matches!(
            validate_claim(&q, &owner, now),
            Err(QuestError::Expired)
        ));
    }

    #[test]
    fn incomplete_quest_is_not_claimable() {
        let now = Utc::now();
        let owner = player();
        let mut q = quest(&owner, now);
        q.progress = 2;
        q.is_completed = false;
        assert!(matches!(
            validate_claim(&q, &owner, now),
            Err(QuestError::NotCompleted)
        ));
    }

    #[test]
    fn slug_rules() {
        assert!(validate_slug("list-comprehensions").is_ok());
        assert!(validate_slug("tier2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Loops").is_err());
        assert!(validate_slug("-loops").is_err());
        assert!(validate_slug("loops-").is_err());
        assert!(validate_slug("lo ops").is_err());
    }

    #[test]
    fn zero_amounts_are_rejected() {
        assert!(validate_progress_amount(0).is_err());
        assert!(validate_progress_amount(1).is_ok());
        assert!(validate_target_value(0).is_err());
    }
}
