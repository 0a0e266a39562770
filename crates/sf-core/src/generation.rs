use crate::error::QuestError;
use crate::types::enums::Difficulty;
use crate::types::io::NewQuest;
use crate::types::{PlayerId, QuestTemplate};
use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};

/// Half-open UTC day window `[start, end)` containing `now`. Quests
/// generated inside it expire at `end`.
pub fn day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start + Days::new(1);
    (start, end)
}

/// Plans a full board: one quest per difficulty tier, chosen by rotating
/// over that tier's active templates. The rotation index is the UTC day
/// ordinal plus `offset`, so consecutive days (and regenerations, which pass
/// a time-of-day offset) see different quests without any randomness.
pub fn plan_board(
    templates: &[QuestTemplate],
    player_id: &PlayerId,
    now: DateTime<Utc>,
    offset: u64,
) -> Result<Vec<NewQuest>, QuestError> {
    let (_, expires_at) = day_bounds(now);
    let day_ordinal = u64::try_from(now.date_naive().num_days_from_ce()).unwrap_or(0);

    let mut board = Vec::with_capacity(Difficulty::TIERS.len());
    for tier in Difficulty::TIERS {
        let pool: Vec<&QuestTemplate> = templates
            .iter()
            .filter(|template| template.is_active && template.difficulty == tier)
            .collect();
        if pool.is_empty() {
            return Err(QuestError::NoActiveTemplates {
                difficulty: format!("{tier:?}"),
            });
        }
        let index = usize::try_from((day_ordinal + offset) % pool.len() as u64).unwrap_or(0);
        let template = pool[index];
        board.push(NewQuest {
            player_id: player_id.clone(),
            template_id: Some(template.id.clone()),
            name: template.name.clone(),
            description: template.description.clone(),
            category: template.category.clone(),
            difficulty: template.difficulty,
            target_value: template.target_value,
            reward_diamonds: template.reward_diamonds,
            reward_xp: template.reward_xp,
            expires_at,
        });
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ids::TemplateId;
    use chrono::TimeZone;
    use std::str::FromStr;
    use ulid::Ulid;

    fn template(name: &str, difficulty: Difficulty) -> QuestTemplate {
        let now = Utc::now();
        QuestTemplate {
            id: TemplateId::from_str(&format!("qt_{}", Ulid::new())).unwrap(),
            name: name.to_string(),
            description: format!("{name} description"),
            category: "practice".to_string(),
            difficulty,
            target_value: 3,
            reward_diamonds: 25,
            reward_xp: 50,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn player() -> PlayerId {
        PlayerId::from_str(&format!("usr_{}", Ulid::nil())).unwrap()
    }

    fn full_pool() -> Vec<QuestTemplate> {
        vec![
            template("easy-a", Difficulty::Easy),
            template("easy-b", Difficulty::Easy),
            template("medium-a", Difficulty::Medium),
            template("hard-a", Difficulty::Hard),
        ]
    }

    #[test]
    fn day_window_is_midnight_to_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let (start, end) = day_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn board_has_one_quest_per_tier_expiring_at_day_end() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 0, 0).unwrap();
        let board = plan_board(&full_pool(), &player(), now, 0).unwrap();
        assert_eq!(board.len(), 3);
        let difficulties: Vec<_> = board.iter().map(|quest| quest.difficulty).collect();
        assert_eq!(difficulties, Difficulty::TIERS.to_vec());
        for quest in &board {
            assert_eq!(
                quest.expires_at,
                Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap()
            );
        }
    }

    #[test]
    fn same_day_same_offset_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 3, 14, 21, 0, 0).unwrap();
        let pool = full_pool();
        let a = plan_board(&pool, &player(), now, 0).unwrap();
        let b = plan_board(&pool, &player(), later, 0).unwrap();
        let names = |board: &[NewQuest]| {
            board
                .iter()
                .map(|quest| quest.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn consecutive_days_rotate_within_a_tier() {
        let today = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let tomorrow = Utc.with_ymd_and_hms(2026, 3, 15, 9, 0, 0).unwrap();
        let pool = full_pool();
        let a = plan_board(&pool, &player(), today, 0).unwrap();
        let b = plan_board(&pool, &player(), tomorrow, 0).unwrap();
        // Two easy templates, so the easy slot must alternate.
        assert_ne!(a[0].name, b[0].name);
    }

    #[test]
    fn offset_shifts_the_rotation() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let pool = full_pool();
        let a = plan_board(&pool, &player(), now, 0).unwrap();
        let b = plan_board(&pool, &player(), now, 1).unwrap();
        assert_ne!(a[0].name, b[0].name);
    }

    #[test]
    fn missing_tier_is_an_error() {
        let pool = vec![template("easy-a", Difficulty::Easy)];
        let err = plan_board(&pool, &player(), Utc::now(), 0).unwrap_err();
        assert!(matches!(err, QuestError::NoActiveTemplates { .. }));
    }

    #[test]
    fn inactive_templates_are_skipped() {
        let mut pool = full_pool();
        for template in &mut pool {
            if template.difficulty == Difficulty::Hard {
                template.is_active = false;
            }
        }
        let err = plan_board(&pool, &player(), Utc::now(), 0).unwrap_err();
        assert!(matches!(err, QuestError::NoActiveTemplates { .. }));
    }
}
