use chrono::{Duration, Utc};
use sf_core::error::{CategoryError, QuestError, SkillForgeError};
use sf_core::quests::QuestRepository;
use sf_core::store::Store;
use sf_core::types::enums::Difficulty;
use sf_core::types::io::{
    CategoryFilter, ClaimInput, CreateCategoryInput, CreateTipInput, NewQuest, NewTemplate,
    ProgressInput, RegenerateInput, UpsertOutcome,
};
use sf_core::types::{DailyQuest, Player};
use sf_core::{RequestContext, SkillForge};
use sf_db::schema::with_test_db;
use sf_db::store::DbStore;
use sf_events::bus::EventBus;
use sf_events::types::EventSource;

fn forge() -> SkillForge<DbStore> {
    let conn = with_test_db().expect("in-memory db");
    SkillForge::new(DbStore::new(conn), EventBus::new(16))
}

fn ctx() -> RequestContext {
    RequestContext::new(EventSource::Cli, None)
}

fn template(name: &str, difficulty: Difficulty, target: u32) -> NewTemplate {
    NewTemplate {
        name: name.to_string(),
        description: format!("{name} description"),
        category: "practice".to_string(),
        difficulty,
        target_value: target,
        reward_diamonds: 25,
        reward_xp: 50,
        is_active: true,
    }
}

fn seed_templates(forge: &SkillForge<DbStore>) {
    for input in [
        template("solve-three", Difficulty::Easy, 3),
        template("read-two-tips", Difficulty::Easy, 2),
        template("finish-a-quiz", Difficulty::Medium, 1),
        template("clear-a-challenge", Difficulty::Hard, 1),
    ] {
        forge.quests().upsert_template(input).expect("template");
    }
}

fn register(forge: &SkillForge<DbStore>, name: &str) -> Player {
    forge
        .players()
        .register(
            &ctx(),
            sf_core::types::io::CreatePlayerInput {
                display_name: name.to_string(),
            },
        )
        .expect("player")
}

fn easy_quest(board: &[DailyQuest]) -> DailyQuest {
    board
        .iter()
        .find(|quest| quest.difficulty == Difficulty::Easy)
        .cloned()
        .expect("easy quest on board")
}

fn claimed_implies_completed(board: &[DailyQuest]) -> bool {
    board.iter().all(|quest| !quest.is_claimed || quest.is_completed)
}

#[test]
fn board_generates_once_and_stays_stable() {
    let forge = forge();
    seed_templates(&forge);
    let player = register(&forge, "ada");

    let first = forge.quests().board(&ctx(), &player.id).expect("board");
    assert_eq!(first.len(), 3);
    let second = forge.quests().board(&ctx(), &player.id).expect("board");
    assert_eq!(first, second);
}

#[test]
fn claim_scenario_credits_once() {
    let forge = forge();
    seed_templates(&forge);
    let player = register(&forge, "ada");
    let board = forge.quests().board(&ctx(), &player.id).expect("board");
    let quest = easy_quest(&board);

    // Reach the target, then claim.
    let updated = forge
        .quests()
        .progress(
            &ctx(),
            &quest.id,
            ProgressInput {
                player_id: player.id.clone(),
                amount: Some(quest.target_value),
            },
        )
        .expect("progress");
    assert!(updated.is_completed);

    let receipt = forge
        .quests()
        .claim(
            &ctx(),
            &quest.id,
            ClaimInput {
                player_id: player.id.clone(),
            },
        )
        .expect("claim");
    assert_eq!(receipt.diamonds_granted, quest.reward_diamonds);
    assert_eq!(receipt.xp_granted, quest.reward_xp);

    let after = forge.players().get(&player.id).expect("player");
    assert_eq!(after.diamonds, quest.reward_diamonds);
    assert_eq!(after.xp, quest.reward_xp);

    // Second claim fails and never double-credits.
    let err = forge
        .quests()
        .claim(
            &ctx(),
            &quest.id,
            ClaimInput {
                player_id: player.id.clone(),
            },
        )
        .expect_err("double claim");
    assert!(matches!(
        err,
        SkillForgeError::Quest(QuestError::AlreadyClaimed)
    ));
    let unchanged = forge.players().get(&player.id).expect("player");
    assert_eq!(unchanged.diamonds, after.diamonds);
    assert_eq!(unchanged.xp, after.xp);

    let board = forge.quests().board(&ctx(), &player.id).expect("board");
    assert!(claimed_implies_completed(&board));

    let events = forge.events().list(None, None).expect("events");
    let claimed = events
        .iter()
        .filter(|event| event.body.get("type").and_then(|v| v.as_str()) == Some("QuestClaimed"))
        .count();
    assert_eq!(claimed, 1);
}

#[test]
fn claim_before_completion_fails() {
    let forge = forge();
    seed_templates(&forge);
    let player = register(&forge, "ada");
    let board = forge.quests().board(&ctx(), &player.id).expect("board");
    let quest = easy_quest(&board);

    let err = forge
        .quests()
        .claim(
            &ctx(),
            &quest.id,
            ClaimInput {
                player_id: player.id.clone(),
            },
        )
        .expect_err("claim before completion");
    assert!(matches!(
        err,
        SkillForgeError::Quest(QuestError::NotCompleted)
    ));
    let player = forge.players().get(&player.id).expect("player");
    assert_eq!(player.diamonds, 0);
}

#[test]
fn expired_quests_are_inert() {
    let forge = forge();
    seed_templates(&forge);
    let player = register(&forge, "ada");

    // Insert an already-expired quest directly through the store.
    let expired = forge
        .store()
        .quests()
        .create(NewQuest {
            player_id: player.id.clone(),
            template_id: None,
            name: "stale".to_string(),
            description: "expired yesterday".to_string(),
            category: "practice".to_string(),
            difficulty: Difficulty::Easy,
            target_value: 1,
            reward_diamonds: 10,
            reward_xp: 10,
            expires_at: Utc::now() - Duration::hours(1),
        })
        .expect("insert");

    let err = forge
        .quests()
        .progress(
            &ctx(),
            &expired.id,
            ProgressInput {
                player_id: player.id.clone(),
                amount: Some(1),
            },
        )
        .expect_err("progress on expired");
    assert!(matches!(err, SkillForgeError::Quest(QuestError::Expired)));

    let err = forge
        .quests()
        .claim(
            &ctx(),
            &expired.id,
            ClaimInput {
                player_id: player.id.clone(),
            },
        )
        .expect_err("claim on expired");
    assert!(matches!(err, SkillForgeError::Quest(QuestError::Expired)));
}

#[test]
fn progress_clamps_at_target_and_is_noop_once_claimed() {
    let forge = forge();
    seed_templates(&forge);
    let player = register(&forge, "ada");
    let board = forge.quests().board(&ctx(), &player.id).expect("board");
    let quest = easy_quest(&board);

    let updated = forge
        .quests()
        .progress(
            &ctx(),
            &quest.id,
            ProgressInput {
                player_id: player.id.clone(),
                amount: Some(quest.target_value + 100),
            },
        )
        .expect("progress");
    assert_eq!(updated.progress, quest.target_value);
    assert!(updated.is_completed);

    forge
        .quests()
        .claim(
            &ctx(),
            &quest.id,
            ClaimInput {
                player_id: player.id.clone(),
            },
        )
        .expect("claim");

    // Settled quests absorb further progress reports without change.
    let after = forge
        .quests()
        .progress(
            &ctx(),
            &quest.id,
            ProgressInput {
                player_id: player.id.clone(),
                amount: Some(1),
            },
        )
        .expect("noop progress");
    assert!(after.is_claimed);
    assert_eq!(after.progress, quest.target_value);
}

#[test]
fn foreign_players_cannot_see_or_claim_quests() {
    let forge = forge();
    seed_templates(&forge);
    let owner = register(&forge, "ada");
    let other = register(&forge, "grace");
    let board = forge.quests().board(&ctx(), &owner.id).expect("board");
    let quest = easy_quest(&board);

    let err = forge
        .quests()
        .claim(
            &ctx(),
            &quest.id,
            ClaimInput {
                player_id: other.id.clone(),
            },
        )
        .expect_err("foreign claim");
    assert!(matches!(err, SkillForgeError::Quest(QuestError::NotFound)));
}

#[test]
fn regeneration_replaces_unclaimed_keeps_claimed_and_cools_down() {
    let forge = forge();
    seed_templates(&forge);
    let player = register(&forge, "ada");
    let board = forge.quests().board(&ctx(), &player.id).expect("board");
    let quest = easy_quest(&board);

    forge
        .quests()
        .progress(
            &ctx(),
            &quest.id,
            ProgressInput {
                player_id: player.id.clone(),
                amount: Some(quest.target_value),
            },
        )
        .expect("progress");
    forge
        .quests()
        .claim(
            &ctx(),
            &quest.id,
            ClaimInput {
                player_id: player.id.clone(),
            },
        )
        .expect("claim");

    let fresh = forge
        .quests()
        .regenerate(
            &ctx(),
            RegenerateInput {
                player_id: player.id.clone(),
            },
        )
        .expect("regenerate");
    assert_eq!(fresh.len(), 3);
    assert!(fresh.iter().all(|quest| !quest.is_claimed));

    // The settled quest survives on the board alongside the new set.
    let board = forge.quests().board(&ctx(), &player.id).expect("board");
    assert_eq!(board.len(), 4);
    assert_eq!(board.iter().filter(|quest| quest.is_claimed).count(), 1);

    let err = forge
        .quests()
        .regenerate(
            &ctx(),
            RegenerateInput {
                player_id: player.id.clone(),
            },
        )
        .expect_err("second regenerate inside cooldown");
    assert!(matches!(
        err,
        SkillForgeError::Quest(QuestError::RegenerateCooldown { .. })
    ));
}

#[test]
fn seed_upserts_are_idempotent() {
    let forge = forge();
    let input = CreateCategoryInput {
        name: "Loops".to_string(),
        slug: "loops".to_string(),
        description: "Iteration patterns".to_string(),
        color: Some("#ffaa00".to_string()),
        is_active: None,
    };

    let (first, outcome) = forge.categories().upsert(input.clone()).expect("upsert");
    assert_eq!(outcome, UpsertOutcome::Inserted);
    let (second, outcome) = forge.categories().upsert(input).expect("upsert again");
    assert_eq!(outcome, UpsertOutcome::Updated);
    assert_eq!(first.id, second.id);
    assert_eq!(first.slug, second.slug);
    assert_eq!(first.name, second.name);

    let all = forge
        .categories()
        .list(CategoryFilter { is_active: None })
        .expect("list");
    assert_eq!(all.len(), 1);
}

#[test]
fn category_with_tips_cannot_be_deleted() {
    let forge = forge();
    let category = forge
        .categories()
        .create(
            &ctx(),
            CreateCategoryInput {
                name: "Loops".to_string(),
                slug: "loops".to_string(),
                description: "Iteration patterns".to_string(),
                color: None,
                is_active: None,
            },
        )
        .expect("category");
    let tip = forge
        .tips()
        .create(
            &ctx(),
            CreateTipInput {
                title: "enumerate over range(len())".to_string(),
                content: "Prefer enumerate(xs) to range(len(xs)).".to_string(),
                code_example: Some("for i, x in enumerate(xs): ...".to_string()),
                category_id: category.id.clone(),
                difficulty: Difficulty::Easy,
                xp_reward: 10,
                is_active: None,
            },
        )
        .expect("tip");

    let err = forge
        .categories()
        .delete(&ctx(), &category.id)
        .expect_err("delete with tips");
    assert!(matches!(
        err,
        SkillForgeError::Category(CategoryError::HasTips)
    ));

    forge.tips().delete(&ctx(), &tip.id).expect("delete tip");
    forge
        .categories()
        .delete(&ctx(), &category.id)
        .expect("delete empty category");
}
