use crate::catalog::{ActivityRepository, CategoryRepository, PackageRepository, TipRepository};
use crate::error::{
    ActivityError, CategoryError, PackageError, PlayerError, QuestError, SkillForgeError, TipError,
};
use crate::events::EventRepository;
use crate::generation::{day_bounds, plan_board};
use crate::players::PlayerRepository;
use crate::quests::{QuestRepository, TemplateRepository};
use crate::store::Store;
use crate::types::event::EventBody;
use crate::types::io::{
    ActivityFilter, CategoryFilter, ClaimInput, CreateActivityInput, CreateCategoryInput,
    CreatePackageInput, CreatePlayerInput, CreateTipInput, NewTemplate, PackageFilter,
    ProgressInput, RegenerateInput, TipFilter, UpdateActivityInput, UpdateCategoryInput,
    UpdatePackageInput, UpdateTipInput, UpsertOutcome,
};
use crate::types::{
    ActivityId, Category, CategoryId, ClaimReceipt, DailyQuest, DiamondPackage, LearningActivity,
    PackageId, Player, PlayerId, PythonTip, QuestId, QuestTemplate, TipId,
};
use crate::validation::{
    validate_claim, validate_display_name, validate_progress_amount, validate_slug,
    validate_target_value,
};
use chrono::{Duration, Timelike, Utc};
use sf_events::bus::EventBus;
use sf_events::types::{EventRecord, EventSource};

const REGENERATE_COOLDOWN_SECS: i64 = 3600;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub source: EventSource,
    pub correlation_id: Option<String>,
}

impl RequestContext {
    pub fn new(source: EventSource, correlation_id: Option<String>) -> Self {
        Self {
            source,
            correlation_id,
        }
    }
}

pub struct SkillForge<S: Store> {
    store: S,
    event_bus: EventBus,
}

impl<S: Store> SkillForge<S> {
    pub fn new(store: S, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    pub fn quests(&self) -> QuestsApi<'_, S> {
        QuestsApi { core: self }
    }

    pub fn players(&self) -> PlayersApi<'_, S> {
        PlayersApi { core: self }
    }

    pub fn categories(&self) -> CategoriesApi<'_, S> {
        CategoriesApi { core: self }
    }

    pub fn tips(&self) -> TipsApi<'_, S> {
        TipsApi { core: self }
    }

    pub fn packages(&self) -> PackagesApi<'_, S> {
        PackagesApi { core: self }
    }

    pub fn activities(&self) -> ActivitiesApi<'_, S> {
        ActivitiesApi { core: self }
    }

    pub fn events(&self) -> EventsApi<'_, S> {
        EventsApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn with_events<T, F>(&self, ctx: &RequestContext, f: F) -> Result<T, SkillForgeError>
    where
        F: FnOnce(&S) -> Result<(T, Vec<EventBody>), SkillForgeError>,
    {
        let (value, records) = self.store.with_tx(|store| {
            let (value, bodies) = f(store)?;
            let mut records = Vec::new();
            for body in bodies {
                let record = build_event_record(ctx, &body)?;
                let record = store.events().append(record)?;
                records.push(record);
            }
            Ok((value, records))
        })?;
        for record in records {
            let _ = self.event_bus.publish(record);
        }
        Ok(value)
    }
}

fn build_event_record(
    ctx: &RequestContext,
    body: &EventBody,
) -> Result<EventRecord, SkillForgeError> {
    let body = serde_json::to_value(body).map_err(|err| SkillForgeError::Internal {
        message: err.to_string(),
    })?;
    Ok(EventRecord {
        // id and seq are assigned by the journal on append.
        id: String::new(),
        seq: 0,
        at: Utc::now(),
        correlation_id: ctx.correlation_id.clone(),
        source: ctx.source,
        body,
    })
}

pub struct QuestsApi<'a, S: Store> {
    core: &'a SkillForge<S>,
}

impl<'a, S: Store> QuestsApi<'a, S> {
    /// The player's quests for the current UTC day, generating a fresh board
    /// from the active templates when none exist yet.
    pub fn board(
        &self,
        ctx: &RequestContext,
        player_id: &PlayerId,
    ) -> Result<Vec<DailyQuest>, SkillForgeError> {
        let now = Utc::now();
        let (from, to) = day_bounds(now);

        let player = self.core.store.players().get(player_id)?;
        if player.is_none() {
            return Err(SkillForgeError::Player(PlayerError::NotFound));
        }
        let existing = self.core.store.quests().list_window(player_id, from, to)?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        self.core.with_events(ctx, |store| {
            // Re-check under the write lock so two concurrent first fetches
            // cannot both generate.
            let existing = store.quests().list_window(player_id, from, to)?;
            if !existing.is_empty() {
                return Ok((existing, Vec::new()));
            }
            let templates = store.templates().list_active(None)?;
            let planned = plan_board(&templates, player_id, now, 0)?;
            let mut quests = Vec::with_capacity(planned.len());
            for input in planned {
                quests.push(store.quests().create(input)?);
            }
            let events = vec![EventBody::QuestsGenerated {
                player_id: player_id.clone(),
                quests: quests.clone(),
            }];
            Ok((quests, events))
        })
    }

    pub fn get(&self, id: &QuestId) -> Result<Option<DailyQuest>, SkillForgeError> {
        self.core
            .store
            .quests()
            .get(id)
            .map_err(SkillForgeError::from)
    }

    /// One-time claim: flips `is_claimed` with a conditional update and
    /// credits the player's balances in the same transaction.
    pub fn claim(
        &self,
        ctx: &RequestContext,
        id: &QuestId,
        input: ClaimInput,
    ) -> Result<ClaimReceipt, SkillForgeError> {
        let now = Utc::now();
        self.core.with_events(ctx, |store| {
            let quest = store.quests().get(id)?;
            let Some(mut quest) = quest else {
                return Err(SkillForgeError::Quest(QuestError::NotFound));
            };
            validate_claim(&quest, &input.player_id, now)?;

            // The WHERE is_claimed = 0 guard closes the double-claim race
            // even if a second request read the same snapshot.
            let flipped = store.quests().claim(id, now)?;
            if !flipped {
                return Err(SkillForgeError::Quest(QuestError::AlreadyClaimed));
            }
            quest.is_claimed = true;
            quest.claimed_at = Some(now);

            let player = store.players().credit(
                &input.player_id,
                quest.reward_diamonds,
                quest.reward_xp,
            )?;
            let receipt = ClaimReceipt {
                quest_id: quest.id.clone(),
                diamonds_granted: quest.reward_diamonds,
                xp_granted: quest.reward_xp,
                diamonds_total: player.diamonds,
                xp_total: player.xp,
            };
            let events = vec![EventBody::QuestClaimed {
                quest,
                receipt: receipt.clone(),
            }];
            Ok((receipt, events))
        })
    }

    /// Reports externally-tracked progress. Clamps at the target, marks
    /// completion on the crossing increment, and is a no-op on already
    /// claimed quests (the reward is settled).
    pub fn progress(
        &self,
        ctx: &RequestContext,
        id: &QuestId,
        input: ProgressInput,
    ) -> Result<DailyQuest, SkillForgeError> {
        let now = Utc::now();
        let amount = input.amount.unwrap_or(1);
        validate_progress_amount(amount)?;
        self.core.with_events(ctx, |store| {
            let quest = store.quests().get(id)?;
            let Some(quest) = quest else {
                return Err(SkillForgeError::Quest(QuestError::NotFound));
            };
            if quest.player_id != input.player_id {
                return Err(SkillForgeError::Quest(QuestError::NotFound));
            }
            if quest.is_claimed {
                return Ok((quest, Vec::new()));
            }
            if quest.is_expired(now) {
                return Err(SkillForgeError::Quest(QuestError::Expired));
            }

            let progress = quest.progress.saturating_add(amount).min(quest.target_value);
            let completed_now = progress >= quest.target_value && !quest.is_completed;
            let updated =
                store
                    .quests()
                    .set_progress(id, progress, quest.is_completed || completed_now)?;

            let mut events = vec![EventBody::QuestProgressed {
                quest: updated.clone(),
                amount,
            }];
            if completed_now {
                events.push(EventBody::QuestCompleted {
                    quest: updated.clone(),
                });
            }
            Ok((updated, events))
        })
    }

    /// Replaces today's unclaimed quests with a fresh board. Claimed quests
    /// survive as settled history. Guarded by a per-player cooldown.
    pub fn regenerate(
        &self,
        ctx: &RequestContext,
        input: RegenerateInput,
    ) -> Result<Vec<DailyQuest>, SkillForgeError> {
        let now = Utc::now();
        let (from, to) = day_bounds(now);
        self.core.with_events(ctx, |store| {
            let player = store.players().get(&input.player_id)?;
            let Some(player) = player else {
                return Err(SkillForgeError::Player(PlayerError::NotFound));
            };
            if let Some(last) = player.last_regenerated_at {
                let cooldown = Duration::seconds(REGENERATE_COOLDOWN_SECS);
                let elapsed = now - last;
                if elapsed < cooldown {
                    let retry_after_secs = (cooldown - elapsed).num_seconds().max(1);
                    return Err(SkillForgeError::Quest(QuestError::RegenerateCooldown {
                        retry_after_secs,
                    }));
                }
            }

            store
                .quests()
                .delete_unclaimed_window(&input.player_id, from, to)?;
            let templates = store.templates().list_active(None)?;
            // Time-of-day offset: deterministic, and distinct from the
            // morning generation as well as from any earlier regeneration
            // (the cooldown guarantees a different value).
            let offset = u64::from(now.time().num_seconds_from_midnight()).max(1);
            let planned = plan_board(&templates, &input.player_id, now, offset)?;
            let mut quests = Vec::with_capacity(planned.len());
            for quest in planned {
                quests.push(store.quests().create(quest)?);
            }
            store.players().set_last_regenerated(&input.player_id, now)?;

            let events = vec![EventBody::QuestsRegenerated {
                player_id: input.player_id.clone(),
                quests: quests.clone(),
            }];
            Ok((quests, events))
        })
    }

    /// Seed path for quest templates.
    pub fn upsert_template(
        &self,
        input: NewTemplate,
    ) -> Result<(QuestTemplate, UpsertOutcome), SkillForgeError> {
        validate_target_value(input.target_value)?;
        self.core
            .store
            .templates()
            .upsert(input)
            .map_err(SkillForgeError::from)
    }
}

pub struct PlayersApi<'a, S: Store> {
    core: &'a SkillForge<S>,
}

impl<'a, S: Store> PlayersApi<'a, S> {
    pub fn register(
        &self,
        ctx: &RequestContext,
        input: CreatePlayerInput,
    ) -> Result<Player, SkillForgeError> {
        validate_display_name(&input.display_name)?;
        self.core.with_events(ctx, |store| {
            let player = store.players().create(input)?;
            Ok((
                player.clone(),
                vec![EventBody::PlayerRegistered { player }],
            ))
        })
    }

    pub fn get(&self, id: &PlayerId) -> Result<Player, SkillForgeError> {
        let player = self.core.store.players().get(id)?;
        player.ok_or(SkillForgeError::Player(PlayerError::NotFound))
    }
}

pub struct CategoriesApi<'a, S: Store> {
    core: &'a SkillForge<S>,
}

impl<'a, S: Store> CategoriesApi<'a, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreateCategoryInput,
    ) -> Result<Category, SkillForgeError> {
        validate_slug(&input.slug)?;
        self.core.with_events(ctx, |store| {
            if store.categories().get_by_slug(&input.slug)?.is_some() {
                return Err(SkillForgeError::Category(CategoryError::SlugConflict));
            }
            let category = store.categories().create(input)?;
            Ok((
                category.clone(),
                vec![EventBody::CategoryCreated { category }],
            ))
        })
    }

    pub fn get(&self, id: &CategoryId) -> Result<Category, SkillForgeError> {
        let category = self.core.store.categories().get(id)?;
        category.ok_or(SkillForgeError::Category(CategoryError::NotFound))
    }

    pub fn list(&self, filter: CategoryFilter) -> Result<Vec<Category>, SkillForgeError> {
        self.core
            .store
            .categories()
            .list(filter)
            .map_err(SkillForgeError::from)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &CategoryId,
        input: UpdateCategoryInput,
    ) -> Result<Category, SkillForgeError> {
        self.core.with_events(ctx, |store| {
            let category = store.categories().update(id, input)?;
            Ok((
                category.clone(),
                vec![EventBody::CategoryUpdated { category }],
            ))
        })
    }

    /// Rejected while tips still reference the category; the check happens
    /// before any mutation.
    pub fn delete(&self, ctx: &RequestContext, id: &CategoryId) -> Result<(), SkillForgeError> {
        self.core.with_events(ctx, |store| {
            let tips = store
                .tips()
                .count_for_category(id)
                .map_err(|err| SkillForgeError::Internal {
                    message: err.to_string(),
                })?;
            if tips > 0 {
                return Err(SkillForgeError::Category(CategoryError::HasTips));
            }
            store.categories().delete(id)?;
            Ok((
                (),
                vec![EventBody::CategoryDeleted {
                    category_id: id.clone(),
                }],
            ))
        })
    }

    /// Seed path: insert-or-update keyed by slug, no per-item event.
    pub fn upsert(
        &self,
        input: CreateCategoryInput,
    ) -> Result<(Category, UpsertOutcome), SkillForgeError> {
        validate_slug(&input.slug)?;
        self.core
            .store
            .categories()
            .upsert(input)
            .map_err(SkillForgeError::from)
    }
}

pub struct TipsApi<'a, S: Store> {
    core: &'a SkillForge<S>,
}

impl<'a, S: Store> TipsApi<'a, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreateTipInput,
    ) -> Result<PythonTip, SkillForgeError> {
        self.core.with_events(ctx, |store| {
            ensure_category_exists(store, &input.category_id)?;
            let tip = store.tips().create(input)?;
            Ok((tip.clone(), vec![EventBody::TipCreated { tip }]))
        })
    }

    pub fn get(&self, id: &TipId) -> Result<PythonTip, SkillForgeError> {
        let tip = self.core.store.tips().get(id)?;
        tip.ok_or(SkillForgeError::Tip(TipError::NotFound))
    }

    pub fn list(&self, filter: TipFilter) -> Result<Vec<PythonTip>, SkillForgeError> {
        self.core
            .store
            .tips()
            .list(filter)
            .map_err(SkillForgeError::from)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &TipId,
        input: UpdateTipInput,
    ) -> Result<PythonTip, SkillForgeError> {
        self.core.with_events(ctx, |store| {
            if let Some(category_id) = &input.category_id {
                ensure_category_exists(store, category_id)?;
            }
            let tip = store.tips().update(id, input)?;
            Ok((tip.clone(), vec![EventBody::TipUpdated { tip }]))
        })
    }

    pub fn delete(&self, ctx: &RequestContext, id: &TipId) -> Result<(), SkillForgeError> {
        self.core.with_events(ctx, |store| {
            store.tips().delete(id)?;
            Ok(((), vec![EventBody::TipDeleted { tip_id: id.clone() }]))
        })
    }

    /// Seed path: insert-or-update keyed by title, no per-item event.
    pub fn upsert(
        &self,
        input: CreateTipInput,
    ) -> Result<(PythonTip, UpsertOutcome), SkillForgeError> {
        ensure_category_exists(&self.core.store, &input.category_id)?;
        self.core
            .store
            .tips()
            .upsert(input)
            .map_err(SkillForgeError::from)
    }
}

fn ensure_category_exists<S: Store>(
    store: &S,
    category_id: &CategoryId,
) -> Result<(), SkillForgeError> {
    let category = store
        .categories()
        .get(category_id)
        .map_err(|err| SkillForgeError::Internal {
            message: err.to_string(),
        })?;
    if category.is_none() {
        return Err(SkillForgeError::Tip(TipError::CategoryNotFound));
    }
    Ok(())
}

pub struct PackagesApi<'a, S: Store> {
    core: &'a SkillForge<S>,
}

impl<'a, S: Store> PackagesApi<'a, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreatePackageInput,
    ) -> Result<DiamondPackage, SkillForgeError> {
        self.core.with_events(ctx, |store| {
            let package = store.packages().create(input)?;
            Ok((
                package.clone(),
                vec![EventBody::PackageCreated { package }],
            ))
        })
    }

    pub fn get(&self, id: &PackageId) -> Result<DiamondPackage, SkillForgeError> {
        let package = self.core.store.packages().get(id)?;
        package.ok_or(SkillForgeError::Package(PackageError::NotFound))
    }

    pub fn list(&self, filter: PackageFilter) -> Result<Vec<DiamondPackage>, SkillForgeError> {
        self.core
            .store
            .packages()
            .list(filter)
            .map_err(SkillForgeError::from)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &PackageId,
        input: UpdatePackageInput,
    ) -> Result<DiamondPackage, SkillForgeError> {
        self.core.with_events(ctx, |store| {
            let package = store.packages().update(id, input)?;
            Ok((
                package.clone(),
                vec![EventBody::PackageUpdated { package }],
            ))
        })
    }

    pub fn delete(&self, ctx: &RequestContext, id: &PackageId) -> Result<(), SkillForgeError> {
        self.core.with_events(ctx, |store| {
            store.packages().delete(id)?;
            Ok((
                (),
                vec![EventBody::PackageDeleted {
                    package_id: id.clone(),
                }],
            ))
        })
    }

    /// Seed path: insert-or-update keyed by name, no per-item event.
    pub fn upsert(
        &self,
        input: CreatePackageInput,
    ) -> Result<(DiamondPackage, UpsertOutcome), SkillForgeError> {
        self.core
            .store
            .packages()
            .upsert(input)
            .map_err(SkillForgeError::from)
    }
}

pub struct ActivitiesApi<'a, S: Store> {
    core: &'a SkillForge<S>,
}

impl<'a, S: Store> ActivitiesApi<'a, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreateActivityInput,
    ) -> Result<LearningActivity, SkillForgeError> {
        self.core.with_events(ctx, |store| {
            let activity = store.activities().create(input)?;
            Ok((
                activity.clone(),
                vec![EventBody::ActivityCreated { activity }],
            ))
        })
    }

    pub fn get(&self, id: &ActivityId) -> Result<LearningActivity, SkillForgeError> {
        let activity = self.core.store.activities().get(id)?;
        activity.ok_or(SkillForgeError::Activity(ActivityError::NotFound))
    }

    pub fn list(&self, filter: ActivityFilter) -> Result<Vec<LearningActivity>, SkillForgeError> {
        self.core
            .store
            .activities()
            .list(filter)
            .map_err(SkillForgeError::from)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &ActivityId,
        input: UpdateActivityInput,
    ) -> Result<LearningActivity, SkillForgeError> {
        self.core.with_events(ctx, |store| {
            let activity = store.activities().update(id, input)?;
            Ok((
                activity.clone(),
                vec![EventBody::ActivityUpdated { activity }],
            ))
        })
    }

    pub fn delete(&self, ctx: &RequestContext, id: &ActivityId) -> Result<(), SkillForgeError> {
        self.core.with_events(ctx, |store| {
            store.activities().delete(id)?;
            Ok((
                (),
                vec![EventBody::ActivityDeleted {
                    activity_id: id.clone(),
                }],
            ))
        })
    }

    /// Seed path: insert-or-update keyed by (title, kind), no per-item event.
    pub fn upsert(
        &self,
        input: CreateActivityInput,
    ) -> Result<(LearningActivity, UpsertOutcome), SkillForgeError> {
        self.core
            .store
            .activities()
            .upsert(input)
            .map_err(SkillForgeError::from)
    }
}

pub struct EventsApi<'a, S: Store> {
    core: &'a SkillForge<S>,
}

impl<'a, S: Store> EventsApi<'a, S> {
    pub fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, SkillForgeError> {
        self.core.store.events().list(after, limit)
    }

    /// Appends a standalone event (seed summaries and the like).
    pub fn record(&self, ctx: &RequestContext, body: EventBody) -> Result<(), SkillForgeError> {
        self.core.with_events(ctx, |_| Ok(((), vec![body])))
    }
}
