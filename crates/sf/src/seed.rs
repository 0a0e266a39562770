use crate::SeedSet;
use owo_colors::OwoColorize;
use serde::Deserialize;
use sf_core::types::enums::{ActivityKind, Difficulty};
use sf_core::types::event::EventBody;
use sf_core::types::io::{
    CreateActivityInput, CreateCategoryInput, CreatePackageInput, CreateTipInput, NewTemplate,
    UpsertOutcome,
};
use sf_core::{RequestContext, SkillForge};
use sf_db::store::DbStore;
use sf_events::bus::EventBus;
use sf_events::types::EventSource;

const CATEGORIES_JSON: &str = include_str!("../content/categories.json");
const TIPS_JSON: &str = include_str!("../content/python_tips.json");
const PACKAGES_JSON: &str = include_str!("../content/diamond_packages.json");
const ACTIVITIES_JSON: &str = include_str!("../content/learning_activities.json");
const TEMPLATES_JSON: &str = include_str!("../content/quest_templates.json");

#[derive(Debug, Deserialize)]
struct SeedCategory {
    name: String,
    slug: String,
    description: String,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeedTip {
    title: String,
    content: String,
    code_example: Option<String>,
    category_slug: String,
    difficulty: Difficulty,
    xp_reward: u32,
}

#[derive(Debug, Deserialize)]
struct SeedPackage {
    name: String,
    diamonds: u32,
    bonus_diamonds: u32,
    price_cents: u32,
    sort_order: u32,
}

#[derive(Debug, Deserialize)]
struct SeedActivity {
    title: String,
    kind: ActivityKind,
    description: String,
    content: serde_json::Value,
    difficulty: Difficulty,
    reward_diamonds: u32,
    reward_xp: u32,
    sort_order: u32,
}

#[derive(Debug, Deserialize)]
struct SeedTemplate {
    name: String,
    description: String,
    category: String,
    difficulty: Difficulty,
    target_value: u32,
    reward_diamonds: u32,
    reward_xp: u32,
}

#[derive(Debug, Default)]
struct Summary {
    inserted: u32,
    updated: u32,
    failed: u32,
}

impl Summary {
    fn tally(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }
}

pub fn run(db_path: &str, only: Option<SeedSet>) -> Result<(), String> {
    let conn = sf_db::schema::open_and_migrate(db_path).map_err(|err| err.to_string())?;
    let forge = SkillForge::new(DbStore::new(conn), EventBus::new(16));
    let ctx = RequestContext::new(EventSource::Seed, None);

    let wanted = |set: SeedSet| only.is_none() || only == Some(set);

    // Categories first: tips resolve their category by slug.
    if wanted(SeedSet::Categories) {
        let summary = seed_categories(&forge);
        report(&forge, &ctx, "categories", &summary);
    }
    if wanted(SeedSet::Tips) {
        let summary = seed_tips(&forge);
        report(&forge, &ctx, "python-tips", &summary);
    }
    if wanted(SeedSet::Packages) {
        let summary = seed_packages(&forge);
        report(&forge, &ctx, "diamond-packages", &summary);
    }
    if wanted(SeedSet::Activities) {
        let summary = seed_activities(&forge);
        report(&forge, &ctx, "learning-activities", &summary);
    }
    if wanted(SeedSet::Templates) {
        let summary = seed_templates(&forge);
        report(&forge, &ctx, "quest-templates", &summary);
    }

    Ok(())
}

fn seed_categories(forge: &SkillForge<DbStore>) -> Summary {
    let mut summary = Summary::default();
    let records: Vec<SeedCategory> = match serde_json::from_str(CATEGORIES_JSON) {
        Ok(records) => records,
        Err(err) => {
            tracing::error!(error = %err, "categories content is malformed");
            summary.failed += 1;
            return summary;
        }
    };
    for record in records {
        let slug = record.slug.clone();
        let result = forge.categories().upsert(CreateCategoryInput {
            name: record.name,
            slug: record.slug,
            description: record.description,
            color: record.color,
            is_active: Some(true),
        });
        match result {
            Ok((_, outcome)) => summary.tally(outcome),
            Err(err) => {
                tracing::warn!(slug = %slug, error = %err, "category upsert failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

fn seed_tips(forge: &SkillForge<DbStore>) -> Summary {
    let mut summary = Summary::default();
    let records: Vec<SeedTip> = match serde_json::from_str(TIPS_JSON) {
        Ok(records) => records,
        Err(err) => {
            tracing::error!(error = %err, "python tips content is malformed");
            summary.failed += 1;
            return summary;
        }
    };
    for record in records {
        let title = record.title.clone();
        let result = resolve_category(forge, &record.category_slug).and_then(|category_id| {
            forge.tips().upsert(CreateTipInput {
                title: record.title,
                content: record.content,
                code_example: record.code_example,
                category_id,
                difficulty: record.difficulty,
                xp_reward: record.xp_reward,
                is_active: Some(true),
            })
        });
        match result {
            Ok((_, outcome)) => summary.tally(outcome),
            Err(err) => {
                tracing::warn!(title = %title, error = %err, "tip upsert failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

fn resolve_category(
    forge: &SkillForge<DbStore>,
    slug: &str,
) -> Result<sf_core::types::CategoryId, sf_core::SkillForgeError> {
    use sf_core::catalog::CategoryRepository;
    use sf_core::store::Store;
    let category = forge
        .store()
        .categories()
        .get_by_slug(slug)
        .map_err(sf_core::SkillForgeError::from)?;
    category.map(|category| category.id).ok_or_else(|| {
        sf_core::SkillForgeError::Tip(sf_core::error::TipError::CategoryNotFound)
    })
}

fn seed_packages(forge: &SkillForge<DbStore>) -> Summary {
    let mut summary = Summary::default();
    let records: Vec<SeedPackage> = match serde_json::from_str(PACKAGES_JSON) {
        Ok(records) => records,
        Err(err) => {
            tracing::error!(error = %err, "diamond packages content is malformed");
            summary.failed += 1;
            return summary;
        }
    };
    for record in records {
        let name = record.name.clone();
        let result = forge.packages().upsert(CreatePackageInput {
            name: record.name,
            diamonds: record.diamonds,
            bonus_diamonds: record.bonus_diamonds,
            price_cents: record.price_cents,
            sort_order: record.sort_order,
            is_active: Some(true),
        });
        match result {
            Ok((_, outcome)) => summary.tally(outcome),
            Err(err) => {
                tracing::warn!(name = %name, error = %err, "package upsert failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

fn seed_activities(forge: &SkillForge<DbStore>) -> Summary {
    let mut summary = Summary::default();
    let records: Vec<SeedActivity> = match serde_json::from_str(ACTIVITIES_JSON) {
        Ok(records) => records,
        Err(err) => {
            tracing::error!(error = %err, "learning activities content is malformed");
            summary.failed += 1;
            return summary;
        }
    };
    for record in records {
        let title = record.title.clone();
        let result = forge.activities().upsert(CreateActivityInput {
            title: record.title,
            kind: record.kind,
            description: record.description,
            content: record.content,
            difficulty: record.difficulty,
            reward_diamonds: record.reward_diamonds,
            reward_xp: record.reward_xp,
            sort_order: record.sort_order,
            is_active: Some(true),
        });
        match result {
            Ok((_, outcome)) => summary.tally(outcome),
            Err(err) => {
                tracing::warn!(title = %title, error = %err, "activity upsert failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

fn seed_templates(forge: &SkillForge<DbStore>) -> Summary {
    let mut summary = Summary::default();
    let records: Vec<SeedTemplate> = match serde_json::from_str(TEMPLATES_JSON) {
        Ok(records) => records,
        Err(err) => {
            tracing::error!(error = %err, "quest templates content is malformed");
            summary.failed += 1;
            return summary;
        }
    };
    for record in records {
        let name = record.name.clone();
        let result = forge.quests().upsert_template(NewTemplate {
            name: record.name,
            description: record.description,
            category: record.category,
            difficulty: record.difficulty,
            target_value: record.target_value,
            reward_diamonds: record.reward_diamonds,
            reward_xp: record.reward_xp,
            is_active: true,
        });
        match result {
            Ok((_, outcome)) => summary.tally(outcome),
            Err(err) => {
                tracing::warn!(name = %name, error = %err, "template upsert failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

fn report(forge: &SkillForge<DbStore>, ctx: &RequestContext, set: &str, summary: &Summary) {
    let line = format!(
        "{set}: {} inserted, {} updated, {} failed",
        summary.inserted, summary.updated, summary.failed
    );
    if summary.failed > 0 {
        println!("{}", line.red());
    } else {
        println!("{}", line.green());
    }
    let result = forge.events().record(
        ctx,
        EventBody::ContentSeeded {
            set: set.to_string(),
            inserted: summary.inserted,
            updated: summary.updated,
            failed: summary.failed,
        },
    );
    if let Err(err) = result {
        tracing::warn!(set = %set, error = %err, "seed event append failed");
    }
}
