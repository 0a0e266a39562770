use crate::types::catalog::{Category, DiamondPackage, LearningActivity, PythonTip};
use crate::types::ids::{ActivityId, CategoryId, PackageId, PlayerId, TipId};
use crate::types::player::Player;
use crate::types::quest::{ClaimReceipt, DailyQuest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum EventBody {
    QuestsGenerated {
        player_id: PlayerId,
        quests: Vec<DailyQuest>,
    },
    QuestsRegenerated {
        player_id: PlayerId,
        quests: Vec<DailyQuest>,
    },
    QuestProgressed {
        quest: DailyQuest,
        amount: u32,
    },
    QuestCompleted {
        quest: DailyQuest,
    },
    QuestClaimed {
        quest: DailyQuest,
        receipt: ClaimReceipt,
    },

    PlayerRegistered {
        player: Player,
    },

    CategoryCreated {
        category: Category,
    },
    CategoryUpdated {
        category: Category,
    },
    CategoryDeleted {
        category_id: CategoryId,
    },

    TipCreated {
        tip: PythonTip,
    },
    TipUpdated {
        tip: PythonTip,
    },
    TipDeleted {
        tip_id: TipId,
    },

    PackageCreated {
        package: DiamondPackage,
    },
    PackageUpdated {
        package: DiamondPackage,
    },
    PackageDeleted {
        package_id: PackageId,
    },

    ActivityCreated {
        activity: LearningActivity,
    },
    ActivityUpdated {
        activity: LearningActivity,
    },
    ActivityDeleted {
        activity_id: ActivityId,
    },

    ContentSeeded {
        set: String,
        inserted: u32,
        updated: u32,
        failed: u32,
    },
}
