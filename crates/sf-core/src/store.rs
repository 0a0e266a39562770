use crate::catalog::{ActivityRepository, CategoryRepository, PackageRepository, TipRepository};
use crate::events::EventRepository;
use crate::players::PlayerRepository;
use crate::quests::{QuestRepository, TemplateRepository};
use crate::SkillForgeError;

pub trait Store {
    type Quests<'a>: QuestRepository
    where
        Self: 'a;
    type Templates<'a>: TemplateRepository
    where
        Self: 'a;
    type Players<'a>: PlayerRepository
    where
        Self: 'a;
    type Categories<'a>: CategoryRepository
    where
        Self: 'a;
    type Tips<'a>: TipRepository
    where
        Self: 'a;
    type Packages<'a>: PackageRepository
    where
        Self: 'a;
    type Activities<'a>: ActivityRepository
    where
        Self: 'a;
    type Events<'a>: EventRepository
    where
        Self: 'a;

    fn quests(&self) -> Self::Quests<'_>;
    fn templates(&self) -> Self::Templates<'_>;
    fn players(&self) -> Self::Players<'_>;
    fn categories(&self) -> Self::Categories<'_>;
    fn tips(&self) -> Self::Tips<'_>;
    fn packages(&self) -> Self::Packages<'_>;
    fn activities(&self) -> Self::Activities<'_>;
    fn events(&self) -> Self::Events<'_>;

    fn with_tx<F, T>(&self, f: F) -> Result<T, SkillForgeError>
    where
        F: FnOnce(&Self) -> Result<T, SkillForgeError>;
}
