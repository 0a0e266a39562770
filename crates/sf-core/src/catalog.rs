use crate::error::{ActivityError, CategoryError, PackageError, TipError};
use crate::types::io::{
    ActivityFilter, CategoryFilter, CreateActivityInput, CreateCategoryInput, CreatePackageInput,
    CreateTipInput, PackageFilter, TipFilter, UpdateActivityInput, UpdateCategoryInput,
    UpdatePackageInput, UpdateTipInput, UpsertOutcome,
};
use crate::types::{
    ActivityId, Category, CategoryId, DiamondPackage, LearningActivity, PackageId, PythonTip, TipId,
};

pub trait CategoryRepository {
    fn create(&self, input: CreateCategoryInput) -> Result<Category, CategoryError>;
    fn get(&self, id: &CategoryId) -> Result<Option<Category>, CategoryError>;
    fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, CategoryError>;
    fn list(&self, filter: CategoryFilter) -> Result<Vec<Category>, CategoryError>;
    fn update(&self, id: &CategoryId, input: UpdateCategoryInput)
        -> Result<Category, CategoryError>;
    fn delete(&self, id: &CategoryId) -> Result<(), CategoryError>;
    /// Seed path: insert-or-update keyed by slug.
    fn upsert(&self, input: CreateCategoryInput) -> Result<(Category, UpsertOutcome), CategoryError>;
}

pub trait TipRepository {
    fn create(&self, input: CreateTipInput) -> Result<PythonTip, TipError>;
    fn get(&self, id: &TipId) -> Result<Option<PythonTip>, TipError>;
    fn list(&self, filter: TipFilter) -> Result<Vec<PythonTip>, TipError>;
    fn update(&self, id: &TipId, input: UpdateTipInput) -> Result<PythonTip, TipError>;
    fn delete(&self, id: &TipId) -> Result<(), TipError>;
    fn count_for_category(&self, category_id: &CategoryId) -> Result<u64, TipError>;
    /// Seed path: insert-or-update keyed by title.
    fn upsert(&self, input: CreateTipInput) -> Result<(PythonTip, UpsertOutcome), TipError>;
}

pub trait PackageRepository {
    fn create(&self, input: CreatePackageInput) -> Result<DiamondPackage, PackageError>;
    fn get(&self, id: &PackageId) -> Result<Option<DiamondPackage>, PackageError>;
    fn list(&self, filter: PackageFilter) -> Result<Vec<DiamondPackage>, PackageError>;
    fn update(
        &self,
        id: &PackageId,
        input: UpdatePackageInput,
    ) -> Result<DiamondPackage, PackageError>;
    fn delete(&self, id: &PackageId) -> Result<(), PackageError>;
    /// Seed path: insert-or-update keyed by name.
    fn upsert(
        &self,
        input: CreatePackageInput,
    ) -> Result<(DiamondPackage, UpsertOutcome), PackageError>;
}

pub trait ActivityRepository {
    fn create(&self, input: CreateActivityInput) -> Result<LearningActivity, ActivityError>;
    fn get(&self, id: &ActivityId) -> Result<Option<LearningActivity>, ActivityError>;
    fn list(&self, filter: ActivityFilter) -> Result<Vec<LearningActivity>, ActivityError>;
    fn update(
        &self,
        id: &ActivityId,
        input: UpdateActivityInput,
    ) -> Result<LearningActivity, ActivityError>;
    fn delete(&self, id: &ActivityId) -> Result<(), ActivityError>;
    /// Seed path: insert-or-update keyed by (title, kind).
    fn upsert(
        &self,
        input: CreateActivityInput,
    ) -> Result<(LearningActivity, UpsertOutcome), ActivityError>;
}
