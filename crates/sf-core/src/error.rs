use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuestError {
    #[error("quest not found")]
    NotFound,
    #[error("quest already claimed")]
    AlreadyClaimed,
    #[error("quest not completed")]
    NotCompleted,
    #[error("quest expired")]
    Expired,
    #[error("regeneration on cooldown, retry in {retry_after_secs}s")]
    RegenerateCooldown { retry_after_secs: i64 },
    #[error("no active templates for difficulty {difficulty}")]
    NoActiveTemplates { difficulty: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("player not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("category not found")]
    NotFound,
    #[error("slug already exists")]
    SlugConflict,
    #[error("category has tips")]
    HasTips,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum TipError {
    #[error("tip not found")]
    NotFound,
    #[error("title already exists")]
    TitleConflict,
    #[error("category not found")]
    CategoryNotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("package not found")]
    NotFound,
    #[error("name already exists")]
    NameConflict,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("activity not found")]
    NotFound,
    #[error("title already exists for this kind")]
    TitleConflict,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum SkillForgeError {
    #[error(transparent)]
    Quest(#[from] QuestError),
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Tip(#[from] TipError),
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error(transparent)]
    Activity(#[from] ActivityError),
    #[error("internal error: {message}")]
    Internal { message: String },
}
