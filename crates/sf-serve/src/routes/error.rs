use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sf_core::error::{
    ActivityError, CategoryError, PackageError, PlayerError, QuestError, SkillForgeError, TipError,
};

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &SkillForgeError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        SkillForgeError::Quest(quest) => map_quest_error(quest),
        SkillForgeError::Player(player) => map_player_error(player),
        SkillForgeError::Category(category) => map_category_error(category),
        SkillForgeError::Tip(tip) => map_tip_error(tip),
        SkillForgeError::Package(package) => map_package_error(package),
        SkillForgeError::Activity(activity) => map_activity_error(activity),
        SkillForgeError::Internal { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            message.clone(),
        ),
    };

    (
        status,
        Json(ErrorEnvelope {
            code,
            message,
            correlation_id,
        }),
    )
}

fn map_quest_error(err: &QuestError) -> (StatusCode, &'static str, String) {
    match err {
        QuestError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        QuestError::AlreadyClaimed => (StatusCode::CONFLICT, "conflict", err.to_string()),
        QuestError::NotCompleted => (
            StatusCode::PRECONDITION_FAILED,
            "precondition_failed",
            err.to_string(),
        ),
        QuestError::Expired => (StatusCode::GONE, "gone", err.to_string()),
        QuestError::RegenerateCooldown { .. } => {
            (StatusCode::TOO_MANY_REQUESTS, "cooldown", err.to_string())
        }
        QuestError::NoActiveTemplates { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_state",
            err.to_string(),
        ),
        QuestError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_player_error(err: &PlayerError) -> (StatusCode, &'static str, String) {
    match err {
        PlayerError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        PlayerError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_category_error(err: &CategoryError) -> (StatusCode, &'static str, String) {
    match err {
        CategoryError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        CategoryError::SlugConflict | CategoryError::HasTips => {
            (StatusCode::CONFLICT, "conflict", err.to_string())
        }
        CategoryError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_tip_error(err: &TipError) -> (StatusCode, &'static str, String) {
    match err {
        TipError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        TipError::TitleConflict => (StatusCode::CONFLICT, "conflict", err.to_string()),
        TipError::CategoryNotFound | TipError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_package_error(err: &PackageError) -> (StatusCode, &'static str, String) {
    match err {
        PackageError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        PackageError::NameConflict => (StatusCode::CONFLICT, "conflict", err.to_string()),
        PackageError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_activity_error(err: &ActivityError) -> (StatusCode, &'static str, String) {
    match err {
        ActivityError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        ActivityError::TitleConflict => (StatusCode::CONFLICT, "conflict", err.to_string()),
        ActivityError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quest_errors_map_to_documented_statuses() {
        let cases = [
            (QuestError::NotFound, StatusCode::NOT_FOUND, "not_found"),
            (QuestError::AlreadyClaimed, StatusCode::CONFLICT, "conflict"),
            (
                QuestError::NotCompleted,
                StatusCode::PRECONDITION_FAILED,
                "precondition_failed",
            ),
            (QuestError::Expired, StatusCode::GONE, "gone"),
            (
                QuestError::RegenerateCooldown {
                    retry_after_secs: 60,
                },
                StatusCode::TOO_MANY_REQUESTS,
                "cooldown",
            ),
        ];
        for (err, status, code) in cases {
            let (mapped_status, body) = map_error(&SkillForgeError::Quest(err), None);
            assert_eq!(mapped_status, status);
            assert_eq!(body.code, code);
        }
    }

    #[test]
    fn conflict_statuses_for_catalog() {
        let (status, body) = map_error(&SkillForgeError::Category(CategoryError::HasTips), None);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "conflict");
        let (status, _) = map_error(&SkillForgeError::Tip(TipError::TitleConflict), None);
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
