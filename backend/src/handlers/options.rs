//! Localized form options

use axum::{extract::Path, Json};
use shared::{options_for, LanguageOptions};

use crate::error::{AppError, AppResult};

/// Dropdown options for one of the supported languages
pub async fn get_options(Path(language): Path<String>) -> AppResult<Json<&'static LanguageOptions>> {
    options_for(&language)
        .map(Json)
        .ok_or(AppError::UnsupportedLanguage(language))
}
