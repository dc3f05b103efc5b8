//! Shared service input types with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use doclib_core::error::AppError;
use doclib_core::result::AppResult;
use doclib_entity::file::TranslationInput;

/// Caller-supplied translation content.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TranslationPayload {
    /// Language code (e.g. `"ru"`, `"en"`).
    #[validate(length(min = 2, max = 8, message = "Language code must be 2-8 characters"))]
    pub lang: String,
    /// Display title.
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
}

impl TranslationPayload {
    /// Convert into the persistence-layer input type.
    pub fn into_input(self) -> TranslationInput {
        TranslationInput {
            lang: self.lang,
            title: self.title,
            description: self.description,
        }
    }
}

/// Run derive-based validation and map failures into the error taxonomy.
pub(crate) fn check<T: Validate>(input: &T) -> AppResult<()> {
    input
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))
}

/// Validate and convert a translation set.
pub(crate) fn translation_inputs(
    payloads: Vec<TranslationPayload>,
) -> AppResult<Vec<TranslationInput>> {
    if payloads.is_empty() {
        return Err(AppError::validation(
            "At least one translation is required",
        ));
    }
    for payload in &payloads {
        check(payload)?;
    }
    Ok(payloads.into_iter().map(TranslationPayload::into_input).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_title_rejected() {
        let payload = TranslationPayload {
            lang: "en".to_string(),
            title: String::new(),
            description: None,
        };
        assert!(check(&payload).is_err());
    }

    #[test]
    fn test_empty_translation_set_rejected() {
        assert!(translation_inputs(Vec::new()).is_err());
    }

    #[test]
    fn test_valid_translation_converts() {
        let inputs = translation_inputs(vec![TranslationPayload {
            lang: "ru".to_string(),
            title: "Паспорт изделия".to_string(),
            description: Some("Основной документ".to_string()),
        }])
        .unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].lang, "ru");
    }
}
