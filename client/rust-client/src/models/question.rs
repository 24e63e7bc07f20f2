use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{CategoryId, OptionId, QuestionId};

/// Question bank category (`quiz/question-category/`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub total_questions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionCategoryPayload {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Name must be between 1 and 200 characters"
    ))]
    pub name: String,
}

/// Bank question (`quiz/question/`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub category: QuestionCategory,
    #[serde(default)]
    pub body_text: Option<String>,
    /// URL of the uploaded photo
    #[serde(default)]
    pub body_photo: Option<String>,
    pub score: f64,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_question_body"))]
pub struct QuestionPayload {
    pub category_id: CategoryId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,

    /// Base64 data URL, uploaded by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_photo: Option<String>,

    #[validate(range(min = 0.0, message = "Score must not be negative"))]
    pub score: f64,
}

fn validate_question_body(payload: &QuestionPayload) -> Result<(), ValidationError> {
    has_body(&payload.body_text, &payload.body_photo)
}

fn has_body(text: &Option<String>, photo: &Option<String>) -> Result<(), ValidationError> {
    let text_empty = text.as_deref().map(str::trim).unwrap_or_default().is_empty();
    if text_empty && photo.is_none() {
        let mut err = ValidationError::new("empty_body");
        err.message = Some("Either body_text or body_photo is required".into());
        return Err(err);
    }
    Ok(())
}

/// Answer option of a bank question (`quiz/question-options/`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionOption {
    pub id: OptionId,
    pub question: QuestionId,
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub body_photo: Option<String>,
    pub order_number: u32,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_option_body"))]
pub struct QuestionOptionPayload {
    pub question: QuestionId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_photo: Option<String>,

    #[validate(range(min = 1, message = "Order number starts at 1"))]
    pub order_number: u32,

    pub is_correct: bool,
}

fn validate_option_body(payload: &QuestionOptionPayload) -> Result<(), ValidationError> {
    has_body(&payload.body_text, &payload.body_photo)
}
