use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{AttemptId, CategoryId, GradeId, GroupId, QuestionId, QuizId, UserId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuizAccess {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub total_quizes: u32,
}

/// Question group as shown to participants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionGroup {
    pub id: GroupId,
    pub title: String,
    pub total_questions: u32,
    pub point: f64,
}

/// Attempt still running for the current user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveAttempt {
    pub id: AttemptId,
    pub end_time: DateTime<Utc>,
}

/// Quiz card data returned by `quiz/user-quiz/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserQuiz {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<QuizCategory>,
    pub start_time: DateTime<Utc>,
    /// Minutes
    pub duration: u32,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub questions: u32,
    #[serde(default)]
    pub question_groups: Option<Vec<QuestionGroup>>,
    #[serde(default)]
    pub past_attempts: u32,
    /// Signed on the wire: lowering the attempt limit below the attempts
    /// already taken yields a negative count
    #[serde(default)]
    pub left_attempts: i64,
    #[serde(default)]
    pub active: Option<ActiveAttempt>,
}

impl UserQuiz {
    pub fn has_attempts_left(&self) -> bool {
        self.left_attempts > 0
    }
}

/// Quiz as managed by administrators (`quiz/quiz/`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub start_time: DateTime<Utc>,
    pub duration: u32,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub access: QuizAccess,
    #[serde(default)]
    pub has_random_questions: bool,
    #[serde(default)]
    pub has_random_options: bool,
    #[serde(default)]
    pub grouped_questions: bool,
    pub attempts: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub questions: u32,
    #[serde(default)]
    pub total_participants: u32,
}

/// Request для создания/обновления квиза
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_quiz_window", skip_on_field_errors = false))]
pub struct QuizPayload {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,

    pub start_time: DateTime<Utc>,

    #[validate(range(min = 1, message = "Duration must be at least one minute"))]
    pub duration: u32,

    /// Backend fills `start_time + duration` when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    pub access: QuizAccess,
    pub has_random_questions: bool,
    pub has_random_options: bool,
    pub grouped_questions: bool,

    #[validate(range(min = 1, message = "At least one attempt must be allowed"))]
    pub attempts: u32,

    #[validate(range(min = 1, message = "Quiz needs at least one question"))]
    pub total_questions: u32,
}

fn validate_quiz_window(payload: &QuizPayload) -> Result<(), ValidationError> {
    match payload.end_time {
        Some(end_time) if end_time <= payload.start_time => {
            let mut err = ValidationError::new("quiz_window");
            err.message = Some("end_time must be after start_time".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl From<&Quiz> for QuizPayload {
    fn from(quiz: &Quiz) -> Self {
        Self {
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            category: quiz.category,
            start_time: quiz.start_time,
            duration: quiz.duration,
            end_time: Some(quiz.end_time),
            access: quiz.access,
            has_random_questions: quiz.has_random_questions,
            has_random_options: quiz.has_random_options,
            grouped_questions: quiz.grouped_questions,
            attempts: quiz.attempts,
            total_questions: quiz.total_questions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizCategoryPayload {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Name must be between 1 and 200 characters"
    ))]
    pub name: String,
}

/// Question group as managed by administrators (`quiz/quiz-question-group/`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestionGroup {
    pub id: GroupId,
    pub quiz: QuizId,
    pub title: String,
    /// Question bank category the group draws from
    pub group: CategoryId,
    #[serde(default)]
    pub random_questions: bool,
    #[serde(default)]
    pub random_options: bool,
    pub total_questions: u32,
    pub order_number: u32,
    pub point: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizQuestionGroupPayload {
    pub quiz: QuizId,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    pub group: CategoryId,
    pub random_questions: bool,
    pub random_options: bool,

    #[validate(range(min = 1, message = "Group needs at least one question"))]
    pub total_questions: u32,

    #[validate(range(min = 0.0, message = "Point must not be negative"))]
    pub point: f64,
}

/// Bank question placed into a quiz (`quiz/quiz-question/`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz: QuizId,
    pub question: super::question::Question,
    pub order_number: u32,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizQuestionPayload {
    pub quiz: QuizId,
    pub question: QuestionId,

    #[validate(range(min = 1, message = "Order number starts at 1"))]
    pub order_number: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Body for the swap endpoints: exchange order numbers of two rows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwapRequest {
    pub object1: i64,
    pub object2: i64,
}

/// Bank questions already placed in a quiz and the next free order number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestionIds {
    pub numbers: Vec<QuestionId>,
    pub max_order_number: u32,
}

/// Same field update applied to several quiz questions at once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestionBulkUpdate {
    pub objects: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Row reference for bulk removal of bank questions from a quiz
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuestionRef {
    pub id: QuestionId,
}

/// Participant of a private quiz (`quiz/allowed-user/`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllowedUser {
    pub id: i64,
    pub user: super::user::UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AllowedUserPayload {
    pub quiz: QuizId,
    pub user: UserId,
}

/// Body for the bulk participant and allowed grade endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkIds<T> {
    pub values: Vec<T>,
}

pub type AllowedGrades = BulkIds<GradeId>;
