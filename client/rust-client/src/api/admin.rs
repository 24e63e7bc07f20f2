//! Admin CRUD. Every admin screen is the same list + create/edit/delete
//! cycle over a different endpoint, so one generic API covers them all.

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use super::{ApiClient, ListBody};
use crate::error::ApiError;
use crate::models::page::{ListQuery, Page};
use crate::models::question::{
    Question, QuestionCategory, QuestionCategoryPayload, QuestionOption, QuestionOptionPayload,
    QuestionPayload,
};
use crate::models::quiz::{
    AllowedGrades, AllowedUser, AllowedUserPayload, BulkIds, QuestionRef, Quiz, QuizCategory,
    QuizCategoryPayload, QuizPayload, QuizQuestion, QuizQuestionBulkUpdate, QuizQuestionGroup,
    QuizQuestionGroupPayload, QuizQuestionIds, QuizQuestionPayload, SwapRequest,
};
use crate::models::user::{Grade, GradePayload, UserPayload, UserSummary};
use crate::models::{CategoryId, GradeId, GroupId, OptionId, QuestionId, QuizId, UserId};

/// One admin endpoint: where it lives, what it returns, what it accepts
pub trait Resource {
    /// Collection path relative to the API root, with trailing slash
    const PATH: &'static str;
    const NAME: &'static str;

    type Id: std::fmt::Display + Copy + Send + Sync;
    type Entity: DeserializeOwned + Send;
    type Payload: Serialize + Validate + Send + Sync;
}

macro_rules! resource {
    ($marker:ident, $name:literal, $path:literal, $id:ty, $entity:ty, $payload:ty) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl Resource for $marker {
            const PATH: &'static str = $path;
            const NAME: &'static str = $name;

            type Id = $id;
            type Entity = $entity;
            type Payload = $payload;
        }
    };
}

resource!(QuestionCategories, "question category", "quiz/question-category/", CategoryId, QuestionCategory, QuestionCategoryPayload);
resource!(Questions, "question", "quiz/question/", QuestionId, Question, QuestionPayload);
resource!(QuestionOptions, "question option", "quiz/question-options/", OptionId, QuestionOption, QuestionOptionPayload);
resource!(QuizCategories, "quiz category", "quiz/quiz-category/", CategoryId, QuizCategory, QuizCategoryPayload);
resource!(Quizzes, "quiz", "quiz/quiz/", QuizId, Quiz, QuizPayload);
resource!(QuizQuestions, "quiz question", "quiz/quiz-question/", i64, QuizQuestion, QuizQuestionPayload);
resource!(QuizQuestionGroups, "question group", "quiz/quiz-question-group/", GroupId, QuizQuestionGroup, QuizQuestionGroupPayload);
resource!(Participants, "participant", "quiz/allowed-user/", i64, AllowedUser, AllowedUserPayload);
resource!(Grades, "grade", "account/grades/", GradeId, Grade, GradePayload);
resource!(Users, "user", "account/users/", UserId, UserSummary, UserPayload);

pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn item_path<R: Resource>(id: R::Id) -> String {
        format!("{}{}/", R::PATH, id)
    }

    pub async fn list<R: Resource>(&self, query: &ListQuery) -> Result<Page<R::Entity>, ApiError> {
        let body: ListBody<R::Entity> = self.client.get_with(R::PATH, query).await?;
        Ok(body.into_page())
    }

    pub async fn get<R: Resource>(&self, id: R::Id) -> Result<R::Entity, ApiError> {
        self.client.get(&Self::item_path::<R>(id)).await
    }

    pub async fn create<R: Resource>(&self, payload: &R::Payload) -> Result<R::Entity, ApiError> {
        payload.validate()?;
        let created = self.client.post(R::PATH, payload).await?;
        tracing::info!("Created {}", R::NAME);
        Ok(created)
    }

    pub async fn update<R: Resource>(
        &self,
        id: R::Id,
        payload: &R::Payload,
    ) -> Result<R::Entity, ApiError> {
        payload.validate()?;
        let updated = self.client.put(&Self::item_path::<R>(id), payload).await?;
        tracing::info!("Updated {} {}", R::NAME, id);
        Ok(updated)
    }

    pub async fn delete<R: Resource>(&self, id: R::Id) -> Result<(), ApiError> {
        self.client.delete(&Self::item_path::<R>(id)).await?;
        tracing::info!("Deleted {} {}", R::NAME, id);
        Ok(())
    }

    /// Exchange the order numbers of two quiz questions
    pub async fn swap_questions(&self, swap: SwapRequest) -> Result<(), ApiError> {
        self.client.put_empty("quiz/swap-questions/", &swap).await
    }

    /// Exchange the order numbers of two question groups
    pub async fn swap_question_groups(&self, swap: SwapRequest) -> Result<(), ApiError> {
        self.client.put_empty("quiz/swap-question-groups/", &swap).await
    }

    pub async fn quiz_question_ids(&self, quiz: QuizId) -> Result<QuizQuestionIds, ApiError> {
        self.client
            .get_with("quiz/quiz-questions-ids/", &[("quiz_id", quiz.0)])
            .await
    }

    pub async fn add_quiz_questions(&self, rows: &[QuizQuestionPayload]) -> Result<(), ApiError> {
        for row in rows {
            row.validate()?;
        }
        self.client.post_empty("quiz/quiz-question-bulk/", rows).await
    }

    pub async fn update_quiz_questions(&self, update: &QuizQuestionBulkUpdate) -> Result<(), ApiError> {
        self.client.put_empty("quiz/quiz-question-bulk/", update).await
    }

    pub async fn remove_quiz_questions(&self, questions: &[QuestionId]) -> Result<(), ApiError> {
        let rows: Vec<QuestionRef> = questions.iter().map(|&id| QuestionRef { id }).collect();
        self.client.delete_with("quiz/quiz-question-bulk/", &rows).await
    }

    pub async fn allowed_grades(&self, quiz: QuizId) -> Result<Vec<GradeId>, ApiError> {
        let grades: AllowedGrades = self
            .client
            .get(&format!("quiz/allowed-grade/{}/", quiz))
            .await?;
        Ok(grades.values)
    }

    /// Allow whole grades; their members become participants
    pub async fn add_allowed_grades(&self, quiz: QuizId, grades: Vec<GradeId>) -> Result<(), ApiError> {
        self.client
            .post_empty(&format!("quiz/allowed-grade/{}/", quiz), &BulkIds { values: grades })
            .await
    }

    pub async fn remove_allowed_grades(&self, quiz: QuizId, grades: Vec<GradeId>) -> Result<(), ApiError> {
        self.client
            .delete_with(&format!("quiz/allowed-grade/{}/", quiz), &BulkIds { values: grades })
            .await
    }

    pub async fn participant_ids(&self, quiz: QuizId) -> Result<Vec<UserId>, ApiError> {
        let ids: BulkIds<UserId> = self
            .client
            .get(&format!("quiz/allowed-user-bulk/{}/", quiz))
            .await?;
        Ok(ids.values)
    }

    pub async fn add_participants(&self, quiz: QuizId, users: Vec<UserId>) -> Result<(), ApiError> {
        self.client
            .post_empty(&format!("quiz/allowed-user-bulk/{}/", quiz), &BulkIds { values: users })
            .await
    }

    pub async fn remove_participants(&self, quiz: QuizId, users: Vec<UserId>) -> Result<(), ApiError> {
        self.client
            .delete_with(&format!("quiz/allowed-user-bulk/{}/", quiz), &BulkIds { values: users })
            .await
    }
}
