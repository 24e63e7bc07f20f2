//! REST client for the quiz backend.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::attempt::{SelectOptionRequest, UserAttempt};
use crate::models::page::Page;
use crate::models::quiz::UserQuiz;
use crate::models::user::UserProfile;
use crate::models::{AttemptId, CategoryId, QuizId};

pub mod admin;

/// Filters of the participant quiz grid
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct QuizListFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Backend operations the participant views depend on
#[async_trait]
pub trait QuizBackend: Send + Sync {
    async fn current_user(&self) -> Result<UserProfile, ApiError>;

    async fn list_user_quizzes(&self, filter: &QuizListFilter) -> Result<Vec<UserQuiz>, ApiError>;

    async fn get_user_quiz(&self, id: QuizId) -> Result<UserQuiz, ApiError>;

    async fn get_attempt(&self, id: AttemptId) -> Result<UserAttempt, ApiError>;

    /// Creates a new attempt, or returns the error the backend gives when
    /// the quiz is closed or no attempts are left
    async fn start_attempt(&self, quiz: QuizId) -> Result<UserAttempt, ApiError>;

    async fn select_option(
        &self,
        attempt: AttemptId,
        choice: SelectOptionRequest,
    ) -> Result<(), ApiError>;
}

/// Some list endpoints paginate and some return a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody<T> {
    Page(Page<T>),
    Plain(Vec<T>),
}

impl<T> ListBody<T> {
    pub(crate) fn into_page(self) -> Page<T> {
        match self {
            ListBody::Page(page) => page,
            ListBody::Plain(results) => Page {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.api_base_url,
            config.api_token.clone(),
            config.api_timeout(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn admin(&self) -> admin::AdminApi<'_> {
        admin::AdminApi::new(self)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        tracing::debug!(%method, %url, "backend request");

        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%status, %body, "backend rejected request");
        Err(ApiError::Status { status, body })
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::check(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_empty(builder: RequestBuilder) -> Result<(), ApiError> {
        Self::check(builder.send().await?).await?;
        Ok(())
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        Self::send_json(self.request(Method::GET, path)?).await
    }

    pub(crate) async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        Self::send_json(self.request(Method::GET, path)?.query(query)).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        Self::send_json(self.request(Method::POST, path)?.json(body)).await
    }

    pub(crate) async fn post_empty<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        Self::send_empty(self.request(Method::POST, path)?.json(body)).await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        Self::send_json(self.request(Method::PUT, path)?.json(body)).await
    }

    pub(crate) async fn put_empty<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        Self::send_empty(self.request(Method::PUT, path)?.json(body)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        Self::send_empty(self.request(Method::DELETE, path)?).await
    }

    pub(crate) async fn delete_with<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        Self::send_empty(self.request(Method::DELETE, path)?.json(body)).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

#[async_trait]
impl QuizBackend for ApiClient {
    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.get("account/profile/").await
    }

    async fn list_user_quizzes(&self, filter: &QuizListFilter) -> Result<Vec<UserQuiz>, ApiError> {
        let body: ListBody<UserQuiz> = self.get_with("quiz/user-quiz/", filter).await?;
        Ok(body.into_page().results)
    }

    async fn get_user_quiz(&self, id: QuizId) -> Result<UserQuiz, ApiError> {
        self.get(&format!("quiz/user-quiz/{}/", id)).await
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<UserAttempt, ApiError> {
        self.get(&format!("quiz/user-attempt/{}/", id)).await
    }

    async fn start_attempt(&self, quiz: QuizId) -> Result<UserAttempt, ApiError> {
        self.get(&format!("quiz/start-quiz/{}/", quiz)).await
    }

    async fn select_option(
        &self,
        attempt: AttemptId,
        choice: SelectOptionRequest,
    ) -> Result<(), ApiError> {
        self.post_empty(&format!("quiz/user-attempt/{}/select/", attempt), &choice)
            .await
    }
}
