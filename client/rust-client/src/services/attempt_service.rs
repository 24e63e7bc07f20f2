use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::QuizBackend;
use crate::config::RouteConfig;
use crate::error::{ApiError, SessionError};
use crate::gate::{activate, Activation};
use crate::models::attempt::{SelectOptionRequest, UserAttempt};
use crate::models::quiz::UserQuiz;
use crate::models::{AttemptId, OptionId, QuestionId, QuizId};
use crate::navigator::{AttemptSession, NavigatorError, OptionChoice};

/// Where activating a quiz card ended up
#[derive(Debug)]
pub enum Entry {
    /// Session opened, either resumed or freshly started
    Opened(AttemptView),
    /// Start needs the visitor's confirmation first
    NeedsConfirmation(QuizId),
    Unavailable,
}

pub struct AttemptService {
    backend: Arc<dyn QuizBackend>,
    routes: RouteConfig,
}

impl AttemptService {
    pub fn new(backend: Arc<dyn QuizBackend>, routes: RouteConfig) -> Self {
        Self { backend, routes }
    }

    /// Load an attempt. Without its data the session cannot render, so any
    /// failure redirects to the participant home.
    pub async fn open(&self, id: AttemptId) -> Result<AttemptView, SessionError> {
        tracing::info!("Opening attempt: {}", id);

        match self.backend.get_attempt(id).await {
            Ok(attempt) => Ok(self.view(attempt)),
            Err(cause) => {
                tracing::error!("Failed to load attempt {}: {}", id, cause);
                Err(SessionError::Redirect {
                    to: self.routes.user_home.clone(),
                    cause,
                })
            }
        }
    }

    /// Press the primary button of a quiz card
    pub async fn activate(&self, quiz: &UserQuiz, now: DateTime<Utc>) -> Result<Entry, SessionError> {
        match activate(quiz, now) {
            Activation::Resume(attempt) => Ok(Entry::Opened(self.open(attempt).await?)),
            Activation::ConfirmStart(quiz) => Ok(Entry::NeedsConfirmation(quiz)),
            Activation::Unavailable => Ok(Entry::Unavailable),
        }
    }

    /// Confirmed start. On failure the caller stays where it is.
    pub async fn start(&self, quiz: QuizId) -> Result<AttemptView, ApiError> {
        tracing::info!("Starting attempt for quiz: {}", quiz);

        let attempt = self.backend.start_attempt(quiz).await.map_err(|e| {
            tracing::warn!("Backend refused to start quiz {}: {}", quiz, e);
            e
        })?;

        tracing::info!("Attempt {} started for quiz {}", attempt.id, quiz);
        Ok(self.view(attempt))
    }

    fn view(&self, attempt: UserAttempt) -> AttemptView {
        AttemptView {
            session: AttemptSession::new(attempt),
            backend: self.backend.clone(),
        }
    }
}

/// Open attempt session.
///
/// Local state is authoritative for display. Choices are reported in the
/// background and a failed report is only logged: the client can then hold
/// an answer the backend never stored.
pub struct AttemptView {
    session: AttemptSession,
    backend: Arc<dyn QuizBackend>,
}

impl AttemptView {
    pub fn session(&self) -> &AttemptSession {
        &self.session
    }

    pub fn select_question(&mut self, id: QuestionId) -> Result<(), NavigatorError> {
        self.session.select_question(id)
    }

    pub fn next(&mut self) -> bool {
        self.session.next()
    }

    pub fn previous(&mut self) -> bool {
        self.session.previous()
    }

    /// Apply the choice locally, then report it. Returns the report task,
    /// or `None` when nothing changed.
    pub fn choose_option(
        &mut self,
        question: QuestionId,
        option: OptionId,
    ) -> Result<Option<JoinHandle<()>>, NavigatorError> {
        let Some(choice) = self.session.choose_option(question, option)? else {
            return Ok(None);
        };
        Ok(Some(report(self.backend.clone(), choice)))
    }

    pub fn into_session(self) -> AttemptSession {
        self.session
    }
}

impl std::fmt::Debug for AttemptView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttemptView")
            .field("attempt", &self.session.id())
            .field("current", &self.session.current_id())
            .finish()
    }
}

fn report(backend: Arc<dyn QuizBackend>, choice: OptionChoice) -> JoinHandle<()> {
    tokio::spawn(async move {
        let request = SelectOptionRequest {
            question: choice.question,
            option: choice.option,
        };
        match backend.select_option(choice.attempt, request).await {
            Ok(()) => tracing::debug!(
                attempt = %choice.attempt,
                question = %choice.question,
                "choice recorded"
            ),
            Err(e) => tracing::warn!(
                attempt = %choice.attempt,
                question = %choice.question,
                option = %choice.option,
                "Failed to record choice, keeping local selection: {}",
                e
            ),
        }
    })
}
