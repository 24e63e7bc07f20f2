//! Live quiz grid: the fetched quiz list projected through the clock.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{QuizBackend, QuizListFilter};
use crate::clock::Ticker;
use crate::error::{ApiError, SessionError};
use crate::gate::{action_for, CardAction};
use crate::models::quiz::UserQuiz;
use crate::models::QuizId;
use crate::status::{quiz_status, QuizStatus, StatusFilter};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizCard {
    pub quiz: UserQuiz,
    pub status: QuizStatus,
    pub action: CardAction,
}

/// Everything the grid shows at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub now: DateTime<Utc>,
    pub cards: Vec<QuizCard>,
}

impl BoardSnapshot {
    pub fn project(quizzes: &[UserQuiz], now: DateTime<Utc>) -> Self {
        let cards = quizzes
            .iter()
            .map(|quiz| {
                let status = quiz_status(quiz.start_time, quiz.end_time, now);
                QuizCard {
                    quiz: quiz.clone(),
                    status,
                    action: action_for(quiz, status, now),
                }
            })
            .collect();
        Self { now, cards }
    }

    pub fn filtered(&self, filter: StatusFilter) -> impl Iterator<Item = &QuizCard> {
        self.cards.iter().filter(move |card| filter.matches(card.status))
    }

    pub fn card(&self, id: QuizId) -> Option<&QuizCard> {
        self.cards.iter().find(|card| card.quiz.id == id)
    }
}

type QuizList = Arc<[UserQuiz]>;

/// Open quiz grid. Dropping it stops the projection task; refreshes that
/// complete afterwards are discarded.
pub struct QuizBoardView {
    backend: Arc<dyn QuizBackend>,
    filter: QuizListFilter,
    quizzes: Arc<watch::Sender<QuizList>>,
    snapshot: watch::Receiver<Arc<BoardSnapshot>>,
    task: JoinHandle<()>,
}

impl QuizBoardView {
    /// Fetch the quiz list and start following the ticker.
    /// A failed initial fetch sends the visitor to `fallback`.
    pub async fn open(
        backend: Arc<dyn QuizBackend>,
        ticker: &Ticker,
        filter: QuizListFilter,
        fallback: &str,
    ) -> Result<Self, SessionError> {
        let quizzes = match backend.list_user_quizzes(&filter).await {
            Ok(quizzes) => quizzes,
            Err(cause) => {
                tracing::error!("Failed to load quiz list: {}", cause);
                return Err(SessionError::Redirect {
                    to: fallback.to_string(),
                    cause,
                });
            }
        };
        tracing::info!("Quiz board opened with {} quizzes", quizzes.len());

        let quizzes: QuizList = quizzes.into();
        let now_rx = ticker.subscribe();
        let initial = BoardSnapshot::project(&quizzes, *now_rx.borrow());

        let (quizzes_tx, quizzes_rx) = watch::channel(quizzes);
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(initial));
        let task = tokio::spawn(follow(now_rx, quizzes_rx, snapshot_tx));

        Ok(Self {
            backend,
            filter,
            quizzes: Arc::new(quizzes_tx),
            snapshot: snapshot_rx,
            task,
        })
    }

    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardSnapshot>> {
        self.snapshot.clone()
    }

    /// Wait for the next published snapshot
    pub async fn changed(&mut self) -> Option<Arc<BoardSnapshot>> {
        self.snapshot.changed().await.ok()?;
        Some(self.snapshot.borrow_and_update().clone())
    }

    /// Refetch and replace the quiz list; on failure the current list stays
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let quizzes = self.backend.list_user_quizzes(&self.filter).await?;
        self.quizzes.send_replace(quizzes.into());
        Ok(())
    }

    /// Refetch in the background. The result only lands if the view is
    /// still open when the response arrives.
    pub fn spawn_refresh(&self) -> JoinHandle<bool> {
        let backend = self.backend.clone();
        let filter = self.filter.clone();
        let target: Weak<watch::Sender<QuizList>> = Arc::downgrade(&self.quizzes);

        tokio::spawn(async move {
            let quizzes = match backend.list_user_quizzes(&filter).await {
                Ok(quizzes) => quizzes,
                Err(e) => {
                    tracing::warn!("Background quiz refresh failed: {}", e);
                    return false;
                }
            };
            match target.upgrade() {
                Some(tx) => {
                    tx.send_replace(quizzes.into());
                    true
                }
                None => {
                    tracing::debug!("Quiz board closed, dropping refreshed list");
                    false
                }
            }
        })
    }
}

impl Drop for QuizBoardView {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Republish a whole snapshot whenever the clock ticks or the list changes
async fn follow(
    mut now_rx: watch::Receiver<DateTime<Utc>>,
    mut quizzes_rx: watch::Receiver<QuizList>,
    snapshot_tx: watch::Sender<Arc<BoardSnapshot>>,
) {
    loop {
        tokio::select! {
            changed = now_rx.changed() => if changed.is_err() { break },
            changed = quizzes_rx.changed() => if changed.is_err() { break },
        }

        let now = *now_rx.borrow_and_update();
        let quizzes = quizzes_rx.borrow_and_update().clone();
        snapshot_tx.send_replace(Arc::new(BoardSnapshot::project(&quizzes, now)));
        tracing::trace!(%now, "quiz board reprojected");
    }
}
