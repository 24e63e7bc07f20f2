use chrono::Duration;
use quizportal_client::api::QuizListFilter;
use quizportal_client::clock::{ManualClock, Ticker};
use quizportal_client::gate::ActionKind;
use quizportal_client::models::QuizId;
use quizportal_client::services::quiz_board::QuizBoardView;
use quizportal_client::status::{QuizStatus, StatusFilter};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration as StdDuration;

mod common;

use common::{base_time, user_quiz, FakeBackend};

fn manual_ticker() -> (Arc<ManualClock>, Ticker) {
    common::init_tracing();
    let clock = Arc::new(ManualClock::new(base_time()));
    let ticker = Ticker::new(clock.clone());
    (clock, ticker)
}

async fn open(backend: &Arc<FakeBackend>, ticker: &Ticker) -> QuizBoardView {
    QuizBoardView::open(backend.clone(), ticker, QuizListFilter::default(), "/user")
        .await
        .unwrap()
}

#[tokio::test]
async fn test_initial_snapshot_projects_statuses() {
    let backend = Arc::new(FakeBackend::with_quizzes(vec![
        user_quiz(1, Duration::minutes(5), Duration::minutes(65)),
        user_quiz(2, -Duration::minutes(5), Duration::minutes(55)),
        user_quiz(3, -Duration::minutes(90), -Duration::minutes(30)),
    ]));
    let (_clock, ticker) = manual_ticker();
    let board = open(&backend, &ticker).await;

    let snapshot = board.snapshot();
    assert_eq!(snapshot.now, base_time());
    assert_eq!(snapshot.card(QuizId(1)).unwrap().status, QuizStatus::Upcoming);
    assert_eq!(snapshot.card(QuizId(1)).unwrap().action.label, "00:05:00");
    assert_eq!(snapshot.card(QuizId(2)).unwrap().status, QuizStatus::Ongoing);
    assert_eq!(snapshot.card(QuizId(3)).unwrap().status, QuizStatus::Finished);
    assert_eq!(snapshot.filtered(StatusFilter::Ongoing).count(), 1);
    assert_eq!(snapshot.filtered(StatusFilter::All).count(), 3);
}

#[tokio::test]
async fn test_tick_moves_quiz_from_upcoming_to_ongoing() {
    let backend = Arc::new(FakeBackend::with_quizzes(vec![user_quiz(
        1,
        Duration::seconds(2),
        Duration::minutes(60),
    )]));
    let (clock, ticker) = manual_ticker();
    let mut board = open(&backend, &ticker).await;

    clock.advance(Duration::seconds(1));
    ticker.tick();
    let snapshot = board.changed().await.unwrap();
    let card = snapshot.card(QuizId(1)).unwrap();
    assert_eq!(card.status, QuizStatus::Upcoming);
    assert_eq!(card.action.label, "00:00:01");
    assert!(!card.action.enabled);

    clock.advance(Duration::seconds(1));
    ticker.tick();
    let snapshot = board.changed().await.unwrap();
    let card = snapshot.card(QuizId(1)).unwrap();
    assert_eq!(card.status, QuizStatus::Ongoing);
    assert_eq!(card.action.kind, ActionKind::Start);
    assert!(card.action.enabled);

    // The list is fetched once, ticks only reproject it
    assert_eq!(backend.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_open_failure_redirects() {
    let backend = Arc::new(FakeBackend::default());
    backend.fail_list.store(true, Ordering::SeqCst);
    let (_clock, ticker) = manual_ticker();

    let err = QuizBoardView::open(backend.clone(), &ticker, QuizListFilter::default(), "/user")
        .await
        .err()
        .expect("open must fail");
    assert_eq!(err.redirect_target(), Some("/user"));
}

#[tokio::test]
async fn test_refresh_replaces_list() {
    let backend = Arc::new(FakeBackend::with_quizzes(vec![user_quiz(
        1,
        -Duration::minutes(1),
        Duration::minutes(60),
    )]));
    let (_clock, ticker) = manual_ticker();
    let mut board = open(&backend, &ticker).await;

    backend
        .quizzes
        .lock()
        .unwrap()
        .push(user_quiz(2, Duration::minutes(1), Duration::minutes(60)));
    board.refresh().await.unwrap();

    let snapshot = board.changed().await.unwrap();
    assert_eq!(snapshot.cards.len(), 2);
    assert_eq!(snapshot.card(QuizId(2)).unwrap().status, QuizStatus::Upcoming);
}

#[tokio::test]
async fn test_failed_refresh_keeps_current_list() {
    let backend = Arc::new(FakeBackend::with_quizzes(vec![user_quiz(
        1,
        -Duration::minutes(1),
        Duration::minutes(60),
    )]));
    let (_clock, ticker) = manual_ticker();
    let board = open(&backend, &ticker).await;

    backend.fail_list.store(true, Ordering::SeqCst);
    assert!(board.refresh().await.is_err());
    assert!(!board.spawn_refresh().await.unwrap());
    assert_eq!(board.snapshot().cards.len(), 1);
}

#[tokio::test]
async fn test_spawn_refresh_lands_while_open() {
    let backend = Arc::new(FakeBackend::with_quizzes(vec![]));
    let (_clock, ticker) = manual_ticker();
    let mut board = open(&backend, &ticker).await;
    assert!(board.snapshot().cards.is_empty());

    backend
        .quizzes
        .lock()
        .unwrap()
        .push(user_quiz(7, -Duration::minutes(1), Duration::minutes(60)));
    assert!(board.spawn_refresh().await.unwrap());

    let snapshot = board.changed().await.unwrap();
    assert!(snapshot.card(QuizId(7)).is_some());
}

#[tokio::test]
async fn test_refresh_completing_after_close_is_discarded() {
    let backend = Arc::new(FakeBackend::with_quizzes(vec![]));
    let (_clock, ticker) = manual_ticker();
    let board = open(&backend, &ticker).await;

    let gate = backend.list_gate.lock().await;
    let pending = board.spawn_refresh();
    drop(board);
    drop(gate);

    assert!(!pending.await.unwrap());
}

#[tokio::test]
async fn test_closing_board_stops_publishing() {
    let backend = Arc::new(FakeBackend::with_quizzes(vec![]));
    let (clock, ticker) = manual_ticker();
    let board = open(&backend, &ticker).await;
    let mut snapshots = board.subscribe();

    drop(board);
    clock.advance(Duration::seconds(1));
    ticker.tick();

    let closed = tokio::time::timeout(StdDuration::from_secs(1), snapshots.changed())
        .await
        .expect("projection task should end");
    assert!(closed.is_err());
}
