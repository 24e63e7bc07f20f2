#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use quizportal_client::api::{QuizBackend, QuizListFilter};
use quizportal_client::error::ApiError;
use quizportal_client::models::attempt::{
    AttemptOption, AttemptQuestion, AttemptQuiz, SelectOptionRequest, UserAttempt,
};
use quizportal_client::models::quiz::UserQuiz;
use quizportal_client::models::user::UserProfile;
use quizportal_client::models::{AttemptId, OptionId, QuestionId, QuizId, UserId};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "test-token";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn user_quiz(id: i64, start: Duration, end: Duration) -> UserQuiz {
    UserQuiz {
        id: QuizId(id),
        title: format!("Quiz {}", id),
        description: Some("Practice round".to_string()),
        category: None,
        start_time: base_time() + start,
        duration: 60,
        end_time: base_time() + end,
        questions: 3,
        question_groups: None,
        past_attempts: 0,
        left_attempts: 1,
        active: None,
    }
}

pub fn attempt(id: i64, questions: usize) -> UserAttempt {
    let questions = (1..=questions as i64)
        .map(|q| AttemptQuestion {
            id: QuestionId(q),
            group: None,
            body_text: Some(format!("Question {}", q)),
            body_photo: None,
            question_order: q as u32,
            options: (1..=3)
                .map(|o| AttemptOption {
                    id: OptionId(q * 10 + o),
                    body_text: Some(format!("Option {}", o)),
                    body_photo: None,
                    option_order: o as u32,
                    selected: false,
                })
                .collect(),
        })
        .collect();

    UserAttempt {
        id: AttemptId(id),
        quiz: AttemptQuiz {
            id: QuizId(1),
            title: "Quiz 1".to_string(),
            description: None,
            category: None,
            grouped_questions: false,
            question_groups: None,
        },
        started_at: base_time(),
        end_time: base_time() + Duration::minutes(60),
        is_completed: false,
        completed_at: None,
        questions,
    }
}

/// In-memory backend for service tests
#[derive(Default)]
pub struct FakeBackend {
    pub quizzes: Mutex<Vec<UserQuiz>>,
    pub attempts: Mutex<HashMap<AttemptId, UserAttempt>>,
    pub selects: Mutex<Vec<(AttemptId, SelectOptionRequest)>>,
    pub list_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_selects: AtomicBool,
    /// Held by list calls while locked, to keep a request in flight
    pub list_gate: tokio::sync::Mutex<()>,
}

impl FakeBackend {
    pub fn with_quizzes(quizzes: Vec<UserQuiz>) -> Self {
        let backend = Self::default();
        *backend.quizzes.lock().unwrap() = quizzes;
        backend
    }

    pub fn add_attempt(&self, attempt: UserAttempt) {
        self.attempts.lock().unwrap().insert(attempt.id, attempt);
    }

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            status: reqwest::StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        }
    }
}

#[async_trait]
impl QuizBackend for FakeBackend {
    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        Ok(profile(false))
    }

    async fn list_user_quizzes(&self, _filter: &QuizListFilter) -> Result<Vec<UserQuiz>, ApiError> {
        let _gate = self.list_gate.lock().await;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Self::status(500));
        }
        Ok(self.quizzes.lock().unwrap().clone())
    }

    async fn get_user_quiz(&self, id: QuizId) -> Result<UserQuiz, ApiError> {
        self.quizzes
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| Self::status(404))
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<UserAttempt, ApiError> {
        self.attempts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::status(404))
    }

    async fn start_attempt(&self, quiz: QuizId) -> Result<UserAttempt, ApiError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let known = self.quizzes.lock().unwrap().iter().any(|q| q.id == quiz);
        if !known {
            return Err(Self::status(500));
        }
        let mut created = attempt(100 + quiz.0, 2);
        created.quiz.id = quiz;
        self.add_attempt(created.clone());
        Ok(created)
    }

    async fn select_option(
        &self,
        attempt: AttemptId,
        choice: SelectOptionRequest,
    ) -> Result<(), ApiError> {
        self.selects.lock().unwrap().push((attempt, choice));
        if self.fail_selects.load(Ordering::SeqCst) {
            return Err(Self::status(503));
        }
        Ok(())
    }
}

pub fn profile(is_staff: bool) -> UserProfile {
    UserProfile {
        id: UserId(1),
        username: "student".to_string(),
        first_name: "Ada".to_string(),
        last_name: "L".to_string(),
        is_staff,
        grade: None,
    }
}

/// Request seen by the mock HTTP backend
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
struct MockState {
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl MockState {
    fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: Value) {
        self.recorded.lock().unwrap().push(Recorded {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });
    }
}

pub struct MockServer {
    pub base_url: String,
    pub recorded: Arc<Mutex<Vec<Recorded>>>,
    task: tokio::task::JoinHandle<()>,
}

impl MockServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serve a fake quiz backend on an ephemeral port
pub async fn spawn_mock_backend() -> MockServer {
    init_tracing();
    let state = MockState::default();
    let recorded = state.recorded.clone();

    let app = Router::new()
        .route("/api/account/profile/", get(profile_handler))
        .route("/api/account/grades/", get(grades_handler))
        .route("/api/quiz/user-quiz/", get(user_quizzes_handler))
        .route("/api/quiz/user-attempt/{id}/", get(attempt_handler))
        .route("/api/quiz/user-attempt/{id}/select/", post(select_handler))
        .route("/api/quiz/start-quiz/{id}/", get(start_handler))
        .route("/api/quiz/quiz/", get(quiz_page_handler).post(quiz_create_handler))
        .route("/api/quiz/quiz/{id}/", delete(quiz_delete_handler))
        .route("/api/quiz/swap-questions/", put(swap_handler))
        .route(
            "/api/quiz/allowed-user/",
            get(participants_handler).post(participant_create_handler),
        )
        .route(
            "/api/quiz/allowed-user-bulk/{id}/",
            get(participant_ids_handler)
                .post(record_ok)
                .delete(record_ok),
        )
        .route(
            "/api/quiz/allowed-grade/{id}/",
            get(allowed_grades_handler)
                .post(record_ok)
                .delete(record_ok),
        )
        .route(
            "/api/quiz/quiz-question-bulk/",
            post(record_ok).put(record_ok).delete(record_ok),
        )
        .route("/api/quiz/quiz-questions-ids/", get(quiz_question_ids_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        base_url: format!("http://{}/api", addr),
        recorded,
        task,
    }
}

async fn profile_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN));
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "no credentials"})));
    }
    (
        StatusCode::OK,
        Json(json!({"id": 1, "username": "student", "first_name": "Ada", "last_name": "L", "is_staff": false})),
    )
}

async fn grades_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    Json(json!([{"id": 1, "name": "7A"}, {"id": 2, "name": "7B"}]))
}

async fn user_quizzes_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(_query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    Json(json!([{
        "id": 1,
        "title": "Algebra",
        "description": "Linear equations",
        "category": {"id": 2, "name": "Math", "total_quizes": 1},
        "start_time": "2024-05-01T11:50:00Z",
        "duration": 60,
        "end_time": "2024-05-01T12:50:00Z",
        "questions": 3,
        "question_groups": null,
        "past_attempts": 0,
        "left_attempts": 2,
        "active": null
    }]))
}

async fn attempt_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    if id != 5 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."})));
    }
    (StatusCode::OK, Json(serde_json::to_value(attempt(5, 3)).unwrap()))
}

async fn select_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, body);
    StatusCode::OK
}

async fn start_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    if id != 1 {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error"})),
        );
    }
    (StatusCode::OK, Json(serde_json::to_value(attempt(9, 2)).unwrap()))
}

fn admin_quiz(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "category": null,
        "start_time": "2024-05-01T09:00:00Z",
        "duration": 45,
        "end_time": "2024-05-01T09:45:00Z",
        "access": "private",
        "has_random_questions": false,
        "has_random_options": false,
        "grouped_questions": false,
        "attempts": 1,
        "total_questions": 10,
        "questions": 10,
        "total_participants": 4
    })
}

async fn quiz_page_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    Json(json!({
        "count": 21,
        "next": "http://backend/api/quiz/quiz/?page=2",
        "previous": null,
        "results": [admin_quiz(1, "Algebra"), admin_quiz(2, "Geometry")]
    }))
}

async fn quiz_create_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let title = body["title"].as_str().unwrap_or_default().to_string();
    state.record(method, &uri, &headers, body);
    (StatusCode::CREATED, Json(admin_quiz(30, &title)))
}

async fn quiz_delete_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    StatusCode::NO_CONTENT
}

async fn swap_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, body);
    StatusCode::OK
}

fn body_json(body: &Bytes) -> Value {
    if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body).unwrap_or(Value::Null)
    }
}

/// Accept any body, record it and answer 200 with no content
async fn record_ok(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, body_json(&body));
    StatusCode::OK
}

fn allowed_user(id: i64, user: i64) -> Value {
    json!({
        "id": id,
        "user": {"id": user, "username": format!("user{}", user), "first_name": "", "last_name": "", "grade": null}
    })
}

async fn participants_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    Json(json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [allowed_user(4, 12)]
    }))
}

async fn participant_create_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let user = body["user"].as_i64().unwrap_or_default();
    state.record(method, &uri, &headers, body);
    (StatusCode::CREATED, Json(allowed_user(5, user)))
}

async fn participant_ids_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    Json(json!({"values": [12, 13]}))
}

async fn allowed_grades_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    Json(json!({"values": [1, 2]}))
}

async fn quiz_question_ids_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);
    Json(json!({"numbers": [21, 22], "max_order_number": 2}))
}
