pub mod access;
pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod navigator;
pub mod services;
pub mod status;

pub use api::{ApiClient, QuizBackend};
pub use config::Config;
pub use error::{ApiError, SessionError};
pub use services::AppState;
