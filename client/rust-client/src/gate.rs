//! Primary action of a quiz card.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::quiz::UserQuiz;
use crate::models::{AttemptId, QuizId};
use crate::status::{quiz_status, QuizStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Countdown,
    Continue,
    Start,
    TakeAgain,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardAction {
    pub kind: ActionKind,
    pub label: String,
    pub enabled: bool,
}

impl CardAction {
    fn new(kind: ActionKind, label: impl Into<String>, enabled: bool) -> Self {
        Self {
            kind,
            label: label.into(),
            enabled,
        }
    }

    fn finished() -> Self {
        Self::new(ActionKind::Finished, "Finished", false)
    }
}

/// What activating the card button leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Attempt still within its window: open it without calling start
    Resume(AttemptId),
    /// Ask for confirmation, then start a new attempt
    ConfirmStart(QuizId),
    Unavailable,
}

pub fn card_action(quiz: &UserQuiz, now: DateTime<Utc>) -> CardAction {
    action_for(quiz, quiz_status(quiz.start_time, quiz.end_time, now), now)
}

/// Same as [`card_action`] with an already computed status
pub fn action_for(quiz: &UserQuiz, status: QuizStatus, now: DateTime<Utc>) -> CardAction {
    match status {
        QuizStatus::Finished => CardAction::finished(),
        QuizStatus::Upcoming => CardAction::new(
            ActionKind::Countdown,
            format_countdown(now, quiz.start_time),
            false,
        ),
        QuizStatus::Ongoing => match &quiz.active {
            Some(active) if now <= active.end_time => {
                CardAction::new(ActionKind::Continue, "Continue", true)
            }
            Some(_) if quiz.has_attempts_left() => {
                CardAction::new(ActionKind::Start, "Start", true)
            }
            Some(_) => CardAction::finished(),
            None if quiz.has_attempts_left() && quiz.past_attempts > 0 => {
                CardAction::new(ActionKind::TakeAgain, "Take again", true)
            }
            None if quiz.has_attempts_left() => CardAction::new(ActionKind::Start, "Start", true),
            None => CardAction::finished(),
        },
    }
}

pub fn activate(quiz: &UserQuiz, now: DateTime<Utc>) -> Activation {
    let action = card_action(quiz, now);
    match (action.kind, &quiz.active) {
        (ActionKind::Continue, Some(active)) => Activation::Resume(active.id),
        _ if action.enabled => Activation::ConfirmStart(quiz.id),
        _ => Activation::Unavailable,
    }
}

/// `HH:MM:SS` of the whole seconds between two instants, floored before
/// taking the absolute value: a countdown to a later `b` rounds up and only
/// reads `00:00:00` once `b` is reached. Hours keep counting past 24.
pub fn format_countdown(a: DateTime<Utc>, b: DateTime<Utc>) -> String {
    let seconds = (a - b).num_milliseconds().div_euclid(1000).unsigned_abs();
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Human readable quiz duration, e.g. "1 hour 5 minutes"
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;

    let hours_text = if hours == 1 {
        "1 hour".to_string()
    } else {
        format!("{} hours", hours)
    };
    let minutes_text = if rest == 1 {
        "1 minute".to_string()
    } else {
        format!("{} minutes", rest)
    };

    if hours == 0 {
        minutes_text
    } else if rest == 0 {
        hours_text
    } else {
        format!("{} {}", hours_text, minutes_text)
    }
}

/// Content of the start confirmation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartSummary {
    pub quiz_id: QuizId,
    pub title: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub total_questions: u32,
    pub groups: Vec<String>,
    pub duration: String,
}

impl From<&UserQuiz> for StartSummary {
    fn from(quiz: &UserQuiz) -> Self {
        let groups = quiz
            .question_groups
            .iter()
            .flatten()
            .map(|group| {
                format!(
                    "{} - {}, {} point",
                    group.title, group.total_questions, group.point
                )
            })
            .collect();

        Self {
            quiz_id: quiz.id,
            title: quiz.title.clone(),
            category: quiz.category.as_ref().map(|c| c.name.clone()),
            description: quiz.description.clone().filter(|d| !d.is_empty()),
            total_questions: quiz.questions,
            groups,
            duration: format_duration(quiz.duration),
        }
    }
}
