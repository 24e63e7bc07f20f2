use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::quiz::{QuestionGroup, QuizCategory};
use super::{AttemptId, GroupId, OptionId, QuestionId, QuizId};

/// Option of a question inside an attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptOption {
    pub id: OptionId,
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub body_photo: Option<String>,
    pub option_order: u32,
    #[serde(default)]
    pub selected: bool,
}

/// Question snapshot assigned to an attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptQuestion {
    pub id: QuestionId,
    #[serde(default)]
    pub group: Option<GroupId>,
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub body_photo: Option<String>,
    pub question_order: u32,
    #[serde(default)]
    pub options: Vec<AttemptOption>,
}

impl AttemptQuestion {
    pub fn selected_option(&self) -> Option<&AttemptOption> {
        self.options.iter().find(|option| option.selected)
    }

    pub fn is_answered(&self) -> bool {
        self.selected_option().is_some()
    }
}

/// Quiz summary embedded in an attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptQuiz {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<QuizCategory>,
    #[serde(default)]
    pub grouped_questions: bool,
    #[serde(default)]
    pub question_groups: Option<Vec<QuestionGroup>>,
}

impl AttemptQuiz {
    /// The backend only sends `question_groups` for grouped quizzes, so either
    /// signal marks the quiz as grouped.
    pub fn is_grouped(&self) -> bool {
        self.grouped_questions || self.question_groups.is_some()
    }
}

/// One user's run through a quiz (`quiz/user-attempt/{id}/`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAttempt {
    pub id: AttemptId,
    pub quiz: AttemptQuiz,
    #[serde(alias = "start_time")]
    pub started_at: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub questions: Vec<AttemptQuestion>,
}

/// Body of the option choice report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOptionRequest {
    pub question: QuestionId,
    pub option: OptionId,
}
