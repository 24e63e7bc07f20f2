use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temporal state of a quiz window relative to "now"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Upcoming,
    Ongoing,
    Finished,
}

impl QuizStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizStatus::Upcoming => "upcoming",
            QuizStatus::Ongoing => "ongoing",
            QuizStatus::Finished => "finished",
        }
    }
}

impl std::fmt::Display for QuizStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a quiz window. Both boundaries count as ongoing.
///
/// With `end < start` the window is empty: instants before `start` are
/// upcoming and everything else is finished.
pub fn quiz_status(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> QuizStatus {
    if now < start {
        QuizStatus::Upcoming
    } else if now <= end {
        QuizStatus::Ongoing
    } else {
        QuizStatus::Finished
    }
}

/// Grid filter buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Upcoming,
    Ongoing,
    Finished,
}

impl StatusFilter {
    pub fn matches(&self, status: QuizStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Upcoming => status == QuizStatus::Upcoming,
            StatusFilter::Ongoing => status == QuizStatus::Ongoing,
            StatusFilter::Finished => status == QuizStatus::Finished,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "upcoming" => Ok(StatusFilter::Upcoming),
            "ongoing" => Ok(StatusFilter::Ongoing),
            "finished" => Ok(StatusFilter::Finished),
            other => Err(format!("unknown status filter: {}", other)),
        }
    }
}
