//! Question navigation inside a loaded attempt.
//!
//! The attempt record is the only copy of the question list. The displayed
//! question is a borrow into it selected by `current`, so a choice made
//! through either view is visible through both.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::models::attempt::{AttemptQuestion, UserAttempt};
use crate::models::quiz::QuestionGroup;
use crate::models::{AttemptId, GroupId, OptionId, QuestionId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigatorError {
    #[error("question {0} is not part of this attempt")]
    UnknownQuestion(QuestionId),

    #[error("option {option} does not belong to question {question}")]
    UnknownOption {
        question: QuestionId,
        option: OptionId,
    },
}

/// Choice that still has to be reported to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionChoice {
    pub attempt: AttemptId,
    pub question: QuestionId,
    pub option: OptionId,
}

/// Presentation partition of the question index
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSection {
    /// `None` for ungrouped quizzes and for questions without a group
    pub group: Option<QuestionGroup>,
    pub questions: Vec<QuestionId>,
}

#[derive(Debug, Clone)]
pub struct AttemptSession {
    attempt: UserAttempt,
    current: Option<QuestionId>,
}

impl AttemptSession {
    pub fn new(mut attempt: UserAttempt) -> Self {
        attempt
            .questions
            .sort_by_key(|question| question.question_order);
        for question in &mut attempt.questions {
            question.options.sort_by_key(|option| option.option_order);
        }
        let current = attempt.questions.first().map(|question| question.id);
        Self { attempt, current }
    }

    pub fn attempt(&self) -> &UserAttempt {
        &self.attempt
    }

    pub fn id(&self) -> AttemptId {
        self.attempt.id
    }

    pub fn questions(&self) -> &[AttemptQuestion] {
        &self.attempt.questions
    }

    pub fn current_id(&self) -> Option<QuestionId> {
        self.current
    }

    pub fn current_question(&self) -> Option<&AttemptQuestion> {
        self.current.and_then(|id| self.question(id))
    }

    pub fn question(&self, id: QuestionId) -> Option<&AttemptQuestion> {
        self.attempt.questions.iter().find(|question| question.id == id)
    }

    fn position(&self, id: QuestionId) -> Option<usize> {
        self.attempt
            .questions
            .iter()
            .position(|question| question.id == id)
    }

    pub fn current_position(&self) -> Option<usize> {
        self.current.and_then(|id| self.position(id))
    }

    pub fn select_question(&mut self, id: QuestionId) -> Result<(), NavigatorError> {
        if self.position(id).is_none() {
            return Err(NavigatorError::UnknownQuestion(id));
        }
        if self.current != Some(id) {
            tracing::debug!(attempt = %self.attempt.id, question = %id, "question selected");
            self.current = Some(id);
        }
        Ok(())
    }

    /// Move to the following question; `false` at the end of the list
    pub fn next(&mut self) -> bool {
        self.step(1)
    }

    pub fn previous(&mut self) -> bool {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> bool {
        let Some(position) = self.current_position() else {
            return false;
        };
        let Some(target) = position.checked_add_signed(delta) else {
            return false;
        };
        match self.attempt.questions.get(target) {
            Some(question) => {
                self.current = Some(question.id);
                true
            }
            None => false,
        }
    }

    /// Mark `option` as the single selected option of `question`.
    ///
    /// Returns the choice to report, or `None` when it was already selected.
    pub fn choose_option(
        &mut self,
        question: QuestionId,
        option: OptionId,
    ) -> Result<Option<OptionChoice>, NavigatorError> {
        let attempt_id = self.attempt.id;
        let entry = self
            .attempt
            .questions
            .iter_mut()
            .find(|q| q.id == question)
            .ok_or(NavigatorError::UnknownQuestion(question))?;

        let target = entry
            .options
            .iter()
            .find(|o| o.id == option)
            .ok_or(NavigatorError::UnknownOption { question, option })?;

        if target.selected && entry.options.iter().filter(|o| o.selected).count() == 1 {
            return Ok(None);
        }

        for candidate in &mut entry.options {
            candidate.selected = candidate.id == option;
        }

        tracing::debug!(attempt = %attempt_id, %question, %option, "option chosen");

        Ok(Some(OptionChoice {
            attempt: attempt_id,
            question,
            option,
        }))
    }

    pub fn answered_count(&self) -> usize {
        self.attempt
            .questions
            .iter()
            .filter(|question| question.is_answered())
            .count()
    }

    /// Split the question index by group, in the quiz's group order.
    /// Questions without a known group go into a trailing unnamed section.
    pub fn sections(&self) -> Vec<QuestionSection> {
        if !self.attempt.quiz.is_grouped() {
            return vec![QuestionSection {
                group: None,
                questions: self.attempt.questions.iter().map(|q| q.id).collect(),
            }];
        }

        let groups = self.attempt.quiz.question_groups.as_deref().unwrap_or_default();
        let known = |id: Option<GroupId>| id.is_some_and(|id| groups.iter().any(|g| g.id == id));

        let mut sections: Vec<QuestionSection> = groups
            .iter()
            .map(|group| QuestionSection {
                group: Some(group.clone()),
                questions: self
                    .attempt
                    .questions
                    .iter()
                    .filter(|q| q.group == Some(group.id))
                    .map(|q| q.id)
                    .collect(),
            })
            .filter(|section| !section.questions.is_empty())
            .collect();

        let loose: Vec<QuestionId> = self
            .attempt
            .questions
            .iter()
            .filter(|q| !known(q.group))
            .map(|q| q.id)
            .collect();
        if !loose.is_empty() {
            sections.push(QuestionSection {
                group: None,
                questions: loose,
            });
        }

        sections
    }

    /// Time left before the attempt closes, zero once passed
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.attempt.end_time - now).max(Duration::zero())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.attempt.end_time
    }
}
