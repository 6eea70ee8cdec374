//! Survey traversal as an explicit state machine.
//!
//! A [`SurveySession`] walks one respondent through a borrowed [`Catalog`]:
//!
//! ```text
//! Unstarted --start--> Intro --acknowledge--> InProgress(0)
//! InProgress(i) --advance--> InProgress(i+1) | Completed
//! Completed --submit--> Submitted
//! ```
//!
//! Each event is a method returning a `Result`. A failed event leaves the
//! session exactly as it was. The only suspension point is the store append
//! inside [`SurveySession::submit`].

use std::collections::HashMap;
use std::fmt;

use canvass_core::validate::is_blank;
use canvass_core::{
    Answer, AnswerValue, Catalog, Question, QuestionId, SubmissionRecord, ValidationError,
};
use canvass_storage::{StorageError, SubmissionStore};
use time::OffsetDateTime;

// ──────────────────────────────────────────────
// Phase
// ──────────────────────────────────────────────

/// Where the respondent is in the survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Unstarted,
    /// Group accepted, introduction shown.
    Intro,
    /// Answering the question at `index` in catalog order.
    InProgress { index: usize },
    /// Every question passed its gate; waiting for a successful submit.
    Completed,
    /// Terminal.
    Submitted { submission_id: String },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Unstarted => "unstarted",
            Phase::Intro => "intro",
            Phase::InProgress { .. } => "in_progress",
            Phase::Completed => "completed",
            Phase::Submitted { .. } => "submitted",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::InProgress { index } => write!(f, "in_progress({index})"),
            other => f.write_str(other.name()),
        }
    }
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The respondent can correct this and try again.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store rejected the record; `submit` may be retried.
    #[error("failed to store submission: {0}")]
    Store(#[from] StorageError),

    /// The event is not accepted in the current phase.
    #[error("cannot {event} while {phase}")]
    InvalidTransition {
        event: &'static str,
        phase: &'static str,
    },

    /// A survey with no questions cannot be taken.
    #[error("the question catalog is empty")]
    EmptyCatalog,
}

// ──────────────────────────────────────────────
// Session
// ──────────────────────────────────────────────

/// One respondent's pass through the catalog.
#[derive(Debug)]
pub struct SurveySession<'c> {
    catalog: &'c Catalog,
    group_id: Option<String>,
    phase: Phase,
    answers: HashMap<QuestionId, AnswerValue>,
}

impl<'c> SurveySession<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        SurveySession {
            catalog,
            group_id: None,
            phase: Phase::Unstarted,
            answers: HashMap::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// The question being answered, while in progress.
    pub fn current_question(&self) -> Option<&'c Question> {
        match self.phase {
            Phase::InProgress { index } => self.catalog.questions().get(index),
            _ => None,
        }
    }

    /// The value recorded so far for `question_id`, raw as entered.
    pub fn answer(&self, question_id: QuestionId) -> Option<&AnswerValue> {
        self.answers.get(&question_id)
    }

    /// Respondent-facing progress, 0..=100.
    ///
    /// While in progress this is `round(index / total * 100)`, so the final
    /// question shows less than 100 until it has been passed.
    pub fn progress(&self) -> u8 {
        match self.phase {
            Phase::Unstarted | Phase::Intro => 0,
            Phase::InProgress { index } => {
                let total = self.catalog.len().max(1) as f64;
                (index as f64 / total * 100.0).round() as u8
            }
            Phase::Completed | Phase::Submitted { .. } => 100,
        }
    }

    /// Accept the respondent's group and show the introduction.
    pub fn start(&mut self, group_id: &str) -> Result<(), SessionError> {
        self.expect_phase("start", matches!(self.phase, Phase::Unstarted))?;
        if is_blank(group_id) {
            return Err(ValidationError::BlankGroupId.into());
        }
        self.group_id = Some(group_id.to_string());
        self.answers.clear();
        self.phase = Phase::Intro;
        Ok(())
    }

    /// Leave the introduction and show the first question.
    pub fn acknowledge(&mut self) -> Result<(), SessionError> {
        self.expect_phase("acknowledge", matches!(self.phase, Phase::Intro))?;
        if self.catalog.is_empty() {
            return Err(SessionError::EmptyCatalog);
        }
        self.phase = Phase::InProgress { index: 0 };
        Ok(())
    }

    /// Store (or overwrite) the answer to the current question.
    ///
    /// Nothing is checked here; [`advance`](Self::advance) is the gate.
    pub fn record_answer(&mut self, value: impl Into<AnswerValue>) -> Result<(), SessionError> {
        let question = self
            .current_question()
            .ok_or_else(|| self.invalid("record an answer"))?;
        self.answers.insert(question.id(), value.into());
        Ok(())
    }

    /// Move past the current question if its answer satisfies the type rule.
    ///
    /// Calling this while `Completed` does nothing.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        let index = match self.phase {
            Phase::InProgress { index } => index,
            Phase::Completed => return Ok(()),
            _ => return Err(self.invalid("advance")),
        };
        let question = &self.catalog.questions()[index];
        question.check_answer(self.answers.get(&question.id()))?;

        self.phase = if index + 1 < self.catalog.len() {
            Phase::InProgress { index: index + 1 }
        } else {
            tracing::debug!(group_id = ?self.group_id, "survey completed");
            Phase::Completed
        };
        Ok(())
    }

    /// Build a record and append it to `store`.
    ///
    /// On a store error the session stays `Completed` and the call may be
    /// repeated. Every successful call produces a new submission id; retries
    /// are not deduplicated.
    pub async fn submit<S>(&mut self, store: &S) -> Result<SubmissionRecord, SessionError>
    where
        S: SubmissionStore + ?Sized,
    {
        self.expect_phase("submit", matches!(self.phase, Phase::Completed))?;
        let group_id = self
            .group_id
            .clone()
            .ok_or(ValidationError::BlankGroupId)?;

        let answers = self
            .catalog
            .iter()
            .filter_map(|q| {
                self.answers
                    .get(&q.id())
                    .map(|v| Answer::new(q.id(), v.clone()))
            })
            .collect();
        let record = SubmissionRecord::new(group_id, answers, OffsetDateTime::now_utc())?;

        if let Err(e) = store.append(record.clone()).await {
            tracing::warn!(
                submission_id = record.submission_id(),
                error = %e,
                "submission append failed"
            );
            return Err(e.into());
        }

        tracing::info!(
            submission_id = record.submission_id(),
            group_id = record.group_id(),
            answers = record.answers().len(),
            "submission stored"
        );
        self.phase = Phase::Submitted {
            submission_id: record.submission_id().to_string(),
        };
        Ok(record)
    }

    fn expect_phase(&self, event: &'static str, ok: bool) -> Result<(), SessionError> {
        if ok {
            Ok(())
        } else {
            Err(self.invalid(event))
        }
    }

    fn invalid(&self, event: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            event,
            phase: self.phase.name(),
        }
    }
}
