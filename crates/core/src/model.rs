//! Survey data model: questions, answers and submission records.
//!
//! `Question` (de)serializes through the question definition payload
//! (`{id, type, text, options?, placeholder?}`) so every catalog read from
//! disk or the wire is validated on the way in. `SubmissionRecord` uses the
//! submission payload shape (`{submissionId, groupId, answers, timestamp}`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{PayloadError, ValidationError};
use crate::payload::QuestionPayload;

/// Stable identifier of a question within a catalog.
pub type QuestionId = u64;

// ──────────────────────────────────────────────
// Questions
// ──────────────────────────────────────────────

/// One selectable point on a scale question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleOption {
    pub value: i64,
    #[serde(rename = "text")]
    pub label: String,
}

impl ScaleOption {
    pub fn new(value: i64, label: impl Into<String>) -> Self {
        ScaleOption {
            value,
            label: label.into(),
        }
    }
}

/// What kind of answer a question takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Pick one of a fixed, ordered, non-empty set of labeled values.
    Scale { options: Vec<ScaleOption> },
    /// Free-form text. The placeholder is a display hint only.
    Text { placeholder: Option<String> },
}

impl QuestionKind {
    pub const SCALE_WIRE_NAME: &'static str = "emoji_scale";
    pub const TEXT_WIRE_NAME: &'static str = "text_input";

    /// Name used in the `type` field of the definition payload.
    pub fn wire_name(&self) -> &'static str {
        match self {
            QuestionKind::Scale { .. } => Self::SCALE_WIRE_NAME,
            QuestionKind::Text { .. } => Self::TEXT_WIRE_NAME,
        }
    }

    /// Check the scale invariants: at least one option, values unique.
    pub(crate) fn check(&self) -> Result<(), PayloadError> {
        if let QuestionKind::Scale { options } = self {
            if options.is_empty() {
                return Err(PayloadError::MissingOptions);
            }
            let mut seen = HashSet::new();
            if !options.iter().all(|o| seen.insert(o.value)) {
                return Err(PayloadError::DuplicateOptionValue);
            }
        }
        Ok(())
    }
}

/// A single question in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionPayload", into = "QuestionPayload")]
pub struct Question {
    id: QuestionId,
    prompt: String,
    kind: QuestionKind,
}

impl Question {
    /// Build a question, enforcing the scale option invariants.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        kind: QuestionKind,
    ) -> Result<Self, PayloadError> {
        kind.check()?;
        Ok(Question {
            id,
            prompt: prompt.into(),
            kind,
        })
    }

    pub fn scale(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<ScaleOption>,
    ) -> Result<Self, PayloadError> {
        Self::new(id, prompt, QuestionKind::Scale { options })
    }

    pub fn text(id: QuestionId, prompt: impl Into<String>, placeholder: Option<String>) -> Self {
        Question {
            id,
            prompt: prompt.into(),
            kind: QuestionKind::Text { placeholder },
        }
    }

    pub fn id(&self) -> QuestionId {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    /// Declared options; empty for text questions.
    pub fn options(&self) -> &[ScaleOption] {
        match &self.kind {
            QuestionKind::Scale { options } => options,
            QuestionKind::Text { .. } => &[],
        }
    }

    /// The option whose value equals `value`, if any.
    pub fn option_for(&self, value: i64) -> Option<&ScaleOption> {
        self.options().iter().find(|o| o.value == value)
    }

    pub fn is_scale(&self) -> bool {
        matches!(self.kind, QuestionKind::Scale { .. })
    }

    /// Assemble a question whose kind has already been checked.
    pub(crate) fn from_parts(id: QuestionId, prompt: impl Into<String>, kind: QuestionKind) -> Self {
        Question {
            id,
            prompt: prompt.into(),
            kind,
        }
    }
}

// ──────────────────────────────────────────────
// Answers
// ──────────────────────────────────────────────

/// Raw answer value as entered by the respondent.
///
/// Serialized untagged: a JSON number for scale choices, a string for text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Choice(i64),
    Text(String),
}

impl AnswerValue {
    pub fn as_choice(&self) -> Option<i64> {
        match self {
            AnswerValue::Choice(v) => Some(*v),
            AnswerValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            AnswerValue::Choice(_) => None,
        }
    }
}

impl From<i64> for AnswerValue {
    fn from(v: i64) -> Self {
        AnswerValue::Choice(v)
    }
}

impl From<i32> for AnswerValue {
    fn from(v: i32) -> Self {
        AnswerValue::Choice(i64::from(v))
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        AnswerValue::Text(s)
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

/// An answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "questionId")]
    pub question_id: QuestionId,
    #[serde(rename = "answer")]
    pub value: AnswerValue,
}

impl Answer {
    pub fn new(question_id: QuestionId, value: impl Into<AnswerValue>) -> Self {
        Answer {
            question_id,
            value: value.into(),
        }
    }
}

// ──────────────────────────────────────────────
// Submission records
// ──────────────────────────────────────────────

/// The immutable result of one completed survey.
///
/// Fields are private: once constructed, a record is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    submission_id: String,
    group_id: String,
    answers: Vec<Answer>,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

impl SubmissionRecord {
    /// Build a record with a freshly generated submission id.
    pub fn new(
        group_id: impl Into<String>,
        answers: Vec<Answer>,
        timestamp: OffsetDateTime,
    ) -> Result<Self, ValidationError> {
        Self::with_id(uuid::Uuid::new_v4().to_string(), group_id, answers, timestamp)
    }

    /// Build a record with a caller-supplied submission id.
    ///
    /// Rejects a blank group id and answers that repeat a question id.
    pub fn with_id(
        submission_id: impl Into<String>,
        group_id: impl Into<String>,
        answers: Vec<Answer>,
        timestamp: OffsetDateTime,
    ) -> Result<Self, ValidationError> {
        let group_id = group_id.into();
        if crate::validate::is_blank(&group_id) {
            return Err(ValidationError::BlankGroupId);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = answers.iter().find(|a| !seen.insert(a.question_id)) {
            return Err(ValidationError::DuplicateAnswer {
                question_id: dup.question_id,
            });
        }
        Ok(SubmissionRecord {
            submission_id: submission_id.into(),
            group_id,
            answers,
            timestamp,
        })
    }

    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// The answer recorded for `question_id`, if any.
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&AnswerValue> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| &a.value)
    }
}
