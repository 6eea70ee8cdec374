//! Per-kind answer rules shared by the session gate and the boundary.

use crate::error::ValidationError;
use crate::model::{AnswerValue, Question, QuestionKind};

/// True when `s` is empty after trimming whitespace.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl Question {
    /// Check `answer` against this question's type rule.
    ///
    /// - Scale: an answer exists and its value equals a declared option value.
    /// - Text: an answer exists and is non-empty after trimming. Trimming is
    ///   only used for the check; callers keep the raw string.
    pub fn check_answer(&self, answer: Option<&AnswerValue>) -> Result<(), ValidationError> {
        let question_id = self.id();
        let answer = answer.ok_or(ValidationError::Unanswered { question_id })?;

        match (self.kind(), answer) {
            (QuestionKind::Scale { .. }, AnswerValue::Choice(value)) => {
                if self.option_for(*value).is_some() {
                    Ok(())
                } else {
                    Err(ValidationError::UnknownOption {
                        question_id,
                        value: *value,
                    })
                }
            }
            (QuestionKind::Text { .. }, AnswerValue::Text(text)) => {
                if is_blank(text) {
                    Err(ValidationError::BlankText { question_id })
                } else {
                    Ok(())
                }
            }
            (QuestionKind::Scale { .. }, AnswerValue::Text(_)) => Err(ValidationError::WrongKind {
                question_id,
                expected: "numeric option",
            }),
            (QuestionKind::Text { .. }, AnswerValue::Choice(_)) => Err(ValidationError::WrongKind {
                question_id,
                expected: "text",
            }),
        }
    }
}
