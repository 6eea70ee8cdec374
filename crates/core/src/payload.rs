//! Boundary payloads: submission JSON and question definition JSON.
//!
//! Submissions are walked as a `serde_json::Value` rather than derived so
//! that each rejection maps to its own user-facing [`PayloadError`]. A field
//! counts as missing when it is absent, `null`, `false`, `0` or `""`, which
//! is what browser clients treat as "not filled in".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::catalog::QuestionDraft;
use crate::error::{PayloadError, ValidationError};
use crate::model::{Answer, AnswerValue, Question, QuestionId, QuestionKind, ScaleOption};

// ──────────────────────────────────────────────
// Submission payload
// ──────────────────────────────────────────────

/// Parse and validate a submission request body.
pub fn parse_submission(body: &str) -> Result<crate::SubmissionRecord, PayloadError> {
    let value: Value = serde_json::from_str(body).map_err(|_| PayloadError::InvalidJson)?;
    submission_from_value(&value)
}

/// Validate an already-decoded submission payload.
///
/// Checks run in a fixed order: required fields, answers array, group id,
/// answer entries, timestamp format.
pub fn submission_from_value(payload: &Value) -> Result<crate::SubmissionRecord, PayloadError> {
    let field = |name: &str| payload.get(name).filter(|v| is_present(v));

    let (Some(submission_id), Some(group_id), Some(answers), Some(timestamp)) = (
        field("submissionId"),
        field("groupId"),
        field("answers"),
        field("timestamp"),
    ) else {
        return Err(PayloadError::MissingSubmissionFields);
    };

    let answers = match answers.as_array() {
        Some(arr) if !arr.is_empty() => arr,
        _ => return Err(PayloadError::EmptyAnswers),
    };

    let group_id = group_id.as_str().ok_or(PayloadError::BlankGroupId)?;
    if crate::validate::is_blank(group_id) {
        return Err(PayloadError::BlankGroupId);
    }

    let submission_id = match submission_id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let answers = answers
        .iter()
        .map(parse_answer)
        .collect::<Result<Vec<_>, _>>()?;

    let timestamp = timestamp
        .as_str()
        .and_then(|s| OffsetDateTime::parse(s, &Rfc3339).ok())
        .ok_or(PayloadError::InvalidTimestamp)?;

    crate::SubmissionRecord::with_id(submission_id, group_id, answers, timestamp).map_err(|e| {
        match e {
            ValidationError::DuplicateAnswer { .. } => PayloadError::DuplicateAnswer,
            _ => PayloadError::BlankGroupId,
        }
    })
}

fn parse_answer(entry: &Value) -> Result<Answer, PayloadError> {
    let question_id = entry
        .get("questionId")
        .and_then(Value::as_u64)
        .ok_or(PayloadError::MalformedAnswer)?;
    let value = match entry.get("answer") {
        Some(Value::String(s)) => AnswerValue::Text(s.clone()),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(whole_number))
            .map(AnswerValue::Choice)
            .ok_or(PayloadError::MalformedAnswer)?,
        _ => return Err(PayloadError::MalformedAnswer),
    };
    Ok(Answer { question_id, value })
}

/// `4.0` is the number 4 on the wire; `4.5` is not an option value.
fn whole_number(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

/// JavaScript-style truthiness.
fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ──────────────────────────────────────────────
// Question definition payload
// ──────────────────────────────────────────────

/// Wire form of a question: `{id, type, text, options?, placeholder?}`.
///
/// Every field is optional so that incomplete requests can be reported
/// with the specific message the API promises.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuestionId>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ScaleOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl QuestionPayload {
    /// Validate as a new question. Any `id` is ignored; the catalog assigns one.
    pub fn into_draft(self) -> Result<QuestionDraft, PayloadError> {
        let (Some(text), Some(kind)) = (non_empty(self.text), non_empty(self.kind)) else {
            return Err(PayloadError::MissingQuestionFields);
        };
        let kind = decode_kind(&kind, self.options, self.placeholder)?;
        QuestionDraft::new(text, kind)
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

fn decode_kind(
    kind: &str,
    options: Option<Vec<ScaleOption>>,
    placeholder: Option<String>,
) -> Result<QuestionKind, PayloadError> {
    match kind {
        QuestionKind::SCALE_WIRE_NAME => Ok(QuestionKind::Scale {
            options: options.unwrap_or_default(),
        }),
        QuestionKind::TEXT_WIRE_NAME => Ok(QuestionKind::Text { placeholder }),
        _ => Err(PayloadError::InvalidQuestionType),
    }
}

impl TryFrom<QuestionPayload> for Question {
    type Error = PayloadError;

    fn try_from(payload: QuestionPayload) -> Result<Self, Self::Error> {
        let (Some(id), Some(text), Some(kind)) = (
            payload.id.filter(|id| *id != 0),
            non_empty(payload.text),
            non_empty(payload.kind),
        ) else {
            return Err(PayloadError::MissingQuestionFieldsWithId);
        };
        let kind = decode_kind(&kind, payload.options, payload.placeholder)?;
        Question::new(id, text, kind)
    }
}

impl From<Question> for QuestionPayload {
    fn from(q: Question) -> Self {
        let kind = q.kind().wire_name().to_string();
        let (options, placeholder) = match q.kind() {
            QuestionKind::Scale { options } => (Some(options.clone()), None),
            QuestionKind::Text { placeholder } => (None, placeholder.clone()),
        };
        QuestionPayload {
            id: Some(q.id()),
            kind: Some(kind),
            text: Some(q.prompt().to_string()),
            options,
            placeholder,
        }
    }
}

/// Parse the `id` query parameter of a delete request.
pub fn parse_question_id(raw: Option<&str>) -> Result<QuestionId, PayloadError> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or(PayloadError::MissingQuestionId)?;
    raw.trim()
        .parse::<QuestionId>()
        .map_err(|_| PayloadError::InvalidQuestionId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "submissionId": "4f7c",
            "groupId": "Team A",
            "answers": [
                {"questionId": 1, "answer": 4},
                {"questionId": 2, "answer": "  more standups  "}
            ],
            "timestamp": "2025-06-01T09:30:00.000Z"
        })
    }

    #[test]
    fn accepts_well_formed_submission() {
        let record = submission_from_value(&valid()).unwrap();
        assert_eq!(record.submission_id(), "4f7c");
        assert_eq!(record.group_id(), "Team A");
        assert_eq!(record.answers().len(), 2);
        assert_eq!(
            record.answer_for(2),
            Some(&AnswerValue::from("  more standups  "))
        );
    }

    #[test]
    fn each_required_field_is_checked() {
        for field in ["submissionId", "groupId", "answers", "timestamp"] {
            let mut payload = valid();
            payload.as_object_mut().unwrap().remove(field);
            assert_eq!(
                submission_from_value(&payload).unwrap_err(),
                PayloadError::MissingSubmissionFields,
                "removing {field}"
            );
        }
    }

    #[test]
    fn empty_answers_rejected() {
        let mut payload = valid();
        payload["answers"] = json!([]);
        assert_eq!(
            submission_from_value(&payload).unwrap_err(),
            PayloadError::EmptyAnswers
        );
        payload["answers"] = json!({"questionId": 1});
        assert_eq!(
            submission_from_value(&payload).unwrap_err(),
            PayloadError::EmptyAnswers
        );
    }

    #[test]
    fn blank_group_rejected() {
        let mut payload = valid();
        payload["groupId"] = json!("   ");
        assert_eq!(
            submission_from_value(&payload).unwrap_err(),
            PayloadError::BlankGroupId
        );
    }

    #[test]
    fn empty_group_string_counts_as_missing() {
        let mut payload = valid();
        payload["groupId"] = json!("");
        assert_eq!(
            submission_from_value(&payload).unwrap_err(),
            PayloadError::MissingSubmissionFields
        );
    }

    #[test]
    fn malformed_answer_rejected() {
        let mut payload = valid();
        payload["answers"] = json!([{"questionId": "one", "answer": 1}]);
        assert_eq!(
            submission_from_value(&payload).unwrap_err(),
            PayloadError::MalformedAnswer
        );
        payload["answers"] = json!([{"questionId": 1, "answer": true}]);
        assert_eq!(
            submission_from_value(&payload).unwrap_err(),
            PayloadError::MalformedAnswer
        );
    }

    #[test]
    fn integral_float_answer_is_a_choice() {
        let mut payload = valid();
        payload["answers"] = json!([{"questionId": 1, "answer": 4.0}]);
        let record = submission_from_value(&payload).unwrap();
        assert_eq!(record.answer_for(1), Some(&AnswerValue::Choice(4)));

        payload["answers"] = json!([{"questionId": 1, "answer": 4.5}]);
        assert_eq!(
            submission_from_value(&payload).unwrap_err(),
            PayloadError::MalformedAnswer
        );
    }

    #[test]
    fn repeated_question_rejected() {
        let mut payload = valid();
        payload["answers"] = json!([
            {"questionId": 1, "answer": 1},
            {"questionId": 1, "answer": 2}
        ]);
        assert_eq!(
            submission_from_value(&payload).unwrap_err(),
            PayloadError::DuplicateAnswer
        );
    }

    #[test]
    fn bad_timestamp_rejected() {
        let mut payload = valid();
        payload["timestamp"] = json!("yesterday");
        assert_eq!(
            submission_from_value(&payload).unwrap_err(),
            PayloadError::InvalidTimestamp
        );
    }

    #[test]
    fn invalid_json_rejected() {
        assert_eq!(
            parse_submission("{not json").unwrap_err(),
            PayloadError::InvalidJson
        );
    }

    #[test]
    fn draft_requires_text_and_type() {
        let payload = QuestionPayload {
            text: Some("Anything else?".to_string()),
            ..Default::default()
        };
        assert_eq!(
            payload.into_draft().unwrap_err(),
            PayloadError::MissingQuestionFields
        );
    }

    #[test]
    fn draft_rejects_unknown_type() {
        let payload: QuestionPayload =
            serde_json::from_value(json!({"text": "Rate", "type": "slider"})).unwrap();
        assert_eq!(
            payload.into_draft().unwrap_err(),
            PayloadError::InvalidQuestionType
        );
    }

    #[test]
    fn draft_scale_needs_options() {
        let payload: QuestionPayload =
            serde_json::from_value(json!({"text": "Rate", "type": "emoji_scale", "options": []}))
                .unwrap();
        assert_eq!(payload.into_draft().unwrap_err(), PayloadError::MissingOptions);
    }

    #[test]
    fn full_question_requires_id() {
        let payload: QuestionPayload =
            serde_json::from_value(json!({"text": "Why?", "type": "text_input"})).unwrap();
        assert_eq!(
            Question::try_from(payload).unwrap_err(),
            PayloadError::MissingQuestionFieldsWithId
        );
    }

    #[test]
    fn question_id_param() {
        assert_eq!(parse_question_id(None), Err(PayloadError::MissingQuestionId));
        assert_eq!(parse_question_id(Some("")), Err(PayloadError::MissingQuestionId));
        assert_eq!(parse_question_id(Some("abc")), Err(PayloadError::InvalidQuestionId));
        assert_eq!(parse_question_id(Some("12")), Ok(12));
    }
}
