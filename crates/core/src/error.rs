use crate::model::QuestionId;

/// A respondent-correctable problem with a single field.
///
/// Every variant identifies the field it concerns; [`ValidationError::field`]
/// returns `"groupId"` or the offending question id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The group id is empty or whitespace-only.
    #[error("group id must not be blank")]
    BlankGroupId,

    /// The current question has no recorded answer.
    #[error("question {question_id} has not been answered")]
    Unanswered { question_id: QuestionId },

    /// A scale answer names a value no option declares.
    #[error("question {question_id}: {value} is not one of the offered options")]
    UnknownOption { question_id: QuestionId, value: i64 },

    /// A text answer is empty after trimming.
    #[error("question {question_id}: answer must not be blank")]
    BlankText { question_id: QuestionId },

    /// The answer has the wrong shape for the question kind.
    #[error("question {question_id} expects a {expected} answer")]
    WrongKind {
        question_id: QuestionId,
        expected: &'static str,
    },

    /// Two answers reference the same question.
    #[error("question {question_id} is answered more than once")]
    DuplicateAnswer { question_id: QuestionId },
}

impl ValidationError {
    /// The field this error is about: `"groupId"` or a question id.
    pub fn field(&self) -> String {
        match self {
            ValidationError::BlankGroupId => "groupId".to_string(),
            ValidationError::Unanswered { question_id }
            | ValidationError::UnknownOption { question_id, .. }
            | ValidationError::BlankText { question_id }
            | ValidationError::WrongKind { question_id, .. }
            | ValidationError::DuplicateAnswer { question_id } => question_id.to_string(),
        }
    }
}

/// Rejections produced while parsing JSON at the system boundary.
///
/// The `Display` text is user-facing and returned verbatim by the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("Invalid JSON format in request body")]
    InvalidJson,

    #[error("Missing required fields: submissionId, groupId, answers, or timestamp")]
    MissingSubmissionFields,

    #[error("Answers must be a non-empty array")]
    EmptyAnswers,

    #[error("GroupId cannot be empty")]
    BlankGroupId,

    #[error("Each answer must have a numeric questionId and a string or number answer")]
    MalformedAnswer,

    #[error("Answers must not repeat a questionId")]
    DuplicateAnswer,

    #[error("Timestamp must be an ISO-8601 date-time")]
    InvalidTimestamp,

    #[error("Missing required fields: text and type")]
    MissingQuestionFields,

    #[error("Missing required fields: id, text, and type")]
    MissingQuestionFieldsWithId,

    #[error("Invalid question type. Must be \"emoji_scale\" or \"text_input\"")]
    InvalidQuestionType,

    #[error("Emoji scale questions must have options")]
    MissingOptions,

    #[error("Option values must be unique within a question")]
    DuplicateOptionValue,

    #[error("Question ID is required")]
    MissingQuestionId,

    #[error("Invalid question ID")]
    InvalidQuestionId,
}

/// Errors from catalog construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// No question with this id exists.
    #[error("Question not found")]
    NotFound { id: QuestionId },

    /// Two questions share an id.
    #[error("duplicate question id {id}")]
    DuplicateId { id: QuestionId },

    /// A question definition failed validation.
    #[error(transparent)]
    Definition(#[from] PayloadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_identifies_group_or_question() {
        assert_eq!(ValidationError::BlankGroupId.field(), "groupId");
        assert_eq!(
            ValidationError::UnknownOption {
                question_id: 7,
                value: 9
            }
            .field(),
            "7"
        );
        assert_eq!(ValidationError::BlankText { question_id: 2 }.field(), "2");
    }

    #[test]
    fn payload_messages_are_distinct() {
        let messages = [
            PayloadError::MissingSubmissionFields.to_string(),
            PayloadError::EmptyAnswers.to_string(),
            PayloadError::BlankGroupId.to_string(),
        ];
        assert_eq!(messages[0], "Missing required fields: submissionId, groupId, answers, or timestamp");
        assert_eq!(messages[1], "Answers must be a non-empty array");
        assert_eq!(messages[2], "GroupId cannot be empty");
    }

    #[test]
    fn not_found_message() {
        assert_eq!(CatalogError::NotFound { id: 3 }.to_string(), "Question not found");
    }
}
