//! The question catalog: an ordered list of questions with unique ids.
//!
//! One `Catalog` is loaded at startup and shared by reference with every
//! survey session and every aggregation run, so collection and reporting
//! always see the same definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, PayloadError};
use crate::model::{Question, QuestionId, QuestionKind, ScaleOption};

/// A validated question that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    prompt: String,
    kind: QuestionKind,
}

impl QuestionDraft {
    pub fn new(prompt: impl Into<String>, kind: QuestionKind) -> Result<Self, PayloadError> {
        kind.check()?;
        Ok(QuestionDraft {
            prompt: prompt.into(),
            kind,
        })
    }
}

/// Ordered, id-unique sequence of questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Question>", into = "Vec<Question>")]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        if let Some(dup) = questions.iter().find(|q| !seen.insert(q.id())) {
            return Err(CatalogError::DuplicateId { id: dup.id() });
        }
        Ok(Catalog { questions })
    }

    /// Built-in catalog used when no catalog file has been written yet.
    pub fn default_questions() -> Self {
        let satisfaction = Question::from_parts(
            1,
            "Overall, how satisfied are you at work?",
            QuestionKind::Scale {
                options: vec![
                    ScaleOption::new(1, "Very dissatisfied"),
                    ScaleOption::new(2, "Dissatisfied"),
                    ScaleOption::new(3, "Neutral"),
                    ScaleOption::new(4, "Satisfied"),
                    ScaleOption::new(5, "Very satisfied"),
                ],
            },
        );
        let communication = Question::text(
            2,
            "What could concretely improve communication within your team?",
            Some("Type your answer here...".to_string()),
        );
        Catalog {
            questions: vec![satisfaction, communication],
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    /// Index of the question with `id` in catalog order.
    pub fn position(&self, id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id() == id)
    }

    /// Next id to hand out: one past the largest id in use, or 1.
    fn next_id(&self) -> QuestionId {
        self.questions.iter().map(Question::id).max().map_or(1, |max| max + 1)
    }

    /// Append a new question and return it with its assigned id.
    pub fn add(&mut self, draft: QuestionDraft) -> &Question {
        let question = Question::from_parts(self.next_id(), draft.prompt, draft.kind);
        self.questions.push(question);
        &self.questions[self.questions.len() - 1]
    }

    /// Replace the question that has the same id, keeping its position.
    pub fn update(&mut self, question: Question) -> Result<&Question, CatalogError> {
        let index = self
            .position(question.id())
            .ok_or(CatalogError::NotFound { id: question.id() })?;
        self.questions[index] = question;
        Ok(&self.questions[index])
    }

    /// Remove and return the question with `id`.
    pub fn remove(&mut self, id: QuestionId) -> Result<Question, CatalogError> {
        let index = self.position(id).ok_or(CatalogError::NotFound { id })?;
        Ok(self.questions.remove(index))
    }
}

impl TryFrom<Vec<Question>> for Catalog {
    type Error = CatalogError;

    fn try_from(questions: Vec<Question>) -> Result<Self, Self::Error> {
        Catalog::new(questions)
    }
}

impl From<Catalog> for Vec<Question> {
    fn from(catalog: Catalog) -> Self {
        catalog.questions
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}
