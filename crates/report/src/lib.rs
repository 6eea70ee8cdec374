//! Aggregation of submission records into a per-question report.
//!
//! [`aggregate`] is pure: it reads a snapshot of records and the catalog and
//! never fails. Answers that no longer fit the catalog (unknown question,
//! value no option declares, wrong shape) are skipped so that editing the
//! catalog after collection never breaks historical reports.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use canvass_core::{AnswerValue, Catalog, Question, QuestionId, QuestionKind, SubmissionRecord};
use serde::Serialize;

/// Counts and percentages over a set of submissions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Submissions matching the group filter; denominator for every scale.
    pub total: usize,
    /// The group filter applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Every group id present in the unfiltered input, sorted.
    pub groups: Vec<String>,
    /// One entry per catalog question, in catalog order.
    pub questions: Vec<QuestionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: QuestionId,
    #[serde(rename = "text")]
    pub prompt: String,
    #[serde(flatten)]
    pub breakdown: Breakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Breakdown {
    #[serde(rename = "emoji_scale")]
    Scale { options: Vec<OptionResult> },
    #[serde(rename = "text_input")]
    Text { answers: Vec<String>, count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionResult {
    pub label: String,
    pub value: i64,
    pub count: usize,
    /// `count / total * 100` rounded to one decimal; 0.0 when `total` is 0.
    pub percentage: f64,
}

/// Reduce `submissions` to per-question statistics for `catalog`.
///
/// With `group`, only records whose group id equals it exactly are counted.
pub fn aggregate(
    submissions: &[SubmissionRecord],
    catalog: &Catalog,
    group: Option<&str>,
) -> Report {
    let selected: Vec<&SubmissionRecord> = submissions
        .iter()
        .filter(|r| group.map_or(true, |g| r.group_id() == g))
        .collect();
    let total = selected.len();

    let questions = catalog
        .iter()
        .map(|question| QuestionResult {
            question_id: question.id(),
            prompt: question.prompt().to_string(),
            breakdown: match question.kind() {
                QuestionKind::Scale { .. } => scale_breakdown(question, &selected, total),
                QuestionKind::Text { .. } => text_breakdown(question, &selected),
            },
        })
        .collect();

    Report {
        total,
        group: group.map(str::to_string),
        groups: group_ids(submissions),
        questions,
    }
}

/// Sorted distinct group ids across `submissions`.
pub fn group_ids(submissions: &[SubmissionRecord]) -> Vec<String> {
    submissions
        .iter()
        .map(|r| r.group_id().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn scale_breakdown(question: &Question, selected: &[&SubmissionRecord], total: usize) -> Breakdown {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for record in selected {
        if let Some(value) = record.answer_for(question.id()).and_then(AnswerValue::as_choice) {
            if question.option_for(value).is_some() {
                *counts.entry(value).or_default() += 1;
            }
        }
    }

    let options = question
        .options()
        .iter()
        .map(|option| {
            let count = counts.get(&option.value).copied().unwrap_or(0);
            OptionResult {
                label: option.label.clone(),
                value: option.value,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();
    Breakdown::Scale { options }
}

fn text_breakdown(question: &Question, selected: &[&SubmissionRecord]) -> Breakdown {
    let answers: Vec<String> = selected
        .iter()
        .filter_map(|r| r.answer_for(question.id()).and_then(AnswerValue::as_text))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .collect();
    Breakdown::Text {
        count: answers.len(),
        answers,
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Plain-text listing of a report.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let scope = report.group.as_deref().unwrap_or("all groups");
    let _ = writeln!(out, "Results for {scope}: {} submission(s)", report.total);
    if !report.groups.is_empty() {
        let _ = writeln!(out, "Groups: {}", report.groups.join(", "));
    }

    for q in &report.questions {
        let _ = writeln!(out);
        let _ = writeln!(out, "[{}] {}", q.question_id, q.prompt);
        match &q.breakdown {
            Breakdown::Scale { options } => {
                let width = options.iter().map(|o| o.label.len()).max().unwrap_or(0);
                for o in options {
                    let _ = writeln!(
                        out,
                        "  {:<width$}  {:>4}  {:>5.1}%",
                        o.label, o.count, o.percentage
                    );
                }
            }
            Breakdown::Text { answers, count } => {
                let _ = writeln!(out, "  {count} answer(s)");
                for a in answers {
                    let _ = writeln!(out, "  - {a}");
                }
            }
        }
    }
    out
}
