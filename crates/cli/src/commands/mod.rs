//! One-shot read commands: `report`, `questions`, `groups`.

mod groups;
mod questions;
mod report;

pub(crate) use groups::cmd_groups;
pub(crate) use questions::cmd_questions;
pub(crate) use report::cmd_report;
