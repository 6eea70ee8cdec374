//! `canvass take` -- answer the survey interactively on the terminal.
//!
//! Drives one [`SurveySession`] from line-based input. Invalid answers are
//! reported and the same question is asked again; a failed save offers a
//! retry.

use std::io::{BufRead, Write};

use canvass_core::{Catalog, QuestionKind, SubmissionRecord};
use canvass_session::{Phase, SessionError, SurveySession};
use canvass_storage::SubmissionStore;

#[derive(Debug, thiserror::Error)]
pub(crate) enum TakeError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("survey abandoned before it was submitted")]
    Abandoned,
}

/// Run one session for `group` against `input`/`out` and submit it.
pub(crate) async fn run_take<R, W>(
    catalog: &Catalog,
    store: &dyn SubmissionStore,
    group: &str,
    input: &mut R,
    out: &mut W,
) -> Result<SubmissionRecord, TakeError>
where
    R: BufRead,
    W: Write,
{
    let mut session = SurveySession::new(catalog);
    session.start(group)?;

    writeln!(
        out,
        "Survey for group '{group}': {} question(s). Press Enter to begin.",
        catalog.len()
    )?;
    read_line(input, out)?;
    session.acknowledge()?;

    while let Some(question) = session.current_question() {
        writeln!(out)?;
        writeln!(out, "[{:>3}%] {}", session.progress(), question.prompt())?;
        match question.kind() {
            QuestionKind::Scale { options } => {
                for o in options {
                    writeln!(out, "  {}) {}", o.value, o.label)?;
                }
            }
            QuestionKind::Text {
                placeholder: Some(hint),
            } => writeln!(out, "  ({hint})")?,
            QuestionKind::Text { placeholder: None } => {}
        }

        let line = read_line(input, out)?;
        if question.is_scale() {
            match line.trim().parse::<i64>() {
                Ok(value) => session.record_answer(value)?,
                Err(_) => session.record_answer(line)?,
            }
        } else {
            session.record_answer(line)?;
        }

        match session.advance() {
            Ok(()) => {}
            Err(SessionError::Validation(e)) => writeln!(out, "  ! {e}")?,
            Err(e) => return Err(e.into()),
        }
    }

    debug_assert_eq!(session.phase(), &Phase::Completed);
    loop {
        match session.submit(store).await {
            Ok(record) => {
                writeln!(out)?;
                writeln!(out, "Thank you! Submission {} saved.", record.submission_id())?;
                return Ok(record);
            }
            Err(SessionError::Store(e)) => {
                writeln!(out, "Could not save your answers: {e}")?;
                write!(out, "Retry? [Y/n] ")?;
                out.flush()?;
                let reply = read_line(input, out)?;
                if reply.trim().eq_ignore_ascii_case("n") {
                    return Err(TakeError::Abandoned);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Read one line without its terminator. End of input abandons the survey.
fn read_line<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<String, TakeError> {
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(TakeError::Abandoned);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}
