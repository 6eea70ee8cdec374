use canvass_core::QuestionKind;

use crate::error::CliError;
use crate::stores::Stores;
use crate::OutputFormat;

pub(crate) async fn cmd_questions(stores: &Stores, output: OutputFormat) -> Result<(), CliError> {
    let catalog = stores.load_catalog().await?;

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    for q in &catalog {
        println!("[{}] ({}) {}", q.id(), q.kind().wire_name(), q.prompt());
        match q.kind() {
            QuestionKind::Scale { options } => {
                for o in options {
                    println!("    {} = {}", o.value, o.label);
                }
            }
            QuestionKind::Text {
                placeholder: Some(hint),
            } => println!("    placeholder: {hint}"),
            QuestionKind::Text { placeholder: None } => {}
        }
    }
    Ok(())
}
