use crate::error::CliError;
use crate::stores::Stores;
use crate::OutputFormat;

pub(crate) async fn cmd_report(
    stores: &Stores,
    group: Option<&str>,
    output: OutputFormat,
) -> Result<(), CliError> {
    let catalog = stores.load_catalog().await?;
    let records = stores.submissions.list_all().await?;
    let report = canvass_report::aggregate(&records, &catalog, group);

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", canvass_report::render_text(&report)),
    }
    Ok(())
}
