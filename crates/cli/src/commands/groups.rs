use crate::error::CliError;
use crate::stores::Stores;
use crate::OutputFormat;

pub(crate) async fn cmd_groups(stores: &Stores, output: OutputFormat) -> Result<(), CliError> {
    let records = stores.submissions.list_all().await?;
    let groups = canvass_report::group_ids(&records);

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&groups)?),
        OutputFormat::Text => {
            for g in groups {
                println!("{g}");
            }
        }
    }
    Ok(())
}
