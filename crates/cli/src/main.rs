mod commands;
mod config;
mod error;
mod serve;
mod stores;
mod take;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::error::CliError;
use crate::stores::Stores;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Collect grouped survey responses and report on them.
#[derive(Parser)]
#[command(name = "canvass", version, about = "Grouped survey collection and reporting")]
struct Cli {
    /// Path to a canvass.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base directory for relative storage paths
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log debug events to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Answer the survey interactively and submit it
    Take {
        /// Group (team, cohort) the answers belong to
        #[arg(long)]
        group: String,
    },

    /// Print aggregated results
    Report {
        /// Only count submissions from this group
        #[arg(long)]
        group: Option<String>,
    },

    /// List the question catalog
    Questions,

    /// List the groups that have submitted
    Groups,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match Config::load(cli.config.as_deref(), cli.data_dir.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&e.to_string(), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("failed to start async runtime: {e}"), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(cli.command, config, cli.output)) {
        report_error(&e.to_string(), cli.output, cli.quiet);
        process::exit(1);
    }
}

async fn run(command: Commands, config: Config, output: OutputFormat) -> Result<(), CliError> {
    let stores = Stores::open(&config.storage);

    match command {
        Commands::Serve { port } => {
            let catalog = stores.load_catalog().await?;
            let port = port.unwrap_or(config.server.port);
            serve::start_server(port, config.server.rate_limit, stores, catalog)
                .await
                .map_err(|e| CliError::Serve(e.to_string()))
        }
        Commands::Take { group } => {
            let catalog = stores.load_catalog().await?;
            let record = {
                let mut input = io::stdin().lock();
                let mut out = io::stdout().lock();
                take::run_take(&catalog, stores.submissions.as_ref(), &group, &mut input, &mut out)
                    .await?
            };
            if output == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            Ok(())
        }
        Commands::Report { group } => {
            commands::cmd_report(&stores, group.as_deref(), output).await
        }
        Commands::Questions => commands::cmd_questions(&stores, output).await,
        Commands::Groups => commands::cmd_groups(&stores, output).await,
    }
}

/// Logs go to stderr so stdout stays clean for command output.
/// `RUST_LOG` overrides the default filter.
fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        "canvass=debug"
    } else if cli.quiet {
        "canvass=error"
    } else if matches!(cli.command, Commands::Serve { .. }) {
        "canvass=info"
    } else {
        "canvass=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(io::stderr),
        )
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
