use std::io::Write as _;

use clap::{Parser, Subcommand, ValueEnum};
use leadscout_core::{AppConfig, ValidationOutcome};
use leadscout_pipeline::RunRequest;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "leadscout")]
#[command(about = "Discover business phone leads and check their messaging reachability")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the web for businesses in a city and extract their phones
    Run {
        /// City or locality to search (at least 2 characters)
        #[arg(long)]
        city: String,
        /// Business segment, e.g. "dentista"
        #[arg(long)]
        segment: Option<String>,
        /// Number of leads wanted (clamped to the configured maximum)
        #[arg(long)]
        total: Option<usize>,
        /// Check reachability of every lead before printing
        #[arg(long)]
        validate: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Check reachability of caller-supplied phone numbers
    Validate {
        /// Phone numbers in any common notation
        #[arg(required = true)]
        numbers: Vec<String>,
    },
    /// Show the validation provider and search sources in use
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    results: Vec<ValidationOutcome>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOutput {
    validation_provider: String,
    search_mode: Vec<&'static str>,
    region: &'static str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = leadscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            city,
            segment,
            total,
            validate,
            format,
        } => {
            let request = run_request(city, segment, total, validate);
            let result = leadscout_pipeline::run_discovery(&config, request).await?;
            tracing::info!(query = result.query.as_str(), total = result.total, "run complete");
            match format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Csv => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(result.csv.as_bytes())?;
                    stdout.flush()?;
                }
            }
        }
        Commands::Validate { numbers } => {
            let results = leadscout_pipeline::validate_numbers(&config, &numbers).await?;
            print_json(&ValidateOutput { results })?;
        }
        Commands::Status => print_json(&status(&config))?,
    }

    Ok(())
}

fn run_request(
    city: String,
    segment: Option<String>,
    total: Option<usize>,
    validate: bool,
) -> RunRequest {
    RunRequest {
        locality: city,
        segment,
        requested_volume: total,
        validate: validate.then_some(true),
    }
}

fn status(config: &AppConfig) -> StatusOutput {
    StatusOutput {
        validation_provider: config.validation_provider.to_string(),
        search_mode: leadscout_pipeline::search_mode(config),
        region: config.default_region.code(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
