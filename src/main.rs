use std::{ffi::OsString, path::PathBuf};

use clap::Parser;
use ingestion::{
    existing_documents::QUERY_PAGE_SIZE, ingest, submitter::RetryPolicy, IngestRequest,
};
use model::{
    cli_error::CliError,
    cli_output::{CliResult, OutputFormat},
    credentials::CredentialSet,
    run_summary::RunSummary,
};
use services::discovery_api::DiscoveryApiClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod hash;
mod ingestion;
mod model;
mod services;
mod token_cache;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Send files into Watson Discovery", long_about = None)]
struct Cli {
    /// File or directory of files to send to Discovery
    #[clap(required = true)]
    path: Vec<PathBuf>,
    /// JSON file containing Discovery service credentials
    #[clap(long, visible_alias = "json", default_value = "credentials.json")]
    credentials: PathBuf,
    /// Discovery collection_id; defaults to an existing collection, when there is only one
    #[clap(long)]
    collection_id: Option<String>,
    /// Discovery environment_id; defaults to the first writable environment
    #[clap(long)]
    environment_id: Option<String>,
    /// Don't ingest anything; just report what would be ingested
    #[clap(long)]
    dry_run: bool,
    /// Set the output format of the final summary
    #[clap(value_enum, long, default_value = "text")]
    format: OutputFormat,
    /// How many times to retry a file that was rejected for rate limiting
    #[clap(long, default_value = "3")]
    max_retries: u32,
    /// How long to wait before retrying a rate-limited file, e.g. "5s" or "1m"
    #[clap(long, default_value = "5s")]
    retry_delay: humantime::Duration,
}

const LONG_OPTIONS: &[&str] = &[
    "credentials",
    "json",
    "collection-id",
    "environment-id",
    "dry-run",
    "format",
    "max-retries",
    "retry-delay",
    "help",
    "version",
];

/// Rewrite single-dash long options (`-collection_id`) into the `--collection-id`
/// form clap understands. Anything after `--` is left alone.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut normalized = Vec::new();
    let mut options_done = false;

    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || options_done {
            normalized.push(arg);
            continue;
        }

        match arg.to_str() {
            Some("--") => {
                options_done = true;
                normalized.push(arg);
            }
            Some(s) => match normalize_option(s) {
                Some(option) => normalized.push(option.into()),
                None => normalized.push(arg),
            },
            None => normalized.push(arg),
        }
    }

    normalized
}

fn normalize_option(arg: &str) -> Option<String> {
    let stripped = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-'))?;
    let (name, value) = match stripped.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (stripped, None),
    };

    let name = name.replace('_', "-");
    if !LONG_OPTIONS.contains(&name.as_str()) {
        return None;
    }

    Some(match value {
        Some(value) => format!("--{}={}", name, value),
        None => format!("--{}", name),
    })
}

async fn run(cli: Cli) -> Result<RunSummary, CliError> {
    let credentials = CredentialSet::load(&cli.credentials)?;
    info!(url = %credentials.url, version = %credentials.version, "Credentials loaded");

    let client = DiscoveryApiClient::new(&credentials)?;

    let request = IngestRequest {
        paths: cli.path,
        environment_id: cli.environment_id.or(credentials.environment_id),
        collection_id: cli.collection_id.or(credentials.collection_id),
        dry_run: cli.dry_run,
        retry: RetryPolicy {
            max_retries: cli.max_retries,
            delay: *cli.retry_delay,
        },
        page_size: QUERY_PAGE_SIZE,
        format: cli.format,
    };

    let summary = ingest(&client, &request).await?;
    info!(
        skipped = summary.skipped,
        attempted = summary.attempted,
        ingested = summary.ingested,
        failed = summary.failed(),
        "Run complete"
    );

    Ok(summary)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let format = cli.format;

    CliResult::new(run(cli).await).print_or_exit(format);
}
