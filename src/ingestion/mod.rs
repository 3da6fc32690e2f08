pub mod collection_resolver;
pub mod existing_documents;
pub mod path_resolver;
pub mod submitter;

#[cfg(test)]
pub mod fake;

use std::{collections::HashSet, path::PathBuf};

use tracing::{info, warn};

use crate::{
    hash::hash_file,
    model::{
        cli_error::CliError,
        cli_output::OutputFormat,
        file_entry::FileEntry,
        ingest_outcome::{ErrorCode, IngestOutcome, SkipReason},
        resource_id::CollectionRef,
        run_summary::RunSummary,
    },
    services::discovery::DiscoveryService,
};

use collection_resolver::resolve_collection;
use existing_documents::existing_sha1s;
use path_resolver::resolve_paths;
use submitter::{submit_file, RetryPolicy};

pub struct IngestRequest {
    pub paths: Vec<PathBuf>,
    pub environment_id: Option<String>,
    pub collection_id: Option<String>,
    pub dry_run: bool,
    pub retry: RetryPolicy,
    pub page_size: u64,
    pub format: OutputFormat,
}

/// A file that still has to be sent, with the document id it is sent as.
struct Pending {
    file: FileEntry,
    sha1: String,
}

fn unsupported_kind(file: &FileEntry) -> Option<&'static str> {
    match file.extension().as_deref() {
        Some("csv") => Some("CSV"),
        Some("tar") => Some("Tar"),
        Some("zip") => Some("Zip"),
        _ => None,
    }
}

/// Decide for one file whether it is skipped or has to be sent.
fn classify(
    file: FileEntry,
    indexed: &HashSet<String>,
    format: OutputFormat,
) -> Result<Pending, (FileEntry, IngestOutcome)> {
    if let Some(kind) = unsupported_kind(&file) {
        format.progress(format_args!(
            "{} files are not yet supported. Ignoring {}",
            kind,
            file.path.display()
        ));
        return Err((file, IngestOutcome::Skipped(SkipReason::Unsupported(kind))));
    }

    match hash_file(&file.path) {
        Ok(sha1) if indexed.contains(&sha1) => {
            Err((file, IngestOutcome::Skipped(SkipReason::AlreadyPresent)))
        }
        Ok(sha1) => Ok(Pending { file, sha1 }),
        Err(e) => {
            format.progress(format_args!("Failing {} due to {}", file.path.display(), e));
            let outcome = IngestOutcome::Failed {
                code: ErrorCode::Unknown,
                message: e.to_string(),
            };
            Err((file, outcome))
        }
    }
}

/// Send every new file under `request.paths` to the target collection, one at a time.
///
/// Anything that goes wrong before the first submission is returned as an
/// error. Per-file failures are tallied in the summary instead.
pub async fn ingest(
    service: &impl DiscoveryService,
    request: &IngestRequest,
) -> Result<RunSummary, CliError> {
    let collection = resolve_collection(
        service,
        request.environment_id.as_deref(),
        request.collection_id.as_deref(),
    )
    .await?;

    let files = resolve_paths(&request.paths)?;
    info!(files = files.len(), "Resolved input paths");

    let indexed = existing_sha1s(service, &collection, request.page_size).await?;

    let mut summary = RunSummary::default();
    let mut pending = Vec::new();
    let mut failed_early = Vec::new();

    for file in files {
        match classify(file, &indexed, request.format) {
            Ok(p) => pending.push(p),
            Err((_, outcome @ IngestOutcome::Skipped(_))) => summary.record(&outcome),
            Err((file, outcome)) => failed_early.push((file, outcome)),
        }
    }

    request.format.progress(RunSummary::plan(
        summary.skipped,
        pending.len() + failed_early.len(),
    ));

    for (file, outcome) in &failed_early {
        warn!(path = %file.path.display(), "Could not hash file");
        summary.record(outcome);
    }

    submit_all(service, &collection, pending, request, &mut summary).await;

    Ok(summary)
}

async fn submit_all(
    service: &impl DiscoveryService,
    collection: &CollectionRef,
    pending: Vec<Pending>,
    request: &IngestRequest,
    summary: &mut RunSummary,
) {
    for Pending { file, sha1 } in pending {
        if request.dry_run {
            request
                .format
                .progress(format_args!("dry run {} path {}", sha1, file.path.display()));
            continue;
        }

        let outcome = submit_file(service, collection, &file, &sha1, request.retry).await;
        if let IngestOutcome::Failed { message, .. } = &outcome {
            request
                .format
                .progress(format_args!("Failing {} due to {}", file.path.display(), message));
        }
        summary.record(&outcome);
    }
}
