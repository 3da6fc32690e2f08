use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    model::{file_entry::FileEntry, ingest_outcome::IngestOutcome, resource_id::CollectionRef},
    services::discovery::DiscoveryService,
};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after a 429, on top of the first one.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// Send one file, backing off only when Discovery says we are going too fast.
///
/// Failures are returned as an outcome carrying the error message; they never
/// stop the run.
pub async fn submit_file(
    service: &impl DiscoveryService,
    collection: &CollectionRef,
    file: &FileEntry,
    document_id: &str,
    retry: RetryPolicy,
) -> IngestOutcome {
    let mut retries = 0;

    loop {
        match service.update_document(collection, document_id, file).await {
            Ok(accepted) => {
                debug!(
                    path = %file.path.display(),
                    document_id = %accepted.document_id,
                    status = %accepted.status,
                    "Document accepted"
                );
                return IngestOutcome::Succeeded;
            }
            Err(e) if e.is_rate_limited() && retries < retry.max_retries => {
                retries += 1;
                warn!(
                    path = %file.path.display(),
                    retry = retries,
                    delay = ?retry.delay,
                    "Rate limited by Discovery, backing off"
                );
                tokio::time::sleep(retry.delay).await;
            }
            Err(e) => {
                return IngestOutcome::Failed {
                    code: e.code(),
                    message: e.to_string(),
                };
            }
        }
    }
}
