//! The operations the ingester needs from Discovery.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    cli_error::CliError,
    collection::{Collection, Environment},
    document::{DocumentAccepted, QueryResp},
    file_entry::FileEntry,
    ingest_outcome::ErrorCode,
    resource_id::{CollectionRef, ResourceId},
};

/// Why a single document submission failed. Never fatal to a run.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Discovery answered, and rejected the document.
    #[error("Error: {message}, Code: {code}")]
    Service { code: u16, message: String },
    /// No usable answer from Discovery: connection, timeout, DNS, auth exchange.
    #[error("{0}")]
    Transport(String),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl SubmitError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SubmitError::Service { code, .. } => ErrorCode::Service(*code),
            SubmitError::Transport(_) | SubmitError::Io(_) => ErrorCode::Unknown,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SubmitError::Service { code: 429, .. })
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(e: reqwest::Error) -> Self {
        SubmitError::Transport(e.to_string())
    }
}

impl From<CliError> for SubmitError {
    fn from(e: CliError) -> Self {
        SubmitError::Transport(e.to_string())
    }
}

#[async_trait]
pub trait DiscoveryService: Send + Sync {
    async fn list_environments(&self) -> Result<Vec<Environment>, CliError>;

    async fn list_collections(
        &self,
        environment_id: &ResourceId,
    ) -> Result<Vec<Collection>, CliError>;

    /// Documents whose `extracted_metadata.sha1` starts with `prefix`, at most `count` of them.
    /// `matching_results` on the response is the total, which may exceed `count`.
    async fn query_sha1_prefix(
        &self,
        collection: &CollectionRef,
        prefix: &str,
        count: u64,
    ) -> Result<QueryResp, CliError>;

    /// Create or replace the document `document_id` with the contents of `file`.
    async fn update_document(
        &self,
        collection: &CollectionRef,
        document_id: &str,
        file: &FileEntry,
    ) -> Result<DocumentAccepted, SubmitError>;
}
