use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Request Error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not read credentials file {path}: {source}")]
    CredentialsUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed credentials file: {0}")]
    CredentialsMalformed(serde_json::Error),
    #[error("Credentials file is missing {0}")]
    CredentialsIncomplete(&'static str),
    #[error("Invalid service URL '{0}'")]
    InvalidServiceUrl(String),
    #[error("{0}")]
    InputError(String),
    #[error("Error: no writable environment found")]
    NoWritableEnvironment,
    #[error("Error: no target collection found. Please create a collection.")]
    NoCollection,
    #[error("Error: multiple collections found ({0}). Please specify which one to use.")]
    MultipleCollections(usize),
    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("API Auth Error")]
    APIAuthError,
    #[error("Unexpected response from Discovery ({0}): {1}")]
    UnexpectedResponse(StatusCode, String),
    #[error("Your current OS is not supported, please use Linux, MacOS, or Windows")]
    UnsupportedSystem,
}
