use std::{fmt, fs, path::Path};

use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use super::cli_error::CliError;

pub const DEFAULT_VERSION: &str = "2017-09-01";
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// The service credentials JSON, as handed out by the Discovery service page.
#[derive(Deserialize)]
struct CredentialsFile {
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    apikey: Option<String>,
    iam_url: Option<String>,
    version: Option<String>,
    environment_id: Option<String>,
    collection_id: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub enum Authentication {
    Basic { username: String, password: String },
    Iam { apikey: String, iam_url: Url },
}

// Secrets stay out of logs and error output.
impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authentication::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Authentication::Iam { iam_url, .. } => f
                .debug_struct("Iam")
                .field("iam_url", &iam_url.as_str())
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSet {
    pub url: Url,
    pub auth: Authentication,
    pub version: String,
    pub environment_id: Option<String>,
    pub collection_id: Option<String>,
}

impl CredentialSet {
    pub fn load(path: impl AsRef<Path>) -> Result<CredentialSet, CliError> {
        let path = path.as_ref();
        info!(credentials_path = %path.display(), "Loading credentials");

        let contents =
            fs::read_to_string(path).map_err(|source| CliError::CredentialsUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<CredentialSet, CliError> {
        let file: CredentialsFile =
            serde_json::from_str(contents).map_err(CliError::CredentialsMalformed)?;

        let url = file.url.ok_or(CliError::CredentialsIncomplete("\"url\""))?;
        let url = parse_url(&url)?;

        let auth = match (file.apikey, file.username, file.password) {
            (Some(apikey), _, _) => {
                let iam_url = file.iam_url.as_deref().unwrap_or(DEFAULT_IAM_URL);
                Authentication::Iam {
                    apikey,
                    iam_url: parse_url(iam_url)?,
                }
            }
            (None, Some(username), Some(password)) => Authentication::Basic { username, password },
            _ => {
                return Err(CliError::CredentialsIncomplete(
                    "\"apikey\", or \"username\" and \"password\"",
                ))
            }
        };

        Ok(CredentialSet {
            url,
            auth,
            version: file.version.unwrap_or_else(|| DEFAULT_VERSION.to_owned()),
            environment_id: file.environment_id.filter(|id| !id.is_empty()),
            collection_id: file.collection_id.filter(|id| !id.is_empty()),
        })
    }
}

fn parse_url(url: &str) -> Result<Url, CliError> {
    match Url::parse(url) {
        Ok(url) if !url.cannot_be_a_base() => Ok(url),
        _ => Err(CliError::InvalidServiceUrl(url.to_owned())),
    }
}
