use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode, Url};
use sha1::{Digest, Sha1};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    model::{
        cli_error::CliError,
        collection::{Collection, CollectionResp, Environment, EnvironmentResp},
        credentials::{Authentication, CredentialSet},
        document::{ApiErrorBody, DocumentAccepted, QueryResp},
        file_entry::FileEntry,
        forms::{iam_token::CachedToken, query_documents::QueryDocuments},
        resource_id::{CollectionRef, ResourceId},
    },
    services::{
        discovery::{DiscoveryService, SubmitError},
        iam,
    },
    token_cache,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub struct DiscoveryApiClient {
    client: Client,
    base_url: Url,
    version: String,
    auth: Authentication,
    token: Mutex<Option<CachedToken>>,
}

impl DiscoveryApiClient {
    pub fn new(credentials: &CredentialSet) -> Result<Self, CliError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: credentials.url.clone(),
            version: credentials.version.clone(),
            auth: credentials.auth.clone(),
            token: Mutex::new(None),
        })
    }

    /// `{base}/v1/{segments...}?version={version}`
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CliError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| CliError::InvalidServiceUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("v1")
            .extend(segments);

        url.query_pairs_mut().append_pair("version", &self.version);
        Ok(url)
    }

    fn collection_endpoint(
        &self,
        collection: &CollectionRef,
        rest: &[&str],
    ) -> Result<Url, CliError> {
        let mut segments = vec![
            "environments",
            collection.environment_id.as_str(),
            "collections",
            collection.collection_id.as_str(),
        ];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn token_cache_key(&self, apikey: &str) -> String {
        // Keyed on the key's hash too, so switching API keys never reuses a token.
        let key_hash = hex::encode(Sha1::digest(apikey.as_bytes()));
        format!("{}#{}", self.base_url, &key_hash[..12])
    }

    async fn bearer_token(&self, apikey: &str, iam_url: &Url) -> Result<String, CliError> {
        let mut token = self.token.lock().await;
        let now = Utc::now();

        if let Some(current) = token.as_ref() {
            if current.is_fresh(now) {
                return Ok(current.access_token.clone());
            }
        }

        let cache_key = self.token_cache_key(apikey);
        if token.is_none() {
            match token_cache::get(&cache_key) {
                Ok(cached) if cached.is_fresh(now) => {
                    debug!("Using cached IAM access token");
                    let access_token = cached.access_token.clone();
                    *token = Some(cached);
                    return Ok(access_token);
                }
                Ok(_) => debug!("Cached IAM access token has expired"),
                Err(e) => debug!(error = %e, "No cached IAM access token"),
            }
        }

        let fresh = iam::request_token(&self.client, iam_url, apikey).await?;
        if let Err(e) = token_cache::set(&cache_key, &fresh) {
            warn!(error = %e, "Could not cache IAM access token");
        }

        let access_token = fresh.access_token.clone();
        *token = Some(fresh);
        Ok(access_token)
    }

    async fn authorize(&self, request_builder: RequestBuilder) -> Result<RequestBuilder, CliError> {
        match &self.auth {
            Authentication::Basic { username, password } => {
                Ok(request_builder.basic_auth(username, Some(password)))
            }
            Authentication::Iam { apikey, iam_url } => {
                let token = self.bearer_token(apikey, iam_url).await?;
                Ok(request_builder.bearer_auth(token))
            }
        }
    }

    async fn send_request(&self, request_builder: RequestBuilder) -> Result<Response, CliError> {
        let request_builder = self.authorize(request_builder).await?;
        Ok(request_builder.send().await?)
    }

    /// Turns anything but a 2xx into an error, for the calls made before submitting.
    async fn expect_success(res: Response) -> Result<Response, CliError> {
        let status = res.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(CliError::APIAuthError)
        } else if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            Err(CliError::UnexpectedResponse(status, body))
        } else {
            Ok(res)
        }
    }
}

/// Build the per-file error for a rejected submission from its status and body.
pub fn submit_error(status: StatusCode, body: &str) -> SubmitError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
    let code = parsed
        .as_ref()
        .and_then(|b| b.code)
        .unwrap_or_else(|| status.as_u16());
    let message = parsed
        .and_then(|b| b.error)
        .unwrap_or_else(|| match body.trim() {
            "" => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_owned(),
            text => text.to_owned(),
        });

    SubmitError::Service { code, message }
}

/// Content type for the upload's file part, guessed from the extension.
pub fn content_type(file: &FileEntry) -> String {
    mime_guess::from_path(&file.path)
        .first_or_octet_stream()
        .to_string()
}

#[async_trait]
impl DiscoveryService for DiscoveryApiClient {
    async fn list_environments(&self) -> Result<Vec<Environment>, CliError> {
        let url = self.endpoint(&["environments"])?;
        debug!(%url, "Listing environments");

        let res = self.send_request(self.client.get(url)).await?;
        let res = Self::expect_success(res).await?;
        Ok(res.json::<EnvironmentResp>().await?.environments)
    }

    async fn list_collections(
        &self,
        environment_id: &ResourceId,
    ) -> Result<Vec<Collection>, CliError> {
        let url = self.endpoint(&["environments", environment_id.as_str(), "collections"])?;
        debug!(%url, "Listing collections");

        let res = self.send_request(self.client.get(url)).await?;
        let res = Self::expect_success(res).await?;
        Ok(res.json::<CollectionResp>().await?.collections)
    }

    async fn query_sha1_prefix(
        &self,
        collection: &CollectionRef,
        prefix: &str,
        count: u64,
    ) -> Result<QueryResp, CliError> {
        let url = self.collection_endpoint(collection, &["query"])?;
        let query = QueryDocuments::sha1_prefix(prefix, count);

        let res = self
            .send_request(self.client.post(url).json(&query))
            .await?;
        let res = Self::expect_success(res).await?;
        Ok(res.json::<QueryResp>().await?)
    }

    async fn update_document(
        &self,
        collection: &CollectionRef,
        document_id: &str,
        file: &FileEntry,
    ) -> Result<DocumentAccepted, SubmitError> {
        let url = self.collection_endpoint(collection, &["documents", document_id])?;

        let content = tokio::fs::read(&file.path).await?;
        let part = multipart::Part::bytes(content)
            .file_name(file.file_name())
            .mime_str(&content_type(file))?;
        let form = multipart::Form::new().part("file", part);

        debug!(%url, path = %file.path.display(), "Submitting document");
        let res = self
            .send_request(self.client.post(url).multipart(form))
            .await?;
        let status = res.status();

        if status.is_success() {
            Ok(res.json::<DocumentAccepted>().await?)
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(submit_error(status, &body))
        }
    }
}
