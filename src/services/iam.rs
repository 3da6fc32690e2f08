use reqwest::{header::ACCEPT, Client, StatusCode, Url};
use tracing::debug;

use crate::model::{
    cli_error::CliError,
    forms::iam_token::{CachedToken, IamTokenRequest, IamTokenResp, APIKEY_GRANT_TYPE},
};

/// Exchange an API key for a bearer token at the IAM token endpoint.
pub async fn request_token(
    client: &Client,
    iam_url: &Url,
    apikey: &str,
) -> Result<CachedToken, CliError> {
    debug!(iam_url = %iam_url, "Requesting IAM access token");

    let form = IamTokenRequest {
        grant_type: APIKEY_GRANT_TYPE,
        apikey,
    };

    let res = client
        .post(iam_url.clone())
        .header(ACCEPT, "application/json")
        .form(&form)
        .send()
        .await?;
    let status = res.status();

    if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
        return Err(CliError::APIAuthError);
    } else if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(CliError::UnexpectedResponse(status, body));
    }

    let resp = res.json::<IamTokenResp>().await?;
    CachedToken::from_response(resp).ok_or_else(|| {
        CliError::UnexpectedResponse(status, "IAM token has an invalid expiration".into())
    })
}
