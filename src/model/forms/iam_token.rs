use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

#[derive(Serialize)]
pub struct IamTokenRequest<'a> {
    pub grant_type: &'static str,
    pub apikey: &'a str,
}

#[derive(Deserialize)]
pub struct IamTokenResp {
    pub access_token: String,
    /// Unix seconds.
    pub expiration: i64,
}

/// An access token as kept in the token cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn from_response(resp: IamTokenResp) -> Option<Self> {
        let expires_at = Utc.timestamp_opt(resp.expiration, 0).single()?;
        Some(CachedToken {
            access_token: resp.access_token,
            expires_at,
        })
    }

    /// Tokens are refreshed a minute early so one never expires mid-upload.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(60) > now
    }
}
