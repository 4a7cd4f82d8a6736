use crate::utils::error::{EtlError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::sign::Signer;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use tokio::sync::Mutex;

pub const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service-account key file needed for the JWT bearer flow.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EtlError::AuthError {
            message: format!("cannot read credentials file {}: {}", path.display(), e),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| EtlError::AuthError {
            message: format!("invalid credentials file: {}", e),
        })
    }

    /// Builds a signed RS256 assertion valid from `now` for one hour.
    pub fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let header = serde_json::json!({"alg": "RS256", "typ": "JWT"});
        let claims = serde_json::json!({
            "iss": self.client_email,
            "scope": STORAGE_SCOPE,
            "aud": self.token_uri,
            "iat": iat,
            "exp": iat + ASSERTION_LIFETIME_SECS,
        });

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );

        let pkey = PKey::private_key_from_pem(self.private_key.as_bytes())?;
        let mut signer = Signer::new(MessageDigest::sha256(), &pkey)?;
        signer.update(signing_input.as_bytes())?;
        let signature = signer.sign_to_vec()?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum TokenSource {
    ServiceAccount(ServiceAccountKey),
    Metadata { url: String },
    Anonymous,
}

/// Hands out OAuth2 bearer tokens for Cloud Storage, refreshing shortly before expiry.
#[derive(Debug)]
pub struct GcsAuth {
    client: Client,
    source: TokenSource,
    cache: Mutex<Option<CachedToken>>,
}

impl GcsAuth {
    pub fn new(client: Client, source: TokenSource) -> Self {
        Self {
            client,
            source,
            cache: Mutex::new(None),
        }
    }

    pub fn anonymous(client: Client) -> Self {
        Self::new(client, TokenSource::Anonymous)
    }

    /// `None` means requests go out without an Authorization header.
    pub async fn bearer_token(&self) -> Result<Option<String>> {
        if matches!(self.source, TokenSource::Anonymous) {
            return Ok(None);
        }

        let mut cache = self.cache.lock().await;
        let now = Utc::now();
        if let Some(token) = cache.as_ref() {
            if token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(Some(token.value.clone()));
            }
        }

        let fresh = self.fetch_token(now).await?;
        let value = fresh.value.clone();
        *cache = Some(fresh);
        Ok(Some(value))
    }

    async fn fetch_token(&self, now: DateTime<Utc>) -> Result<CachedToken> {
        let response = match &self.source {
            TokenSource::ServiceAccount(key) => {
                tracing::debug!("Requesting access token for {}", key.client_email);
                let assertion = key.signed_assertion(now)?;
                self.client
                    .post(&key.token_uri)
                    .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
                    .send()
                    .await?
            }
            TokenSource::Metadata { url } => {
                tracing::debug!("Requesting access token from metadata server");
                self.client
                    .get(url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await?
            }
            TokenSource::Anonymous => {
                return Err(EtlError::AuthError {
                    message: "anonymous access has no token".to_string(),
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::AuthError {
                message: format!("token endpoint returned HTTP {}: {}", status, body),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS)),
        })
    }
}
