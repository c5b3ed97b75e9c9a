//! Service-account authorization for the Google Sheets and Drive APIs.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::ensure_success;
use crate::sink::SinkError;

pub const SCOPES: [&str; 2] =
    ["https://www.googleapis.com/auth/spreadsheets", "https://www.googleapis.com/auth/drive"];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub token_uri: String,
    private_key: SecretString,
}

#[derive(Deserialize)]
struct ServiceAccountFile {
    client_email: String,
    private_key: String,
    token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Reads the credentials file. `Ok(None)` means the file does not exist
    /// and the remote sink is disabled.
    pub fn read_optional(path: &Path) -> Result<Option<Self>, SinkError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)
            .map_err(|source| SinkError::CredentialsRead { path: path.to_path_buf(), source })?;
        Self::from_json_str(&raw)
            .map(Some)
            .map_err(|source| SinkError::CredentialsParse { path: path.to_path_buf(), source })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let file: ServiceAccountFile = serde_json::from_str(raw)?;
        Ok(Self {
            client_email: file.client_email,
            token_uri: file.token_uri.unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            private_key: file.private_key.into(),
        })
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Bearer token for one logging call.
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// RS256-signed JWT asserting the service account's identity.
pub fn signed_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, SinkError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())?;
    let issued_at = now.timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SCOPES.join(" "),
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };
    Ok(encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?)
}

/// Exchanges a signed assertion for an access token.
pub async fn fetch_access_token(
    client: &Client,
    key: &ServiceAccountKey,
) -> Result<AccessToken, SinkError> {
    let assertion = signed_assertion(key, Utc::now())?;
    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?;
    let token: TokenResponse = ensure_success(response).await?.json().await?;
    if token.access_token.is_empty() {
        return Err(SinkError::Api {
            status: 200,
            body: "token endpoint returned empty access token".to_string(),
        });
    }
    Ok(AccessToken(token.access_token.into()))
}
