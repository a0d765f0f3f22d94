use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::storage::StoreError;

const SCOPES: &str = "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Токен обновляется заранее, чтобы не истёк посреди запроса
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Источник OAuth-токена для Google API.
pub enum TokenSource {
    ServiceAccount(ServiceAccountAuth),
    #[cfg(test)]
    Fixed(String),
}

impl TokenSource {
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, StoreError> {
        match self {
            TokenSource::ServiceAccount(auth) => auth.access_token(http).await,
            #[cfg(test)]
            TokenSource::Fixed(token) => Ok(token.clone()),
        }
    }
}

/// Авторизация сервисного аккаунта через JWT bearer grant.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub async fn from_file(path: &Path) -> Result<Self, StoreError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            StoreError::Auth(format!("cannot read credentials file {}: {}", path.display(), e))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Auth(format!("invalid credentials file: {}", e)))?;
        Self::new(key)
    }

    pub fn new(key: ServiceAccountKey) -> Result<Self, StoreError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid private key: {}", e)))?;

        Ok(Self {
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, StoreError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.signed_assertion()?;
        let response = http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("token endpoint returned {}: {}", status, body)));
        }

        let token: TokenResponse = response.json().await?;
        log::debug!("🔑 Google access token refreshed for {}", self.key.client_email);

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(token.access_token)
    }

    fn signed_assertion(&self) -> Result<String, StoreError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| StoreError::Auth(format!("cannot sign assertion: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY: &str = include_str!("testdata/service_account_key.pem");

    fn auth(server: &MockServer) -> ServiceAccountAuth {
        ServiceAccountAuth::new(ServiceAccountKey {
            client_email: "course-bot@test.iam.gserviceaccount.com".to_string(),
            private_key: TEST_KEY.to_string(),
            token_uri: format!("{}/token", server.uri()),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn token_is_cached_until_close_to_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.first",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = auth(&server);
        let http = reqwest::Client::new();
        assert_eq!(auth.access_token(&http).await.unwrap(), "ya29.first");
        assert_eq!(auth.access_token(&http).await.unwrap(), "ya29.first");
    }

    #[tokio::test]
    async fn token_expiring_within_margin_is_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.short",
                "expires_in": 30
            })))
            .expect(2)
            .mount(&server)
            .await;

        let auth = auth(&server);
        let http = reqwest::Client::new();
        auth.access_token(&http).await.unwrap();
        auth.access_token(&http).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_token_request_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let err = auth(&server).access_token(&reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Auth(ref msg) if msg.contains("401")));
    }

    #[test]
    fn invalid_private_key_is_rejected() {
        let result = ServiceAccountAuth::new(ServiceAccountKey {
            client_email: "x@test".to_string(),
            private_key: "not a key".to_string(),
            token_uri: "http://localhost/token".to_string(),
        });
        assert!(matches!(result, Err(StoreError::Auth(_))));
    }
}
