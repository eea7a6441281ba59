//! OAuth2 client-credentials token lifecycle.
//!
//! # Design
//! `TokenManager` owns at most one `Token`. It is `Empty` until the first
//! renewal, `Valid` while `now <= expires_at`, and `Expired` afterwards;
//! only a successful renewal moves it back to `Valid`. `expires_at` is stored
//! with the 30 second margin already subtracted, so validity is a plain
//! comparison.
//!
//! Like the resource client, the manager is split into
//! `build_token_request` / `parse_token_response` halves. `renew` and
//! `get_access_token` glue them together through a `Transport`.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::OrcrimConfig;
use crate::error::ApiError;
use crate::http::{ensure_success, HttpMethod, HttpRequest, HttpResponse, Transport};

/// Seconds subtracted from the server-reported lifetime.
pub const EXPIRY_MARGIN_SECS: i64 = 30;

/// Lifecycle state of the cached token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Empty,
    Valid,
    Expired,
}

/// An access token and the instant after which it must not be used.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && now <= self.expires_at
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Acquires and caches client-credentials tokens for one client.
pub struct TokenManager {
    token_url: String,
    client_id: String,
    client_secret: String,
    scopes: String,
    token: Option<Token>,
}

impl TokenManager {
    pub fn new(token_url: &str, client_id: &str, client_secret: &str, scopes: &str) -> Self {
        Self {
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            scopes: scopes.to_string(),
            token: None,
        }
    }

    pub fn from_config(config: &OrcrimConfig) -> Self {
        Self::new(
            &config.token_url(),
            &config.client_id,
            &config.client_secret,
            &config.scopes,
        )
    }

    /// The cached token, whether or not it is still valid.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        match &self.token {
            None => TokenState::Empty,
            Some(token) if token.is_valid_at(now) => TokenState::Valid,
            Some(_) => TokenState::Expired,
        }
    }

    pub fn build_token_request(&self) -> HttpRequest {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", &self.client_secret)
            .append_pair("scope", &self.scopes)
            .finish();
        HttpRequest {
            method: HttpMethod::Post,
            path: self.token_url.clone(),
            headers: vec![
                (
                    "content-type".to_string(),
                    "application/x-www-form-urlencoded".to_string(),
                ),
                ("accept".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        }
    }

    /// Cache the token carried by `response`, received at `now`.
    ///
    /// The cached token is replaced only when the status is 2xx and the body
    /// decodes; on error the previous state is kept as it was.
    pub fn parse_token_response(
        &mut self,
        response: HttpResponse,
        now: DateTime<Utc>,
    ) -> Result<&Token, ApiError> {
        ensure_success(&response)?;
        let parsed: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Decode(format!("token response: {e}")))?;
        if parsed.access_token.is_empty() {
            return Err(ApiError::Decode(
                "token response: empty access_token".to_string(),
            ));
        }
        let expires_at = parsed
            .expires_in
            .checked_sub(EXPIRY_MARGIN_SECS)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                ApiError::Decode("token response: expires_in out of range".to_string())
            })?;
        Ok(self.token.insert(Token {
            access_token: parsed.access_token,
            expires_at,
        }))
    }

    /// Request a new token regardless of the cached state.
    pub fn renew<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<String, ApiError> {
        self.renew_at(transport, Utc::now())
    }

    pub fn renew_at<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        now: DateTime<Utc>,
    ) -> Result<String, ApiError> {
        let request = self.build_token_request();
        let result = transport
            .execute(&request)
            .and_then(|response| self.parse_token_response(response, now).cloned());
        match result {
            Ok(token) => {
                info!(expires_at = %token.expires_at, "access token renewed");
                Ok(token.access_token)
            }
            Err(e) => {
                warn!(error = %e, token_url = %self.token_url, "access token request failed");
                Err(e)
            }
        }
    }

    /// A token valid right now, renewing first when none is cached or the
    /// cached one has expired.
    pub fn get_access_token<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> Result<String, ApiError> {
        self.get_access_token_at(transport, Utc::now())
    }

    pub fn get_access_token_at<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        now: DateTime<Utc>,
    ) -> Result<String, ApiError> {
        if let Some(token) = self.token.as_ref().filter(|t| t.is_valid_at(now)) {
            debug!("using cached access token");
            return Ok(token.access_token.clone());
        }
        info!(
            state = ?self.state_at(now),
            "access token missing or expired, requesting a new one"
        );
        self.renew_at(transport, now)
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Source of bearer tokens for a `Session`.
pub trait TokenProvider {
    fn access_token<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<String, ApiError>;
}

impl TokenProvider for TokenManager {
    fn access_token<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<String, ApiError> {
        self.get_access_token(transport)
    }
}

/// A bearer token issued elsewhere, used as-is and never renewed.
#[derive(Clone)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn access_token<T: Transport + ?Sized>(&mut self, _transport: &T) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}
