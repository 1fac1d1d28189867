//! Authentication for the source and target Drive accounts.
//!
//! Two layers live here. [`AuthProvider`] is the low-level token capability
//! the request executor consumes; [`OAuth2Provider`] implements it with the
//! refresh-token grant. [`Authenticator`] sits above the credential store and
//! hands out one authenticated [`DriveClient`](crate::client::DriveClient)
//! per account; core logic never inspects token internals.

use crate::client::DriveClient;
use crate::config::DriveTransferConfig;
use crate::errors::{
    AuthenticationError, ConfigurationError, DriveTransferError, DriveTransferResult,
};
use crate::store::{StoredCredential, TokenStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Default Google OAuth2 token URL.
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Token expiry buffer (5 minutes); tokens refresh proactively before expiry.
pub const TOKEN_EXPIRY_BUFFER_SECONDS: i64 = 300;

/// Environment variable naming the OAuth client ID.
pub const CLIENT_ID_ENV: &str = "DRIVE_CLIENT_ID";

/// Environment variable naming the OAuth client secret.
pub const CLIENT_SECRET_ENV: &str = "DRIVE_CLIENT_SECRET";

/// OAuth 2.0 scopes for Google Drive.
pub mod scopes {
    /// Full access to Drive files; ownership transfer requires it.
    pub const DRIVE: &str = "https://www.googleapis.com/auth/drive";

    /// Read-only access to file metadata and content.
    pub const DRIVE_READONLY: &str = "https://www.googleapis.com/auth/drive.readonly";

    /// Access to files created by the app.
    pub const DRIVE_FILE: &str = "https://www.googleapis.com/auth/drive.file";
}

/// Authentication provider abstraction.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Get an access token for API requests.
    async fn get_access_token(&self) -> Result<AccessToken, AuthenticationError>;

    /// Force refresh the access token.
    async fn refresh_token(&self) -> Result<AccessToken, AuthenticationError>;

    /// Check if the current token is expired.
    fn is_expired(&self) -> bool;
}

/// Access token with metadata.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token string.
    pub token: SecretString,

    /// Token type (usually "Bearer").
    pub token_type: String,

    /// Expiration time.
    pub expires_at: DateTime<Utc>,

    /// Scopes granted.
    pub scopes: Vec<String>,
}

impl AccessToken {
    /// Creates a new access token.
    pub fn new(
        token: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: DateTime<Utc>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            token: SecretString::new(token.into()),
            token_type: token_type.into(),
            expires_at,
            scopes,
        }
    }

    /// Checks if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Checks if the token needs proactive refresh.
    pub fn needs_refresh(&self) -> bool {
        let threshold = self.expires_at - Duration::seconds(TOKEN_EXPIRY_BUFFER_SECONDS);
        Utc::now() >= threshold
    }

    /// Returns the authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.token.expose_secret())
    }
}

/// OAuth 2.0 authentication provider using the refresh-token grant.
///
/// Tokens are cached and refreshed proactively. Refresh is serialized behind
/// an `RwLock` so concurrent requests never race a double refresh. When a
/// credential store is attached, every refreshed token is written back to the
/// account's record.
pub struct OAuth2Provider {
    client_id: String,
    client_secret: SecretString,
    refresh_token: SecretString,
    token_url: String,
    cached_token: Arc<RwLock<Option<AccessToken>>>,
    http_client: Client,
    persistence: Option<(Arc<dyn TokenStore>, String)>,
}

impl OAuth2Provider {
    /// Creates a new OAuth2 provider.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        refresh_token: SecretString,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            refresh_token,
            token_url: TOKEN_URL.to_string(),
            cached_token: Arc::new(RwLock::new(None)),
            http_client: Client::new(),
            persistence: None,
        }
    }

    /// Creates a new OAuth2 provider with string secrets.
    pub fn new_with_strings(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self::new(
            client_id,
            SecretString::new(client_secret.into()),
            SecretString::new(refresh_token.into()),
        )
    }

    /// Sets a custom token URL (for testing or custom OAuth2 servers).
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Writes every refreshed token back to the given account's record.
    pub fn with_persistence(mut self, store: Arc<dyn TokenStore>, account: impl Into<String>) -> Self {
        self.persistence = Some((store, account.into()));
        self
    }

    /// Seeds the token cache from a stored credential, when still usable.
    pub fn with_stored_credential(mut self, credential: &StoredCredential) -> Self {
        if let Some(expires_at) = credential.expires_at {
            if !credential.is_expired() {
                let token = AccessToken::new(
                    credential.access_token.clone(),
                    credential.token_type.clone(),
                    expires_at,
                    credential
                        .scope
                        .as_deref()
                        .map(|s| s.split_whitespace().map(str::to_string).collect())
                        .unwrap_or_default(),
                );
                self.cached_token = Arc::new(RwLock::new(Some(token)));
            }
        }
        self
    }

    async fn refresh_access_token(&self) -> Result<AccessToken, AuthenticationError> {
        #[derive(Serialize)]
        struct RefreshRequest<'a> {
            client_id: &'a str,
            client_secret: &'a str,
            refresh_token: &'a str,
            grant_type: &'a str,
        }

        #[derive(Deserialize)]
        struct RefreshResponse {
            access_token: String,
            token_type: String,
            expires_in: i64,
            scope: Option<String>,
        }

        let request = RefreshRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            refresh_token: self.refresh_token.expose_secret(),
            grant_type: "refresh_token",
        };

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                AuthenticationError::RefreshFailed(format!("HTTP request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::BAD_REQUEST && text.contains("invalid_grant") {
                return Err(AuthenticationError::InvalidGrant(format!(
                    "Refresh token rejected: {}",
                    text
                )));
            }
            return Err(AuthenticationError::RefreshFailed(format!(
                "Token refresh failed with status {}: {}",
                status, text
            )));
        }

        let body: RefreshResponse = response.json().await.map_err(|e| {
            AuthenticationError::RefreshFailed(format!("Invalid token response: {}", e))
        })?;

        let token = AccessToken::new(
            body.access_token.clone(),
            body.token_type.clone(),
            Utc::now() + Duration::seconds(body.expires_in),
            body.scope
                .as_deref()
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        );

        if let Some((store, account)) = &self.persistence {
            let credential = StoredCredential::new(
                body.access_token,
                body.token_type,
                Some(self.refresh_token.expose_secret().to_string()),
                Some(body.expires_in),
                body.scope,
            );
            if let Err(e) = store.store(account, credential).await {
                // A stale record is recoverable; a failed transfer is not.
                warn!(account = %account, error = %e, "failed to persist refreshed token");
            }
        }

        Ok(token)
    }
}

#[async_trait]
impl AuthProvider for OAuth2Provider {
    async fn get_access_token(&self) -> Result<AccessToken, AuthenticationError> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.needs_refresh() {
                    return Ok(token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;
        if let Some(token) = cached.as_ref() {
            if !token.needs_refresh() {
                return Ok(token.clone());
            }
        }

        let token = self.refresh_access_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn refresh_token(&self) -> Result<AccessToken, AuthenticationError> {
        let mut cached = self.cached_token.write().await;
        let token = self.refresh_access_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    fn is_expired(&self) -> bool {
        match self.cached_token.try_read() {
            Ok(cached) => cached.as_ref().map(|t| t.is_expired()).unwrap_or(true),
            Err(_) => true,
        }
    }
}

/// Interactive authorization capability.
///
/// Invoked when an account has no stored credential. The crate ships no
/// interactive implementation; embedders plug in a browser or device-code
/// flow and the resulting credential is persisted by the [`Authenticator`].
#[async_trait]
pub trait AuthorizationFlow: Send + Sync {
    /// Obtains a fresh credential for the account.
    async fn authorize(&self, account: &str) -> Result<StoredCredential, AuthenticationError>;
}

/// Per-account authentication entry point.
///
/// Reads token records from the credential store keyed by account email and
/// produces an authenticated [`DriveClient`] per account. Client handles are
/// owned by the caller for the duration of that account's operations; they
/// are never shared across accounts.
pub struct Authenticator {
    client_id: String,
    client_secret: SecretString,
    token_url: String,
    base_url: Option<String>,
    store: Arc<dyn TokenStore>,
    flow: Option<Arc<dyn AuthorizationFlow>>,
}

impl Authenticator {
    /// Creates an authenticator for the given OAuth client.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            token_url: TOKEN_URL.to_string(),
            base_url: None,
            store,
            flow: None,
        }
    }

    /// Creates an authenticator from `DRIVE_CLIENT_ID` / `DRIVE_CLIENT_SECRET`.
    pub fn from_env(store: Arc<dyn TokenStore>) -> DriveTransferResult<Self> {
        let client_id = std::env::var(CLIENT_ID_ENV).map_err(|_| {
            DriveTransferError::Configuration(ConfigurationError::MissingEnvironment(
                CLIENT_ID_ENV.to_string(),
            ))
        })?;
        let client_secret = std::env::var(CLIENT_SECRET_ENV).map_err(|_| {
            DriveTransferError::Configuration(ConfigurationError::MissingEnvironment(
                CLIENT_SECRET_ENV.to_string(),
            ))
        })?;

        Ok(Self::new(
            client_id,
            SecretString::new(client_secret),
            store,
        ))
    }

    /// Plugs in an interactive authorization flow for first-time accounts.
    pub fn with_authorization_flow(mut self, flow: Arc<dyn AuthorizationFlow>) -> Self {
        self.flow = Some(flow);
        self
    }

    /// Sets a custom token URL (for testing or custom OAuth2 servers).
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Sets a custom API base URL for the clients this authenticator builds.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Produces an authenticated client for one account.
    ///
    /// Loads the account's stored credential; when absent, runs the plugged-in
    /// authorization flow and persists what it yields. Fails with
    /// [`AuthenticationError::NoCredential`] when neither is available.
    pub async fn authenticate(&self, account: &str) -> DriveTransferResult<DriveClient> {
        let credential = match self.store.retrieve(account).await? {
            Some(credential) => credential,
            None => {
                let flow = self.flow.as_ref().ok_or_else(|| {
                    DriveTransferError::Authentication(AuthenticationError::NoCredential(
                        account.to_string(),
                    ))
                })?;
                let credential = flow.authorize(account).await?;
                self.store.store(account, credential.clone()).await?;
                credential
            }
        };

        let refresh_token = credential.refresh_token.clone().ok_or_else(|| {
            DriveTransferError::Authentication(AuthenticationError::InvalidGrant(format!(
                "Stored credential for {} has no refresh token",
                account
            )))
        })?;

        let provider = OAuth2Provider::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            SecretString::new(refresh_token),
        )
        .with_token_url(self.token_url.clone())
        .with_persistence(self.store.clone(), account)
        .with_stored_credential(&credential);

        let mut builder =
            DriveTransferConfig::builder().auth_provider_arc(Arc::new(provider));
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url)?;
        }

        DriveClient::new(builder.build()?)
    }

    /// Checks that a client handle can still produce a usable token.
    pub async fn is_valid(&self, client: &DriveClient) -> bool {
        client.auth_provider().get_access_token().await.is_ok()
    }
}
