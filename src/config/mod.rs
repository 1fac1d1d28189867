//! Client configuration.

use crate::auth::AuthProvider;
use crate::errors::{ConfigurationError, DriveTransferError, DriveTransferResult};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default Drive REST API base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Configuration for a [`DriveClient`](crate::client::DriveClient).
#[derive(Clone)]
pub struct DriveTransferConfig {
    /// Authentication provider for the source account.
    pub auth_provider: Arc<dyn AuthProvider>,

    /// Base URL for the API.
    pub base_url: Url,

    /// Default timeout for requests.
    pub timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Fields projection applied when a request supplies none.
    pub default_fields: Option<String>,
}

impl DriveTransferConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> DriveTransferConfigBuilder {
        DriveTransferConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DriveTransferResult<()> {
        if !url_is_trusted(&self.base_url) {
            return Err(DriveTransferError::Configuration(
                ConfigurationError::InvalidConfiguration(
                    "Base URL must use HTTPS".to_string(),
                ),
            ));
        }

        Ok(())
    }
}

/// HTTPS everywhere, with a loopback exception for test servers.
fn url_is_trusted(url: &Url) -> bool {
    match url.scheme() {
        "https" => true,
        "http" => matches!(url.host_str(), Some("localhost") | Some("127.0.0.1")),
        _ => false,
    }
}

/// Builder for [`DriveTransferConfig`].
pub struct DriveTransferConfigBuilder {
    auth_provider: Option<Arc<dyn AuthProvider>>,
    base_url: Option<Url>,
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
    default_fields: Option<String>,
}

impl DriveTransferConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            auth_provider: None,
            base_url: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: None,
            default_fields: None,
        }
    }

    /// Sets the authentication provider.
    pub fn auth_provider<A: AuthProvider + 'static>(mut self, provider: A) -> Self {
        self.auth_provider = Some(Arc::new(provider));
        self
    }

    /// Sets the authentication provider from an Arc.
    pub fn auth_provider_arc(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth_provider = Some(provider);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl AsRef<str>) -> DriveTransferResult<Self> {
        let url = Url::parse(url.as_ref()).map_err(|e| {
            DriveTransferError::Configuration(ConfigurationError::InvalidConfiguration(
                format!("Invalid base URL: {}", e),
            ))
        })?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the default fields projection.
    pub fn default_fields(mut self, fields: impl Into<String>) -> Self {
        self.default_fields = Some(fields.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> DriveTransferResult<DriveTransferConfig> {
        let auth_provider = self.auth_provider.ok_or_else(|| {
            DriveTransferError::Configuration(ConfigurationError::MissingCredentials(
                "Authentication provider is required".to_string(),
            ))
        })?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).expect("Invalid default base URL"),
        };

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("drive-transfer/{}", env!("CARGO_PKG_VERSION")));

        let config = DriveTransferConfig {
            auth_provider,
            base_url,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            user_agent,
            default_fields: self.default_fields,
        };

        config.validate()?;

        Ok(config)
    }
}

impl Default for DriveTransferConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessToken, AuthProvider};
    use crate::errors::AuthenticationError;

    struct MockAuthProvider;

    #[async_trait::async_trait]
    impl AuthProvider for MockAuthProvider {
        async fn get_access_token(&self) -> Result<AccessToken, AuthenticationError> {
            unimplemented!()
        }

        async fn refresh_token(&self) -> Result<AccessToken, AuthenticationError> {
            unimplemented!()
        }

        fn is_expired(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_default_config() {
        let config = DriveTransferConfig::builder()
            .auth_provider(MockAuthProvider)
            .build()
            .unwrap();

        assert_eq!(config.base_url.as_str(), "https://www.googleapis.com/drive/v3");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("drive-transfer/"));
    }

    #[test]
    fn test_custom_config() {
        let config = DriveTransferConfig::builder()
            .auth_provider(MockAuthProvider)
            .timeout(Duration::from_secs(60))
            .user_agent("test-agent/1.0")
            .default_fields("id,name")
            .build()
            .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.default_fields.as_deref(), Some("id,name"));
    }

    #[test]
    fn test_missing_auth_provider() {
        let result = DriveTransferConfig::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_http_rejected_except_loopback() {
        let result = DriveTransferConfig::builder()
            .auth_provider(MockAuthProvider)
            .base_url("http://drive.example.com/v3")
            .unwrap()
            .build();
        assert!(result.is_err());

        let result = DriveTransferConfig::builder()
            .auth_provider(MockAuthProvider)
            .base_url("http://127.0.0.1:8080/drive/v3")
            .unwrap()
            .build();
        assert!(result.is_ok());
    }
}
