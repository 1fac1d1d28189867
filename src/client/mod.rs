//! Drive API client.

use crate::auth::AuthProvider;
use crate::config::DriveTransferConfig;
use crate::errors::{DriveTransferError, DriveTransferResult};
use crate::services::{AboutService, FilesService, PermissionsService};
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;

mod executor;
pub use executor::RequestExecutor;

/// Authenticated handle to one account's view of the Drive API.
///
/// This is the "source client" the transfer protocol operates through. It
/// exposes exactly the capability set ownership transfer depends on: file
/// metadata lookup, permission listing/creation/update, and the identity of
/// the authenticated user.
pub struct DriveClient {
    config: DriveTransferConfig,
    executor: Arc<RequestExecutor>,
}

impl DriveClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: DriveTransferConfig) -> DriveTransferResult<Self> {
        let transport = Arc::new(ReqwestTransport::default().map_err(|e| {
            DriveTransferError::configuration(format!("Failed to create transport: {}", e))
        })?);

        Self::with_transport(config, transport)
    }

    /// Creates a new client over a custom transport.
    pub fn with_transport(
        config: DriveTransferConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> DriveTransferResult<Self> {
        config.validate()?;

        let auth = config.auth_provider.clone();
        let executor = Arc::new(RequestExecutor::new(
            config.clone(),
            transport,
            auth,
        ));

        Ok(Self { config, executor })
    }

    /// Creates a new client builder.
    pub fn builder() -> DriveClientBuilder {
        DriveClientBuilder::new()
    }

    /// Access the files service for metadata lookups.
    pub fn files(&self) -> FilesService {
        FilesService::new(self.executor.clone())
    }

    /// Access the permissions service.
    pub fn permissions(&self) -> PermissionsService {
        PermissionsService::new(self.executor.clone())
    }

    /// Access the about service for the authenticated user's identity.
    pub fn about(&self) -> AboutService {
        AboutService::new(self.executor.clone())
    }

    /// Gets the base URL for the API.
    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }

    /// Gets the configuration.
    pub fn config(&self) -> &DriveTransferConfig {
        &self.config
    }

    /// Gets the authentication provider backing this handle.
    pub fn auth_provider(&self) -> Arc<dyn AuthProvider> {
        self.config.auth_provider.clone()
    }
}

impl std::fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveClient")
            .field("base_url", &self.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Builder for [`DriveClient`].
pub struct DriveClientBuilder {
    config_builder: crate::config::DriveTransferConfigBuilder,
}

impl DriveClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: DriveTransferConfig::builder(),
        }
    }

    /// Sets the authentication provider.
    pub fn auth_provider<A: AuthProvider + 'static>(mut self, provider: A) -> Self {
        self.config_builder = self.config_builder.auth_provider(provider);
        self
    }

    /// Sets the authentication provider from an Arc.
    pub fn auth_provider_arc(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.config_builder = self.config_builder.auth_provider_arc(provider);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl AsRef<str>) -> DriveTransferResult<Self> {
        self.config_builder = self.config_builder.base_url(url)?;
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Builds the client.
    pub fn build(self) -> DriveTransferResult<DriveClient> {
        let config = self.config_builder.build()?;
        DriveClient::new(config)
    }
}

impl Default for DriveClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::StaticTokenProvider;

    #[test]
    fn test_client_builder() {
        let result = DriveClient::builder()
            .auth_provider(StaticTokenProvider)
            .timeout(std::time::Duration::from_secs(60))
            .build();

        assert!(result.is_ok());
    }
}
