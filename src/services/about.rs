//! About-resource operations.

use crate::client::RequestExecutor;
use crate::errors::DriveTransferResult;
use crate::transport::HttpMethod;
use crate::types::{About, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Service for identity lookups on the authenticated account.
pub struct AboutService {
    executor: Arc<RequestExecutor>,
}

impl AboutService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Gets the about resource, projected to the authenticated user.
    pub async fn get(&self) -> DriveTransferResult<About> {
        let params = GetAboutParams {
            fields: Some("user".to_string()),
        };
        self.executor
            .execute_with_params(HttpMethod::Get, "/about", &params, None)
            .await
    }

    /// Gets the authenticated user's identity.
    pub async fn current_user(&self) -> DriveTransferResult<User> {
        Ok(self.get().await?.user)
    }
}

/// Parameters for getting about information.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetAboutParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}
