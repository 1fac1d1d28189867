//! Permission operations.

use crate::client::RequestExecutor;
use crate::errors::DriveTransferResult;
use crate::transport::HttpMethod;
use crate::types::{Permission, PermissionList, PermissionRole, PermissionType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PERMISSION_FIELDS: &str = "id,type,role,emailAddress,displayName,deleted,pendingOwner";

/// Service for permission operations.
pub struct PermissionsService {
    executor: Arc<RequestExecutor>,
}

impl PermissionsService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Lists one page of a file's permissions.
    pub async fn list(
        &self,
        file_id: &str,
        params: Option<ListPermissionsParams>,
    ) -> DriveTransferResult<PermissionList> {
        let path = format!("/files/{}/permissions", super::encode_segment(file_id));
        let params = params.unwrap_or_else(|| ListPermissionsParams {
            fields: Some(format!(
                "nextPageToken,permissions({})",
                PERMISSION_FIELDS
            )),
            ..Default::default()
        });

        self.executor
            .execute_with_params(HttpMethod::Get, &path, &params, None)
            .await
    }

    /// Lists a file's full permission set, following page tokens.
    ///
    /// Ownership decisions must see every grant, so pagination is never
    /// truncated here.
    pub async fn list_all(&self, file_id: &str) -> DriveTransferResult<Vec<Permission>> {
        let mut permissions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let params = ListPermissionsParams {
                page_token: page_token.clone(),
                fields: Some(format!("nextPageToken,permissions({})", PERMISSION_FIELDS)),
                ..Default::default()
            };
            let page = self.list(file_id, Some(params)).await?;
            permissions.extend(page.permissions);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(permissions)
    }

    /// Creates a new permission.
    pub async fn create(
        &self,
        file_id: &str,
        request: CreatePermissionRequest,
        params: Option<CreatePermissionParams>,
    ) -> DriveTransferResult<Permission> {
        let path = format!("/files/{}/permissions", super::encode_segment(file_id));
        let body = RequestExecutor::json_body(&request)?;

        match params {
            Some(params) => {
                self.executor
                    .execute_with_params(HttpMethod::Post, &path, &params, Some(body))
                    .await
            }
            None => self.executor.execute(HttpMethod::Post, &path, Some(body)).await,
        }
    }

    /// Updates a permission's role.
    pub async fn update(
        &self,
        file_id: &str,
        permission_id: &str,
        request: UpdatePermissionRequest,
        params: Option<UpdatePermissionParams>,
    ) -> DriveTransferResult<Permission> {
        let path = format!(
            "/files/{}/permissions/{}",
            super::encode_segment(file_id),
            super::encode_segment(permission_id)
        );
        let body = RequestExecutor::json_body(&request)?;

        match params {
            Some(params) => {
                self.executor
                    .execute_with_params(HttpMethod::Patch, &path, &params, Some(body))
                    .await
            }
            None => {
                self.executor
                    .execute(HttpMethod::Patch, &path, Some(body))
                    .await
            }
        }
    }
}

// Request/parameter types

/// Request body for creating a permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    pub role: PermissionRole,
    #[serde(rename = "type")]
    pub permission_type: PermissionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

/// Query parameters for creating a permission.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_notification_email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

/// Parameters for listing permissions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListPermissionsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

/// Request body for updating a permission.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<PermissionRole>,
}

/// Query parameters for updating a permission.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_ownership: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_notification_email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}
