//! File metadata operations.

use crate::client::RequestExecutor;
use crate::errors::{DriveTransferError, DriveTransferResult, RequestError};
use crate::transport::HttpMethod;
use crate::types::DriveFile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Metadata projection requested when the caller supplies no fields.
///
/// Owners come back primary-owner-first, which the precondition validator
/// relies on.
const DEFAULT_FILE_FIELDS: &str =
    "id,name,mimeType,owners(displayName,emailAddress,permissionId),shared,trashed,modifiedTime,webViewLink";

/// Service for file metadata lookups.
pub struct FilesService {
    executor: Arc<RequestExecutor>,
}

impl FilesService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Fetches a fresh metadata snapshot for a file.
    pub async fn get(
        &self,
        file_id: &str,
        params: Option<GetFileParams>,
    ) -> DriveTransferResult<DriveFile> {
        if file_id.is_empty() {
            return Err(DriveTransferError::Request(RequestError::MissingParameter(
                "file_id is required".to_string(),
            )));
        }

        let path = format!("/files/{}", super::encode_segment(file_id));
        let params = params.unwrap_or_else(|| GetFileParams {
            fields: Some(DEFAULT_FILE_FIELDS.to_string()),
            ..Default::default()
        });

        self.executor
            .execute_with_params(HttpMethod::Get, &path, &params, None)
            .await
    }
}

/// Parameters for getting file metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetFileParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_all_drives: Option<bool>,
}
