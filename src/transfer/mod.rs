//! Ownership transfer protocol.
//!
//! Transferring ownership of a Drive file is a two-step sequence: the target
//! principal must hold write access before the API accepts a promotion to
//! owner. The protocol here performs that grant-then-promote sequence
//! idempotently against a fresh snapshot of the file's permission set, with
//! no internal retries; every failure is wrapped with context and propagated
//! to the caller. The [`batch`] coordinator sequences the protocol over many
//! files with pacing and partial-failure tolerance.

use crate::client::DriveClient;
use crate::errors::{
    DriveTransferError, DriveTransferResult, RequestError, TransferError,
};
use crate::services::{
    CreatePermissionParams, CreatePermissionRequest, UpdatePermissionParams,
    UpdatePermissionRequest,
};
use crate::types::{Permission, PermissionRole, PermissionType, User};
use tracing::{debug, info};

mod batch;
pub use batch::{BatchConfig, BatchCoordinator, BatchSummary};

/// Options applied to a single transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Whether Drive should email the target about the new grant.
    pub send_notification_email: bool,
}

/// Result of one ownership transfer attempt.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    /// The file the transfer was attempted on.
    pub file_id: String,
    /// File name, when the file was reachable.
    pub file_name: Option<String>,
    /// True iff the target holds the owner role after the operation.
    pub success: bool,
    /// Informational message ("already owner" on the idempotence
    /// short-circuit).
    pub message: Option<String>,
    /// Cause message when the transfer failed.
    pub error: Option<String>,
    /// The new owner, populated on success.
    pub new_owner: Option<User>,
}

impl TransferOutcome {
    fn succeeded(file_id: &str, file_name: String, new_owner: User) -> Self {
        Self {
            file_id: file_id.to_string(),
            file_name: Some(file_name),
            success: true,
            message: None,
            error: None,
            new_owner: Some(new_owner),
        }
    }

    fn already_owner(file_id: &str, file_name: String, new_owner: User) -> Self {
        Self {
            file_id: file_id.to_string(),
            file_name: Some(file_name),
            success: true,
            message: Some("already owner".to_string()),
            error: None,
            new_owner: Some(new_owner),
        }
    }

    pub(crate) fn failed(file_id: &str, error: &DriveTransferError) -> Self {
        Self {
            file_id: file_id.to_string(),
            file_name: None,
            success: false,
            message: None,
            error: Some(error.to_string()),
            new_owner: None,
        }
    }
}

/// Advisory report from [`OwnershipTransfer::validate_preconditions`].
#[derive(Debug, Clone)]
pub struct PreconditionReport {
    /// File name.
    pub file_name: String,
    /// Email of the primary owner, the first entry in the owners sequence.
    pub current_owner_email: String,
}

/// The grant-then-promote ownership transfer protocol.
///
/// Operates through a source-account [`DriveClient`] that must hold
/// read/write access to the files involved. State is fetched fresh on every
/// invocation; ownership can change externally between calls.
pub struct OwnershipTransfer<'a> {
    client: &'a DriveClient,
}

impl<'a> OwnershipTransfer<'a> {
    /// Creates a protocol instance over a source client.
    pub fn new(client: &'a DriveClient) -> Self {
        Self { client }
    }

    /// Transfers ownership of one file to the target principal.
    ///
    /// Idempotent: when the target already owns the file the call succeeds
    /// immediately without issuing any write. Otherwise the target is granted
    /// writer access if it holds no permission yet, then its permission is
    /// promoted to owner with the transfer-ownership flag set.
    ///
    /// A file promoted to writer but not yet to owner stays in that
    /// intermediate state if the promotion fails; no rollback is attempted.
    pub async fn transfer(
        &self,
        file_id: &str,
        target_email: &str,
        options: &TransferOptions,
    ) -> DriveTransferResult<TransferOutcome> {
        validate_inputs(file_id, target_email)?;

        let file = self.client.files().get(file_id, None).await?;

        let permissions = self.list_permissions(file_id).await?;

        if let Some(existing) = find_permission(&permissions, target_email) {
            if existing.is_owner() {
                info!(file_id, target = target_email, "target already owns file");
                return Ok(TransferOutcome::already_owner(
                    file_id,
                    file.name,
                    principal_from(existing, target_email),
                ));
            }
            debug!(
                file_id,
                target = target_email,
                role = ?existing.role,
                "target already holds a permission, skipping grant"
            );
        } else {
            // Drive requires write access before a promotion to owner.
            let request = CreatePermissionRequest {
                role: PermissionRole::Writer,
                permission_type: PermissionType::User,
                email_address: Some(target_email.to_string()),
            };
            let params = CreatePermissionParams {
                send_notification_email: Some(options.send_notification_email),
                ..Default::default()
            };
            self.client
                .permissions()
                .create(file_id, request, Some(params))
                .await?;
            debug!(file_id, target = target_email, "granted writer access");
        }

        // Re-locate against a fresh snapshot; the grant may have raced an
        // external change.
        let permissions = self.list_permissions(file_id).await?;
        let permission = find_permission(&permissions, target_email).ok_or_else(|| {
            DriveTransferError::promotion_failed(format!(
                "permission for {} not present on {} after grant",
                target_email, file_id
            ))
        })?;

        let request = UpdatePermissionRequest {
            role: Some(PermissionRole::Owner),
        };
        let params = UpdatePermissionParams {
            transfer_ownership: Some(true),
            send_notification_email: Some(options.send_notification_email),
            fields: None,
        };
        let promoted = self
            .client
            .permissions()
            .update(file_id, &permission.id, request, Some(params))
            .await
            .map_err(|e| {
                DriveTransferError::promotion_failed(format!(
                    "promoting {} on {}: {}",
                    target_email, file_id, e
                ))
            })?;

        if !promoted.is_owner() {
            return Err(DriveTransferError::promotion_failed(format!(
                "permission for {} on {} holds role {:?} after promotion",
                target_email, file_id, promoted.role
            )));
        }

        info!(file_id, target = target_email, "ownership transferred");
        Ok(TransferOutcome::succeeded(
            file_id,
            file.name,
            principal_from(&promoted, target_email),
        ))
    }

    /// Read-only check run before asking a user to confirm a transfer.
    ///
    /// Fetches the file and reports its name and primary owner without
    /// mutating anything.
    pub async fn validate_preconditions(
        &self,
        file_id: &str,
        target_email: &str,
    ) -> DriveTransferResult<PreconditionReport> {
        validate_inputs(file_id, target_email)?;

        let file = self.client.files().get(file_id, None).await?;

        let owner = file.primary_owner().ok_or_else(|| {
            DriveTransferError::Transfer(TransferError::MissingOwner(file_id.to_string()))
        })?;
        let current_owner_email = owner.email_address.clone().ok_or_else(|| {
            DriveTransferError::Transfer(TransferError::MissingOwner(format!(
                "{} owner record carries no email address",
                file_id
            )))
        })?;

        Ok(PreconditionReport {
            file_name: file.name,
            current_owner_email,
        })
    }

    async fn list_permissions(&self, file_id: &str) -> DriveTransferResult<Vec<Permission>> {
        self.client
            .permissions()
            .list_all(file_id)
            .await
            .map_err(|e| {
                DriveTransferError::permission_lookup(format!(
                    "listing permissions for {}: {}",
                    file_id, e
                ))
            })
    }
}

fn validate_inputs(file_id: &str, target_email: &str) -> DriveTransferResult<()> {
    if file_id.trim().is_empty() {
        return Err(DriveTransferError::Request(RequestError::MissingParameter(
            "file_id is required".to_string(),
        )));
    }
    validate_target_email(target_email)
}

/// Basic syntactic email check, applied before any API call is issued.
pub fn validate_target_email(email: &str) -> DriveTransferResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(DriveTransferError::invalid_input("target email is empty"));
    }
    if email.len() > 254 {
        return Err(DriveTransferError::invalid_input(
            "target email exceeds 254 characters",
        ));
    }
    if email.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(DriveTransferError::invalid_input(format!(
            "target email contains whitespace or control characters: {}",
            email
        )));
    }

    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None)
            if !local.is_empty()
                && local.len() <= 64
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.') =>
        {
            Ok(())
        }
        _ => Err(DriveTransferError::invalid_input(format!(
            "malformed email address: {}",
            email
        ))),
    }
}

/// Finds the live permission for an email, case-insensitively.
fn find_permission<'p>(permissions: &'p [Permission], email: &str) -> Option<&'p Permission> {
    permissions
        .iter()
        .find(|p| !p.deleted && p.matches_email(email))
}

/// Builds the new-owner principal from a permission record.
fn principal_from(permission: &Permission, target_email: &str) -> User {
    User {
        display_name: permission.display_name.clone(),
        email_address: permission
            .email_address
            .clone()
            .or_else(|| Some(target_email.to_string())),
        me: false,
        permission_id: Some(permission.id.clone()),
        photo_link: None,
    }
}
