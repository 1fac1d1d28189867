//! Type definitions for the Drive API surface used by ownership transfer.
//!
//! Every record here is a transient snapshot deserialized from a single API
//! response. Nothing is cached between protocol invocations; ownership can
//! change externally between calls, so each re-check re-queries the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Drive file metadata snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID.
    pub id: String,

    /// File name.
    pub name: String,

    /// MIME type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// File owners, primary owner first.
    #[serde(default)]
    pub owners: Vec<User>,

    /// Whether the file is shared.
    #[serde(default)]
    pub shared: bool,

    /// Whether the file is in trash.
    #[serde(default)]
    pub trashed: bool,

    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,

    /// Link to view the file in Drive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

impl DriveFile {
    /// Returns the primary owner, the first entry in the owners sequence.
    pub fn primary_owner(&self) -> Option<&User> {
        self.owners.first()
    }
}

/// An account participating in ownership or permission relations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,

    /// Whether this user is the requesting account.
    #[serde(default)]
    pub me: bool,

    /// The user's permission ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_id: Option<String>,

    /// Photo link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_link: Option<String>,
}

/// A role grant on a file for a principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// Permission ID.
    pub id: String,

    /// Permission type.
    #[serde(rename = "type")]
    pub permission_type: PermissionType,

    /// Permission role.
    pub role: PermissionRole,

    /// Email address (for user/group type).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Whether the principal has been deleted.
    #[serde(default)]
    pub deleted: bool,

    /// Whether the principal is a pending owner.
    #[serde(default)]
    pub pending_owner: bool,

    /// Expiration time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<DateTime<Utc>>,
}

impl Permission {
    /// Returns true if this permission grants ownership.
    pub fn is_owner(&self) -> bool {
        self.role == PermissionRole::Owner
    }

    /// Returns true if this permission belongs to the given email address.
    ///
    /// Drive treats account emails case-insensitively.
    pub fn matches_email(&self, email: &str) -> bool {
        self.email_address
            .as_deref()
            .map(|addr| addr.eq_ignore_ascii_case(email))
            .unwrap_or(false)
    }
}

/// Permission type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    /// Specific user.
    User,
    /// Google Group.
    Group,
    /// Entire domain.
    Domain,
    /// Anyone with link.
    Anyone,
}

/// Permission role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionRole {
    /// Full ownership.
    Owner,
    /// Shared drive organizer.
    Organizer,
    /// File organizer.
    FileOrganizer,
    /// Can edit.
    Writer,
    /// Can comment.
    Commenter,
    /// Can view.
    Reader,
}

/// One page of a file's permission set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionList {
    /// Next page token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,

    /// Permissions.
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// About-resource response; only the requesting user is projected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    /// The authenticated user.
    pub user: User,
}
