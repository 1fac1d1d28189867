//! Google Drive ownership transfer toolkit.
//!
//! Transfers file ownership between two Google Drive accounts over the REST
//! API v3, one file at a time or in paced batches. The heart of the crate is
//! the grant-then-promote [`OwnershipTransfer`](transfer::OwnershipTransfer)
//! protocol; around it sit a typed Drive client scoped to the operations the
//! protocol needs, per-account OAuth authentication backed by a file-based
//! credential store, and a sequential [`BatchCoordinator`](transfer::BatchCoordinator)
//! with partial-failure tolerance.
//!
//! # Example
//!
//! ```no_run
//! use drive_transfer::prelude::*;
//! use secrecy::SecretString;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Token records live in one JSON file per account.
//! let store = Arc::new(FileTokenStore::from_env());
//! let authenticator = Authenticator::new(
//!     "client_id.apps.googleusercontent.com",
//!     SecretString::new("client_secret".to_string()),
//!     store,
//! );
//!
//! // One authenticated handle for the account giving files away.
//! let source = authenticator.authenticate("alice@example.com").await?;
//!
//! let coordinator = BatchCoordinator::new(&source, BatchConfig::default());
//! let summary = coordinator
//!     .run(&["file-id-1", "file-id-2"], "bob@example.com")
//!     .await;
//!
//! println!(
//!     "{}/{} transferred, {} failed",
//!     summary.successful, summary.total, summary.failed
//! );
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod services;
pub mod store;
pub mod transfer;
pub mod transport;
pub mod types;

// Internal modules (not part of public API)
#[cfg(test)]
mod mocks;

// Re-exports for convenience
pub use auth::{AccessToken, AuthProvider, Authenticator, AuthorizationFlow, OAuth2Provider};
pub use client::DriveClient;
pub use config::{DriveTransferConfig, DriveTransferConfigBuilder};
pub use errors::{DriveTransferError, DriveTransferResult};
pub use store::{FileTokenStore, InMemoryTokenStore, StoredCredential, TokenStore};
pub use transfer::{
    BatchConfig, BatchCoordinator, BatchSummary, OwnershipTransfer, TransferOptions,
    TransferOutcome,
};
pub use types::{DriveFile, Permission, PermissionList, PermissionRole, User};

/// Prelude module with commonly used types and traits.
///
/// ```no_run
/// use drive_transfer::prelude::*;
/// ```
pub mod prelude {
    // Client
    pub use crate::client::DriveClient;

    // Configuration
    pub use crate::config::{DriveTransferConfig, DriveTransferConfigBuilder};

    // Authentication and credential storage
    pub use crate::auth::{
        AccessToken, AuthProvider, Authenticator, AuthorizationFlow, OAuth2Provider,
    };
    pub use crate::store::{FileTokenStore, InMemoryTokenStore, StoredCredential, TokenStore};

    // Services
    pub use crate::services::{AboutService, FilesService, PermissionsService};

    // Transfer protocol and batch coordination
    pub use crate::transfer::{
        BatchConfig, BatchCoordinator, BatchSummary, OwnershipTransfer, PreconditionReport,
        TransferOptions, TransferOutcome,
    };

    // Common types
    pub use crate::types::{
        About, DriveFile, Permission, PermissionList, PermissionRole, PermissionType, User,
    };

    // Errors
    pub use crate::errors::{DriveTransferError, DriveTransferResult};
}
