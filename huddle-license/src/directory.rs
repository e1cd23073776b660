//! User directory seam.

use thiserror::Error;

/// Failures from the user directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No user exists with the given id.
    #[error("user not found")]
    NotFound,

    /// Any other lookup failure.
    #[error("user lookup failed: {0}")]
    Other(String),
}

/// Identity of a user known to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    /// User id.
    pub id: String,
    /// Display name shown to the licensing service.
    pub display_name: String,
    /// Account email.
    pub email: String,
}

/// Read-only access to the server's user accounts.
pub trait UserDirectory: Send + Sync {
    /// Resolves a user id to an identity.
    fn get_user(&self, id: &str) -> Result<UserIdentity, DirectoryError>;

    /// Returns the number of active users on this server.
    fn active_user_count(&self) -> Result<i64, DirectoryError>;
}
