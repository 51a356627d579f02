//! The identity provider seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use larder_core::types::UserId;
use larder_core::AppResult;

/// The signed-in user, as the identity provider reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Stable user id.
    pub id: UserId,
    /// Account email.
    pub email: String,
    /// Display name, if the account has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Capability interface over the authentication provider.
///
/// The sync core consumes exactly this surface; session persistence,
/// token refresh, and credential storage are the provider's business.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// The currently signed-in user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Observe auth-state transitions. The receiver starts at the
    /// current state and yields on every sign-in and sign-out.
    fn auth_state(&self) -> watch::Receiver<Option<AuthUser>>;

    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthUser>;

    /// Create an account and sign in.
    async fn sign_up(&self, email: &str, password: &str) -> AppResult<AuthUser>;

    /// Sign out.
    async fn sign_out(&self) -> AppResult<()>;

    /// Request a password reset email.
    async fn reset_password(&self, email: &str) -> AppResult<()>;
}
