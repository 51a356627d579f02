//! In-process identity provider.
//!
//! Holds accounts in memory and reports auth-state transitions over a
//! watch channel. Used by the composition root in development and by the
//! test suite; a hosted provider implements the same trait.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::info;

use larder_core::error::AppError;
use larder_core::types::UserId;
use larder_core::AppResult;

use crate::identity::{AuthUser, IdentityProvider};

/// One stored account.
#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
}

/// An in-process [`IdentityProvider`].
#[derive(Debug)]
pub struct MemoryIdentity {
    accounts: DashMap<String, Account>,
    state_tx: watch::Sender<Option<AuthUser>>,
    /// Retained so the watch channel stays open even when no external
    /// subscriber exists; otherwise `state_tx.send` is a no-op and the
    /// current-user value never persists.
    _state_rx: watch::Receiver<Option<AuthUser>>,
}

impl MemoryIdentity {
    /// Create a provider with no accounts and nobody signed in.
    pub fn new() -> Self {
        let (state_tx, _state_rx) = watch::channel(None);
        Self {
            accounts: DashMap::new(),
            state_tx,
            _state_rx,
        }
    }

    /// Register an account without signing it in. Test convenience.
    pub fn register(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: UserId::new(),
            email: email.to_string(),
            display_name: None,
        };
        self.accounts.insert(
            email.to_ascii_lowercase(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    fn current_user(&self) -> Option<AuthUser> {
        self.state_tx.borrow().clone()
    }

    fn auth_state(&self) -> watch::Receiver<Option<AuthUser>> {
        self.state_tx.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        let account = self
            .accounts
            .get(&email.to_ascii_lowercase())
            .ok_or_else(|| AppError::authentication("Unknown email or wrong password"))?;
        if account.password != password {
            return Err(AppError::authentication("Unknown email or wrong password"));
        }
        let user = account.user.clone();
        drop(account);

        info!(user_id = %user.id, "signed in");
        let _ = self.state_tx.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        let key = email.to_ascii_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(AppError::conflict("An account with this email exists"));
        }
        let user = self.register(email, password);

        info!(user_id = %user.id, "account created");
        let _ = self.state_tx.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> AppResult<()> {
        info!("signed out");
        let _ = self.state_tx.send(None);
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> AppResult<()> {
        if !self.accounts.contains_key(&email.to_ascii_lowercase()) {
            return Err(AppError::not_found("No account with this email"));
        }
        // Nothing to send in-process; the hosted provider emails a link.
        Ok(())
    }
}
