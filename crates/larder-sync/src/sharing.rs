//! The sharing/invite state machine.
//!
//! States: local (sharing disabled) → owner-active (bound to own space)
//! → paused (owner disabled; members evicted) → member-active (bound to
//! someone else's space). The eviction checks for paused and lost
//! spaces run in the service's space-list handler; this module holds
//! the user-driven transitions and the invite lifecycle.

use larder_core::error::AppError;
use larder_core::events::SpaceEvent;
use larder_core::types::{InviteId, SpaceId, SyncStatus, UserId};
use larder_core::AppResult;
use larder_entity::{Invite, InviteStatus, Member, MemberRole, Space};
use larder_store::Command;
use tracing::{info, warn};

use crate::service::SyncService;

impl SyncService {
    /// Enable sharing: claim the user's own space, upload the local
    /// collections (local data wins over any stale remote copy), unpause
    /// the space, and start syncing it.
    pub async fn enable_sharing(&self) -> AppResult<Space> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| AppError::authentication("Sign in to enable sharing"))?;
        let space_id = SpaceId::from(user.id);

        self.dispatch(Command::SetSharingEnabled { enabled: true });
        self.dispatch(Command::SetCurrentSpace {
            space_id: Some(space_id),
        });
        self.set_status(SyncStatus::Syncing);

        match self.upload_local_data(&user.id, space_id, &user.email, user.display_name.clone()).await {
            Ok(space) => {
                self.set_user(Some(user.id)).await?;
                self.start_sync(space_id).await?;
                info!(space_id = %space_id, "sharing enabled");
                self.emit(SpaceEvent::SharingEnabled { space_id }.into());
                Ok(space)
            }
            Err(e) => {
                warn!(error = %e, "enabling sharing failed");
                self.set_status(SyncStatus::Error);
                Err(e)
            }
        }
    }

    async fn upload_local_data(
        &self,
        user_id: &UserId,
        space_id: SpaceId,
        email: &str,
        display_name: Option<String>,
    ) -> AppResult<Space> {
        let repo = &self.inner.repo;

        let mut space = repo
            .get_space(space_id)
            .await?
            .unwrap_or_else(|| Space::new(*user_id, email));
        space.owner_email = email.to_string();
        space.owner_display_name = display_name;
        repo.create_space(&space).await?;
        repo.add_member(&Member::new(space_id, *user_id, MemberRole::Owner, email))
            .await?;

        // Local data wins: drop whatever the space held, then upload.
        repo.clear_items(space_id).await?;
        repo.clear_recipes(space_id).await?;

        let state = self.state();
        let items: Vec<_> = state.items.values().cloned().collect();
        let recipes: Vec<_> = state.recipes.values().cloned().collect();
        repo.batch_set_items(space_id, &items, *user_id).await?;
        repo.batch_set_recipes(space_id, &recipes, *user_id).await?;

        repo.resume_sharing(space_id).await?;
        space.sharing_paused = false;
        Ok(space)
    }

    /// Disable sharing: pause the owned space (evicting members), tear
    /// down subscriptions, and reset the local settings.
    ///
    /// The host confirms with the user before calling; this is the
    /// post-confirmation action.
    pub async fn disable_sharing(&self) -> AppResult<()> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| AppError::authentication("Sign in to disable sharing"))?;
        let space_id = SpaceId::from(user.id);

        if let Err(e) = self.inner.repo.pause_sharing(space_id).await {
            // The space may never have been created; local teardown
            // still applies.
            warn!(space_id = %space_id, error = %e, "pausing space failed");
        }

        self.stop_sync().await;
        self.set_user(None).await?;
        self.dispatch(Command::ResetSettings);

        info!(space_id = %space_id, "sharing disabled");
        self.emit(SpaceEvent::SharingDisabled.into());
        Ok(())
    }

    /// Switch the device to another space the user belongs to.
    pub async fn switch_space(&self, space_id: SpaceId) -> AppResult<()> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| AppError::authentication("Sign in to switch spaces"))?;

        let space = self
            .inner
            .repo
            .get_space(space_id)
            .await?
            .ok_or_else(|| AppError::not_found("Space does not exist"))?;
        if !space.is_member(user.id) {
            return Err(AppError::authorization("Not a member of this space"));
        }
        if space.sharing_paused && !space.is_owner(user.id) {
            return Err(AppError::validation("Sharing is paused on this space"));
        }

        self.dispatch(Command::SetSharingEnabled { enabled: true });
        self.set_user(Some(user.id)).await?;
        self.start_sync(space_id).await?;

        self.emit(SpaceEvent::SwitchedSpace { space_id }.into());
        Ok(())
    }

    /// Remove a member from the user's own space (owner-side).
    pub async fn remove_member(&self, member_id: UserId) -> AppResult<()> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| AppError::authentication("Sign in to manage members"))?;
        let space_id = SpaceId::from(user.id);
        if member_id == user.id {
            return Err(AppError::validation("The owner cannot remove themselves"));
        }

        self.inner.repo.remove_member(space_id, member_id).await?;
        info!(space_id = %space_id, member = %member_id, "member removed");
        self.emit(
            SpaceEvent::MemberRemoved {
                space_id,
                user_id: member_id,
            }
            .into(),
        );
        Ok(())
    }

    // ── Invites ──────────────────────────────────────────────────────

    /// Invite an email to the user's own space. Duplicate pending
    /// invites to the same email are rejected.
    pub async fn send_invite(&self, invitee_email: &str) -> AppResult<Invite> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| AppError::authentication("Sign in to send invites"))?;
        let space_id = SpaceId::from(user.id);

        if !self.state().settings.sharing_enabled {
            return Err(AppError::validation("Enable sharing before inviting"));
        }
        if user.email.eq_ignore_ascii_case(invitee_email) {
            return Err(AppError::validation("You already belong to your space"));
        }
        if self
            .inner
            .repo
            .find_pending_invite(space_id, invitee_email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "A pending invite for {invitee_email} already exists"
            )));
        }

        let invite = Invite::new(space_id, user.id, &user.email, invitee_email);
        self.inner.repo.create_invite(&invite).await?;
        info!(space_id = %space_id, invite_id = %invite.id, "invite sent");
        Ok(invite)
    }

    /// Accept an invite addressed to the signed-in user.
    ///
    /// If the underlying space no longer exists the invite is
    /// defensively marked declined and an error is returned.
    pub async fn accept_invite(&self, invite_id: InviteId) -> AppResult<Space> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| AppError::authentication("Sign in to accept invites"))?;

        let invite = self
            .inner
            .repo
            .get_invite(invite_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invite does not exist"))?;
        if !invite.is_pending() {
            return Err(AppError::validation("Invite is no longer pending"));
        }
        if !invite.addressed_to(&user.email) {
            return Err(AppError::authorization(
                "Invite is addressed to a different account",
            ));
        }

        let Some(space) = self.inner.repo.get_space(invite.space_id).await? else {
            self.inner
                .repo
                .update_invite_status(invite_id, InviteStatus::Declined)
                .await?;
            return Err(AppError::not_found(
                "The space this invite points to no longer exists",
            ));
        };

        self.inner
            .repo
            .add_member(&Member::new(
                space.id,
                user.id,
                MemberRole::Editor,
                &user.email,
            ))
            .await?;
        self.inner
            .repo
            .update_invite_status(invite_id, InviteStatus::Accepted)
            .await?;

        info!(space_id = %space.id, invite_id = %invite_id, "invite accepted");
        Ok(space)
    }

    /// Decline an invite addressed to the signed-in user (invitee-side).
    pub async fn decline_invite(&self, invite_id: InviteId) -> AppResult<()> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| AppError::authentication("Sign in to decline invites"))?;

        let invite = self
            .inner
            .repo
            .get_invite(invite_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invite does not exist"))?;
        if !invite.addressed_to(&user.email) {
            return Err(AppError::authorization(
                "Invite is addressed to a different account",
            ));
        }

        self.inner
            .repo
            .update_invite_status(invite_id, InviteStatus::Declined)
            .await?;
        info!(invite_id = %invite_id, "invite declined");
        Ok(())
    }

    /// Delete an invite outright (owner-side cancel).
    pub async fn cancel_invite(&self, invite_id: InviteId) -> AppResult<()> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| AppError::authentication("Sign in to cancel invites"))?;

        let invite = self
            .inner
            .repo
            .get_invite(invite_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invite does not exist"))?;
        if invite.inviter_id != user.id {
            return Err(AppError::authorization("Only the inviter can cancel"));
        }

        self.inner.repo.delete_invite(invite_id).await?;
        info!(invite_id = %invite_id, "invite cancelled");
        Ok(())
    }

    /// Pending invites addressed to the signed-in user.
    pub async fn pending_invites(&self) -> AppResult<Vec<Invite>> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| AppError::authentication("Sign in to list invites"))?;
        self.inner.repo.pending_invites_for_email(&user.email).await
    }

    /// Invites sent from the user's own space (owner-side listing).
    pub async fn sent_invites(&self) -> AppResult<Vec<Invite>> {
        let user = self
            .inner
            .identity
            .current_user()
            .ok_or_else(|| AppError::authentication("Sign in to list invites"))?;
        self.inner
            .repo
            .invites_for_space(SpaceId::from(user.id))
            .await
    }
}
