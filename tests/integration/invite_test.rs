//! Invite lifecycle: send, accept, decline, cancel, and the defensive
//! decline when the target space is gone.

mod helpers;

use helpers::{settle, TestEnv};
use larder::{ErrorKind, InviteStatus, SpaceRepository};

#[tokio::test]
async fn test_duplicate_pending_invite_rejected() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    owner.sync.enable_sharing().await.unwrap();

    owner.sync.send_invite("guest@example.com").await.unwrap();
    let err = owner
        .sync
        .send_invite("Guest@Example.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_accept_adds_member_and_marks_accepted() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    let guest = env.device("guest@example.com").await;

    let space = owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("guest@example.com").await.unwrap();

    let joined = guest.sync.accept_invite(invite.id).await.unwrap();
    assert_eq!(joined.id, space.id);

    let repo = env.backend.client();
    let space = repo.get_space(space.id).await.unwrap().unwrap();
    assert!(space.is_member(guest.user.id));

    let invite = repo.get_invite(invite.id).await.unwrap().unwrap();
    assert_eq!(invite.status, InviteStatus::Accepted);
}

#[tokio::test]
async fn test_accept_into_deleted_space_declines_defensively() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    let guest = env.device("guest@example.com").await;

    let space = owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("guest@example.com").await.unwrap();
    settle().await;

    env.backend.drop_space(space.id);

    let err = guest.sync.accept_invite(invite.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let invite = env
        .backend
        .client()
        .get_invite(invite.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invite.status, InviteStatus::Declined);
}

#[tokio::test]
async fn test_accept_requires_matching_email() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    let bystander = env.device("bystander@example.com").await;

    owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("guest@example.com").await.unwrap();

    let err = bystander.sync.accept_invite(invite.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_decline_marks_declined_and_blocks_accept() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    let guest = env.device("guest@example.com").await;

    owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("guest@example.com").await.unwrap();

    guest.sync.decline_invite(invite.id).await.unwrap();
    let stored = env
        .backend
        .client()
        .get_invite(invite.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, InviteStatus::Declined);

    let err = guest.sync.accept_invite(invite.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_cancel_deletes_invite_outright() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    owner.sync.enable_sharing().await.unwrap();

    let invite = owner.sync.send_invite("guest@example.com").await.unwrap();
    owner.sync.cancel_invite(invite.id).await.unwrap();

    let stored = env.backend.client().get_invite(invite.id).await.unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn test_only_inviter_can_cancel() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    let guest = env.device("guest@example.com").await;

    owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("guest@example.com").await.unwrap();

    let err = guest.sync.cancel_invite(invite.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_pending_invites_listing() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    let guest = env.device("guest@example.com").await;

    owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("guest@example.com").await.unwrap();

    let pending = guest.sync.pending_invites().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, invite.id);

    let sent = owner.sync.sent_invites().await.unwrap();
    assert_eq!(sent.len(), 1);
}
