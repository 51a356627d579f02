//! Sharing lifecycle: enable, disable, pause eviction, lost-space
//! eviction.

mod helpers;

use helpers::{expect_event, settle, TestEnv};
use larder::{EventPayload, ListKind, SpaceEvent, SpaceId, SpaceRepository, SyncStatus};

#[tokio::test]
async fn test_enable_sharing_uploads_local_data() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    owner.add_item("Milk", ListKind::Shopping);
    owner.add_item("Bread", ListKind::Shopping);
    owner.add_item("Eggs", ListKind::Pantry);

    let space = owner.sync.enable_sharing().await.unwrap();
    settle().await;

    // Three local items, exactly three remote item writes.
    assert_eq!(env.backend.stats.item_writes(), 3);
    assert!(!space.sharing_paused);

    let remote_space = env
        .backend
        .client()
        .get_space(space.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!remote_space.sharing_paused);

    let settings = &owner.store.state().settings;
    assert!(settings.sharing_enabled);
    assert_eq!(settings.current_space_id, Some(SpaceId::from(owner.user.id)));
    assert_eq!(settings.sync_status, SyncStatus::Synced);
}

#[tokio::test]
async fn test_disable_sharing_resets_settings() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    owner.sync.enable_sharing().await.unwrap();
    settle().await;

    owner.sync.disable_sharing().await.unwrap();
    settle().await;

    let settings = &owner.store.state().settings;
    assert!(!settings.sharing_enabled);
    assert!(settings.current_space_id.is_none());
    assert_eq!(settings.sync_status, SyncStatus::Local);
    assert!(settings.available_spaces.is_empty());

    // The space itself is paused for any remaining members.
    let space = env
        .backend
        .client()
        .get_space(SpaceId::from(owner.user.id))
        .await
        .unwrap()
        .unwrap();
    assert!(space.sharing_paused);
}

#[tokio::test]
async fn test_member_evicted_when_space_paused() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    let member = env.device("member@example.com").await;

    let space = owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("member@example.com").await.unwrap();
    member.sync.accept_invite(invite.id).await.unwrap();
    member.sync.switch_space(space.id).await.unwrap();
    settle().await;
    assert_eq!(
        member.store.state().settings.current_space_id,
        Some(space.id)
    );

    let mut events = member.sync.events();
    owner.sync.disable_sharing().await.unwrap();

    let event = expect_event(&mut events, |e| {
        matches!(
            e.payload,
            EventPayload::Space(SpaceEvent::EvictedFromPausedSpace { .. })
        )
    })
    .await;
    match event.payload {
        EventPayload::Space(SpaceEvent::EvictedFromPausedSpace { space_id }) => {
            assert_eq!(space_id, space.id);
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    settle().await;
    // Switched back to the member's own space id.
    assert_eq!(
        member.store.state().settings.current_space_id,
        Some(SpaceId::from(member.user.id))
    );
}

#[tokio::test]
async fn test_member_evicted_when_removed() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    let member = env.device("member@example.com").await;

    let space = owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("member@example.com").await.unwrap();
    member.sync.accept_invite(invite.id).await.unwrap();
    member.sync.switch_space(space.id).await.unwrap();
    settle().await;

    let mut events = member.sync.events();
    owner.sync.remove_member(member.user.id).await.unwrap();

    expect_event(&mut events, |e| {
        matches!(
            e.payload,
            EventPayload::Space(SpaceEvent::EvictedFromLostSpace { .. })
        )
    })
    .await;

    settle().await;
    assert_eq!(
        member.store.state().settings.current_space_id,
        Some(SpaceId::from(member.user.id))
    );
}

#[tokio::test]
async fn test_eviction_preserves_local_items() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    let member = env.device("member@example.com").await;

    owner.add_item("Milk", ListKind::Shopping);
    let space = owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("member@example.com").await.unwrap();
    member.sync.accept_invite(invite.id).await.unwrap();
    member.sync.switch_space(space.id).await.unwrap();
    settle().await;
    assert_eq!(member.store.state().items.len(), 1);

    owner.sync.disable_sharing().await.unwrap();
    settle().await;

    // The member's own space has no remote copy; the local data they
    // were looking at stays put rather than being wiped by a phantom
    // empty snapshot.
    assert_eq!(member.store.state().items.len(), 1);
}
