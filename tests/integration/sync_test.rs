//! Cross-device synchronization: pushes, snapshot ingest, loop
//! prevention.

mod helpers;

use helpers::{settle, TestDevice, TestEnv};
use larder::{Command, ListKind, SpaceId};

/// Owner shares a space, member joins it. Returns (owner, member).
async fn shared_pair(env: &TestEnv) -> (TestDevice, TestDevice, SpaceId) {
    let owner = env.device("owner@example.com").await;
    let member = env.device("member@example.com").await;

    let space = owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("member@example.com").await.unwrap();
    member.sync.accept_invite(invite.id).await.unwrap();
    member.sync.switch_space(space.id).await.unwrap();
    settle().await;
    (owner, member, space.id)
}

#[tokio::test]
async fn test_member_receives_owner_items() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    owner.add_item("Milk", ListKind::Shopping);
    owner.add_item("Eggs", ListKind::Pantry);

    let space = owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("member@example.com").await.unwrap();

    let member = env.device("member@example.com").await;
    member.sync.accept_invite(invite.id).await.unwrap();
    member.sync.switch_space(space.id).await.unwrap();
    settle().await;

    let state = member.store.state();
    assert_eq!(state.items.len(), 2);
    assert!(state.item_by_name("Milk").is_some());
    assert!(state.item_by_name("Eggs").is_some());
}

#[tokio::test]
async fn test_live_edits_flow_both_ways() {
    let env = TestEnv::new();
    let (owner, member, _) = shared_pair(&env).await;

    owner.add_item("Butter", ListKind::Shopping);
    settle().await;
    let butter = member
        .store
        .state()
        .item_by_name("Butter")
        .cloned()
        .expect("member did not receive the item");

    member.sync.dispatch(Command::ToggleCompleted { id: butter.id });
    settle().await;

    let owner_view = owner.store.state();
    let butter = owner_view.item_by_name("Butter").unwrap();
    assert!(butter.membership.shopping.as_ref().unwrap().completed);
}

#[tokio::test]
async fn test_ingest_replaces_whole_collection() {
    let env = TestEnv::new();
    let owner = env.device("owner@example.com").await;
    owner.add_item("Milk", ListKind::Shopping);
    let space = owner.sync.enable_sharing().await.unwrap();
    let invite = owner.sync.send_invite("member@example.com").await.unwrap();

    let member = env.device("member@example.com").await;
    // Local-only data on the member device before joining.
    member.add_item("Local leftovers", ListKind::Pantry);

    member.sync.accept_invite(invite.id).await.unwrap();
    member.sync.switch_space(space.id).await.unwrap();
    settle().await;

    // The remote snapshot is authoritative: full replace, not merge.
    let state = member.store.state();
    assert_eq!(state.items.len(), 1);
    assert!(state.item_by_name("Milk").is_some());
    assert!(state.item_by_name("Local leftovers").is_none());
}

#[tokio::test]
async fn test_ingest_does_not_echo_back() {
    let env = TestEnv::new();
    let (owner, _member, _) = shared_pair(&env).await;
    settle().await;

    let writes_before = env.backend.stats.item_writes();
    owner.add_item("Butter", ListKind::Shopping);
    settle().await;

    // One local command, one remote write. The snapshot deliveries on
    // both devices are remote-origin replaces and push nothing back.
    assert_eq!(env.backend.stats.item_writes(), writes_before + 1);
}

#[tokio::test]
async fn test_bulk_clear_propagates_deletes() {
    let env = TestEnv::new();
    let (owner, member, _) = shared_pair(&env).await;

    owner.add_item("Milk", ListKind::Shopping);
    owner.add_item("Bread", ListKind::Shopping);
    settle().await;
    assert_eq!(member.store.state().items.len(), 2);

    owner.sync.dispatch(Command::ClearList {
        list: ListKind::Shopping,
    });
    settle().await;

    assert!(member.store.state().items.is_empty());
    assert_eq!(env.backend.stats.item_deletes(), 2);
}
