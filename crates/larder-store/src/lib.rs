//! # larder-store
//!
//! The Persisted Local Store: an observable, versioned, disk-persisted
//! state container for items, recipes, and sync settings.
//!
//! Every mutation flows through [`Store::apply`] as a [`command::Command`]
//! tagged with its [`command::Origin`]; the reducer is pure and
//! synchronous, and each command variant declares how it synchronizes via
//! [`command::Command::sync_class`]. Snapshots are persisted as a
//! versioned JSON blob, migrated in order on load.

pub mod command;
pub mod migration;
pub mod persistence;
pub mod reducer;
pub mod state;
pub mod store;

pub use command::{Command, ItemTarget, Origin, SyncClass};
pub use persistence::SnapshotStore;
pub use state::AppState;
pub use store::{Applied, Store};
