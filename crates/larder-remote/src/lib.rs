//! # larder-remote
//!
//! The Remote Space Repository: a thin CRUD + realtime-subscription
//! abstraction over a multi-tenant document store, keyed by space id.
//!
//! The [`repository::SpaceRepository`] trait is the seam the sync engine
//! is written against; [`memory::MemorySpaceBackend`] is the in-process
//! implementation used by the composition root and the test suite.

pub mod memory;
pub mod repository;
pub mod sanitize;
pub mod subscription;

pub use memory::{MemorySpaceBackend, MemorySpaceRepository};
pub use repository::{SnapshotFn, SpaceRepository};
pub use subscription::SubscriptionHandle;
