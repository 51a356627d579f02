//! # larder-sync
//!
//! The synchronization engine: routes local commands to the remote space
//! (change interception), routes remote snapshots into the local store
//! (orchestration), and runs the sharing/invite state machine.
//!
//! Everything is owned by an explicit [`service::SyncService`] built
//! from injected dependencies; there is no module-level state, so any
//! number of independent engines can run side by side.

pub mod interceptor;
pub mod orchestrator;
pub mod service;
pub mod sharing;

pub use interceptor::PushOp;
pub use service::SyncService;
