//! # larder-auth
//!
//! The minimal identity capability the sync engine consumes: who is
//! signed in, a way to observe sign-in/out transitions, and the account
//! operations the host surfaces. Nothing else about the authentication
//! provider leaks into the sync core.

pub mod identity;
pub mod memory;

pub use identity::{AuthUser, IdentityProvider};
pub use memory::MemoryIdentity;
