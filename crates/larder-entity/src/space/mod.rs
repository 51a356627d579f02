//! Shared space domain entities.

pub mod invite;
pub mod member;
pub mod model;

pub use invite::{Invite, InviteStatus};
pub use member::{Member, MemberRole};
pub use model::Space;
