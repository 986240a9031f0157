pub mod error;
pub use error::{ Error, Result };

pub mod invite;
pub use invite::InviteSnapshot;

pub mod member;
pub use member::{ InvitedMemberModel, MemberModel };

pub mod schema;
