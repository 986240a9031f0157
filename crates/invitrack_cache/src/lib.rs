pub mod invites;
pub use invites::{ GuildInvites, InviteUsageCache };

pub mod reconcile;
pub use reconcile::Reconciler;
