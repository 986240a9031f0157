pub mod discord;
pub mod error;
pub mod lookup;
pub mod source;
pub mod store;
pub mod tracker;

pub use error::{ Error, ErrorKind, Result };
pub use source::{ DiscordSource, InviteSource };
pub use store::{ InviteStore, MemoryStore, PgInviteStore };
pub use tracker::{ GuildState, JoinOutcome, Tracker, TrackerOptions };
