use moka::future::Cache;
use std::time::Duration;
use twilight_model::id::{
	marker::{ GuildMarker, UserMarker },
	Id
};

type MemberKey = (Id<GuildMarker>, Id<UserMarker>);

/// Memoized answers to "who invited X" and "who did Y invite".
///
/// Entries are dropped whenever a join or leave touches them, so a hit is never
/// older than the last write to the store.
pub struct Lookups {
	inviters: Cache<MemberKey, Option<Id<UserMarker>>>,
	invited: Cache<MemberKey, Vec<Id<UserMarker>>>
}

impl Lookups {
	pub fn new(capacity: u64, time_to_live: Duration) -> Self {
		Self {
			inviters: Cache::builder()
				.max_capacity(capacity)
				.time_to_live(time_to_live)
				.build(),
			invited: Cache::builder()
				.max_capacity(capacity)
				.time_to_live(time_to_live)
				.build()
		}
	}

	pub async fn inviter(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Option<Option<Id<UserMarker>>> {
		self.inviters.get(&(guild_id, member_id)).await
	}

	pub async fn set_inviter(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>, inviter_id: Option<Id<UserMarker>>) {
		self.inviters.insert((guild_id, member_id), inviter_id).await;
	}

	pub async fn invited(&self, guild_id: Id<GuildMarker>, inviter_id: Id<UserMarker>) -> Option<Vec<Id<UserMarker>>> {
		self.invited.get(&(guild_id, inviter_id)).await
	}

	pub async fn set_invited(&self, guild_id: Id<GuildMarker>, inviter_id: Id<UserMarker>, member_ids: Vec<Id<UserMarker>>) {
		self.invited.insert((guild_id, inviter_id), member_ids).await;
	}

	/// Drops everything a join or leave of `member_id` could have changed.
	pub async fn invalidate(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>, inviter_id: Option<Id<UserMarker>>) {
		self.inviters.invalidate(&(guild_id, member_id)).await;
		if let Some(inviter_id) = inviter_id {
			self.invited.invalidate(&(guild_id, inviter_id)).await;
		}
	}
}
