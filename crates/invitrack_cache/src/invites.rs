use dashmap::{
	mapref::one::{ Ref, RefMut },
	DashMap
};
use invitrack_models::InviteSnapshot;
use std::collections::HashMap;
use twilight_model::id::{
	marker::GuildMarker,
	Id
};

pub type GuildInvites = HashMap<String, InviteSnapshot>;

/// Last observed use count of every invite, per guild.
///
/// A guild is present from the moment it is first seen until the bot leaves it.
/// Removing something that is already gone is not an error, invite deletions
/// routinely race with the guild itself being dropped.
#[derive(Default)]
pub struct InviteUsageCache {
	guilds: DashMap<Id<GuildMarker>, GuildInvites>
}

impl InviteUsageCache {
	pub fn get(&self, guild_id: Id<GuildMarker>) -> Option<Ref<'_, Id<GuildMarker>, GuildInvites>> {
		let invites = self.guilds.get(&guild_id);
		if invites.is_none() {
			tracing::trace!("cache.invites.miss (guild_id={guild_id})");
		}

		invites
	}

	pub(crate) fn get_mut(&self, guild_id: Id<GuildMarker>) -> Option<RefMut<'_, Id<GuildMarker>, GuildInvites>> {
		self.guilds.get_mut(&guild_id)
	}

	pub fn snapshot(&self, guild_id: Id<GuildMarker>, code: &str) -> Option<InviteSnapshot> {
		self.guilds
			.get(&guild_id)
			.and_then(|x| x.get(code).cloned())
	}

	pub fn contains_guild(&self, guild_id: Id<GuildMarker>) -> bool {
		self.guilds.contains_key(&guild_id)
	}

	pub fn guild_count(&self) -> usize {
		self.guilds.len()
	}

	/// Replaces everything known about a guild, codes missing from `invites` are forgotten.
	pub fn put(&self, guild_id: Id<GuildMarker>, invites: impl IntoIterator<Item = InviteSnapshot>) {
		let invites: GuildInvites = invites
			.into_iter()
			.map(|x| (x.code.clone(), x))
			.collect();
		tracing::debug!("cache.invites.put (guild_id={guild_id}) (count={})", invites.len());

		self.guilds.insert(guild_id, invites);
	}

	pub fn upsert(&self, guild_id: Id<GuildMarker>, snapshot: InviteSnapshot) {
		tracing::debug!("cache.invites.upsert (guild_id={guild_id}) (code={}) (uses={})", snapshot.code, snapshot.uses);
		self.guilds
			.entry(guild_id)
			.or_default()
			.insert(snapshot.code.clone(), snapshot);
	}

	pub fn remove(&self, guild_id: Id<GuildMarker>, code: &str) -> Option<InviteSnapshot> {
		let removed = self.guilds
			.get_mut(&guild_id)
			.and_then(|mut x| x.remove(code));
		match removed {
			Some(_) => tracing::debug!("cache.invites.remove (guild_id={guild_id}) (code={code})"),
			None => tracing::debug!("cache.invites.remove.missing (guild_id={guild_id}) (code={code})")
		}

		removed
	}

	pub fn drop_guild(&self, guild_id: Id<GuildMarker>) -> Option<GuildInvites> {
		let removed = self.guilds
			.remove(&guild_id)
			.map(|(_, invites)| invites);
		if removed.is_some() {
			tracing::debug!("cache.invites.drop_guild (guild_id={guild_id})");
		}

		removed
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn guild() -> Id<GuildMarker> {
		Id::new(42)
	}

	#[test]
	fn upsert_then_get_returns_snapshot() {
		let cache = InviteUsageCache::default();
		let snapshot = InviteSnapshot::new("abc", 3).with_inviter(Id::new(7));
		cache.upsert(guild(), snapshot.clone());

		let invites = cache.get(guild()).unwrap();
		assert_eq!(invites.get("abc"), Some(&snapshot));
	}

	#[test]
	fn upsert_creates_missing_guild() {
		let cache = InviteUsageCache::default();
		assert!(!cache.contains_guild(guild()));

		cache.upsert(guild(), InviteSnapshot::new("abc", 0));
		assert!(cache.contains_guild(guild()));
		assert_eq!(cache.guild_count(), 1);
	}

	#[test]
	fn put_replaces_instead_of_merging() {
		let cache = InviteUsageCache::default();
		cache.put(guild(), [InviteSnapshot::new("old", 9), InviteSnapshot::new("kept", 1)]);
		cache.put(guild(), [InviteSnapshot::new("kept", 2), InviteSnapshot::new("new", 0)]);

		let invites = cache.get(guild()).unwrap();
		assert_eq!(invites.len(), 2);
		assert!(!invites.contains_key("old"));
		assert_eq!(invites["kept"].uses, 2);
		assert_eq!(invites["new"].uses, 0);
	}

	#[test]
	fn put_with_nothing_leaves_an_empty_guild() {
		let cache = InviteUsageCache::default();
		cache.put(guild(), Vec::<InviteSnapshot>::new());

		assert!(cache.get(guild()).unwrap().is_empty());
	}

	#[test]
	fn remove_returns_previous_snapshot_once() {
		let cache = InviteUsageCache::default();
		cache.upsert(guild(), InviteSnapshot::new("abc", 4));

		assert_eq!(cache.remove(guild(), "abc"), Some(InviteSnapshot::new("abc", 4)));
		assert_eq!(cache.remove(guild(), "abc"), None);
		assert!(cache.contains_guild(guild()));
	}

	#[test]
	fn remove_on_unknown_guild_is_a_no_op() {
		let cache = InviteUsageCache::default();
		assert_eq!(cache.remove(guild(), "abc"), None);
		assert!(!cache.contains_guild(guild()));
	}

	#[test]
	fn drop_guild_twice_is_benign() {
		let cache = InviteUsageCache::default();
		cache.upsert(guild(), InviteSnapshot::new("abc", 1));

		assert!(cache.drop_guild(guild()).is_some());
		assert!(cache.drop_guild(guild()).is_none());
		assert!(cache.get(guild()).is_none());
		assert_eq!(cache.remove(guild(), "abc"), None);
	}

	#[test]
	fn recreated_code_starts_from_its_own_count() {
		let cache = InviteUsageCache::default();
		cache.upsert(guild(), InviteSnapshot::new("X", 12));
		cache.remove(guild(), "X");
		cache.upsert(guild(), InviteSnapshot::new("X", 0));

		assert_eq!(cache.snapshot(guild(), "X").map(|x| x.uses), Some(0));
	}
}
