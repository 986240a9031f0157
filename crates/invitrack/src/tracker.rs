use chrono::Utc;
use dashmap::DashMap;
use futures::future::try_join_all;
use invitrack_cache::{ InviteUsageCache, Reconciler };
use invitrack_models::{ InviteSnapshot, InvitedMemberModel, MemberModel };
use invitrack_util::Config;
use std::{
	sync::Arc,
	time::Duration
};
use tokio::sync::Mutex;
use tracing::{ Instrument, info_span };
use twilight_model::id::{
	marker::{ GuildMarker, UserMarker },
	Id
};

use crate::{
	lookup::Lookups,
	source::InviteSource,
	store::InviteStore,
	Result
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GuildState {
	/// Not seen yet, or its invites couldn't be listed.
	Unloaded,
	Loaded,
	Removed
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JoinOutcome {
	Attributed(InvitedMemberModel),
	/// No cached invite moved; vanity urls, stale caches and guilds still loading end up here.
	Unattributed
}

#[derive(Clone, Debug)]
pub struct TrackerOptions {
	pub fetch_timeout: Duration,
	pub lookup_capacity: u64,
	pub lookup_ttl: Duration
}

impl Default for TrackerOptions {
	fn default() -> Self {
		Self {
			fetch_timeout: Duration::from_secs(10),
			lookup_capacity: 1000,
			lookup_ttl: Duration::from_secs(300)
		}
	}
}

impl From<&Config> for TrackerOptions {
	fn from(config: &Config) -> Self {
		Self {
			fetch_timeout: config.fetch_timeout,
			lookup_capacity: config.lookup_capacity,
			lookup_ttl: config.lookup_ttl
		}
	}
}

/// Turns guild, invite and member lifecycle events into cache and store updates.
///
/// Events for one guild are handled one at a time, each holding that guild's
/// lock from the live fetch until the cache and store are written. Events for
/// different guilds run concurrently.
pub struct Tracker<S, P> {
	source: S,
	store: P,
	reconciler: Reconciler,
	guild_locks: DashMap<Id<GuildMarker>, Arc<Mutex<()>>>,
	guild_states: DashMap<Id<GuildMarker>, GuildState>,
	lookups: Lookups,
	fetch_timeout: Duration
}

impl<S: InviteSource, P: InviteStore> Tracker<S, P> {
	pub fn new(source: S, store: P, cache: Arc<InviteUsageCache>, options: TrackerOptions) -> Self {
		Self {
			source,
			store,
			reconciler: Reconciler::new(cache),
			guild_locks: DashMap::new(),
			guild_states: DashMap::new(),
			lookups: Lookups::new(options.lookup_capacity, options.lookup_ttl),
			fetch_timeout: options.fetch_timeout
		}
	}

	pub fn cache(&self) -> &InviteUsageCache {
		self.reconciler.cache()
	}

	pub fn store(&self) -> &P {
		&self.store
	}

	pub fn guild_state(&self, guild_id: Id<GuildMarker>) -> GuildState {
		self.guild_states
			.get(&guild_id)
			.map_or(GuildState::Unloaded, |x| *x)
	}

	/// Locks are never dropped, a replacement would not exclude tasks still waiting on the old one.
	fn guild_lock(&self, guild_id: Id<GuildMarker>) -> Arc<Mutex<()>> {
		Arc::clone(&self.guild_locks.entry(guild_id).or_default())
	}

	async fn fetch_invites(&self, guild_id: Id<GuildMarker>) -> Result<Vec<InviteSnapshot>> {
		let result = tokio::time::timeout(self.fetch_timeout, self.source.invites(guild_id))
			.await
			.map_err(Into::into)
			.and_then(|x| x);
		if let Err(error) = &result {
			tracing::warn!("skipping guild event, could not list invites (guild_id={guild_id}): {error}");
		}

		result
	}

	pub async fn on_guild_join(&self, guild_id: Id<GuildMarker>) -> Result<()> {
		let lock = self.guild_lock(guild_id);
		let _guard = lock.lock().await;

		let invites = self.fetch_invites(guild_id)
			.instrument(info_span!("tracker.guild_join.fetch", %guild_id))
			.await?;
		self.reconciler.resync(guild_id, invites.iter().cloned());
		self.guild_states.insert(guild_id, GuildState::Loaded);
		tracing::info!("tracker.guild.load (guild_id={guild_id}) (invites={})", invites.len());

		self.store.save_invites(guild_id, &invites).await
	}

	pub async fn on_guild_remove(&self, guild_id: Id<GuildMarker>) -> Result<()> {
		let lock = self.guild_lock(guild_id);
		let _guard = lock.lock().await;

		self.cache().drop_guild(guild_id);
		self.guild_states.insert(guild_id, GuildState::Removed);
		tracing::info!("tracker.guild.remove (guild_id={guild_id})");

		self.store.delete_guild(guild_id).await
	}

	pub async fn on_invite_create(&self, guild_id: Id<GuildMarker>, invite: InviteSnapshot) -> Result<()> {
		let lock = self.guild_lock(guild_id);
		let _guard = lock.lock().await;

		self.cache().upsert(guild_id, invite.clone());
		tracing::info!("tracker.invite.create (guild_id={guild_id}) (code={})", invite.code);

		self.store.save_invite(guild_id, &invite).await
	}

	/// Join records that name the deleted invite are left alone.
	pub async fn on_invite_delete(&self, guild_id: Id<GuildMarker>, code: &str) -> Result<()> {
		let lock = self.guild_lock(guild_id);
		let _guard = lock.lock().await;

		self.cache().remove(guild_id, code);
		tracing::info!("tracker.invite.delete (guild_id={guild_id}) (code={code})");

		self.store.delete_invite(guild_id, code).await
	}

	pub async fn on_member_join(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Result<JoinOutcome> {
		let lock = self.guild_lock(guild_id);
		let _guard = lock.lock().await;

		let live_invites = self.fetch_invites(guild_id)
			.instrument(info_span!("tracker.member_join.fetch", %guild_id, %member_id))
			.await?;
		let Some(invite) = self.reconciler.resolve_used_invite(guild_id, &live_invites) else {
			tracing::info!("tracker.member.join.unattributed (guild_id={guild_id}) (member_id={member_id})");
			return Ok(JoinOutcome::Unattributed);
		};

		self.store.save_invite(guild_id, &invite).await?;

		let record = InvitedMemberModel {
			code: invite.code,
			guild_id,
			inviter_id: invite.inviter_id,
			joined_at: Utc::now(),
			member_id
		};
		let previous = self.store.save_join(&record).await?;
		self.lookups.invalidate(guild_id, member_id, record.inviter_id).await;
		if let Some(previous_inviter_id) = previous.and_then(|x| x.inviter_id) {
			self.lookups.invalidate(guild_id, member_id, Some(previous_inviter_id)).await;
		}
		tracing::info!("tracker.member.join (guild_id={guild_id}) (member_id={member_id}) (code={})", record.code);

		Ok(JoinOutcome::Attributed(record))
	}

	pub async fn on_member_leave(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Result<()> {
		let lock = self.guild_lock(guild_id);
		let _guard = lock.lock().await;

		let removed = self.store.delete_join(guild_id, member_id).await?;
		self.lookups.invalidate(guild_id, member_id, removed.as_ref().and_then(|x| x.inviter_id)).await;
		if removed.is_some() {
			tracing::info!("tracker.member.leave (guild_id={guild_id}) (member_id={member_id})");
		}

		Ok(())
	}

	/// Diffs an already fetched invite list against the cache, see [`Reconciler::resolve_used_invite`].
	pub fn resolve_used_invite(&self, guild_id: Id<GuildMarker>, live_invites: &[InviteSnapshot]) -> Option<String> {
		self.reconciler
			.resolve_used_invite(guild_id, live_invites)
			.map(|x| x.code)
	}

	pub async fn inviter(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Result<Option<Id<UserMarker>>> {
		if let Some(inviter_id) = self.lookups.inviter(guild_id, member_id).await {
			return Ok(inviter_id);
		}

		let lock = self.guild_lock(guild_id);
		let _guard = lock.lock().await;

		let inviter_id = self.store
			.join(guild_id, member_id)
			.await?
			.and_then(|x| x.inviter_id);
		self.lookups.set_inviter(guild_id, member_id, inviter_id).await;

		Ok(inviter_id)
	}

	pub async fn invited_members(&self, guild_id: Id<GuildMarker>, inviter_id: Id<UserMarker>) -> Result<Vec<Id<UserMarker>>> {
		if let Some(member_ids) = self.lookups.invited(guild_id, inviter_id).await {
			return Ok(member_ids);
		}

		let lock = self.guild_lock(guild_id);
		let _guard = lock.lock().await;

		let member_ids: Vec<_> = self.store
			.invited_by(guild_id, inviter_id)
			.await?
			.into_iter()
			.map(|x| x.member_id)
			.collect();
		self.lookups.set_invited(guild_id, inviter_id, member_ids.clone()).await;

		Ok(member_ids)
	}

	/// The inviter as a guild member, `None` if unknown or no longer in the guild.
	pub async fn inviter_member(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Result<Option<MemberModel>> {
		match self.inviter(guild_id, member_id).await? {
			Some(inviter_id) => self.source.member(guild_id, inviter_id).await,
			None => Ok(None)
		}
	}

	/// Everyone `inviter_id` invited who is still in the guild.
	pub async fn invited_member_models(&self, guild_id: Id<GuildMarker>, inviter_id: Id<UserMarker>) -> Result<Vec<MemberModel>> {
		let member_ids = self.invited_members(guild_id, inviter_id).await?;
		Ok(try_join_all(member_ids
			.into_iter()
			.map(|member_id| self.source.member(guild_id, member_id))
		)
			.await?
			.into_iter()
			.flatten()
			.collect()
		)
	}
}
