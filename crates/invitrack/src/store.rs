use dashmap::DashMap;
use invitrack_models::{ InviteSnapshot, InvitedMemberModel };
use sqlx::PgPool;
use std::future::Future;
use twilight_model::id::{
	marker::{ GuildMarker, UserMarker },
	Id
};

use crate::Result;

/// Durable mirror of the invite cache plus the inviter → invitee records.
///
/// Every write is idempotent. The cache stays authoritative for reconciliation,
/// nothing here is read back to decide which invite was used.
pub trait InviteStore: Send + Sync + 'static {
	/// Replaces the stored invites of a guild.
	fn save_invites(&self, guild_id: Id<GuildMarker>, invites: &[InviteSnapshot]) -> impl Future<Output = Result<()>> + Send;

	fn save_invite(&self, guild_id: Id<GuildMarker>, invite: &InviteSnapshot) -> impl Future<Output = Result<()>> + Send;

	fn delete_invite(&self, guild_id: Id<GuildMarker>, code: &str) -> impl Future<Output = Result<()>> + Send;

	/// Forgets the invites of a guild, join records are kept.
	fn delete_guild(&self, guild_id: Id<GuildMarker>) -> impl Future<Output = Result<()>> + Send;

	/// Stores a join, handing back the record it replaced.
	fn save_join(&self, record: &InvitedMemberModel) -> impl Future<Output = Result<Option<InvitedMemberModel>>> + Send;

	/// Removes a member's join record, handing back what was removed.
	fn delete_join(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> impl Future<Output = Result<Option<InvitedMemberModel>>> + Send;

	fn join(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> impl Future<Output = Result<Option<InvitedMemberModel>>> + Send;

	/// Join records naming `inviter_id` as the inviter, oldest first.
	fn invited_by(&self, guild_id: Id<GuildMarker>, inviter_id: Id<UserMarker>) -> impl Future<Output = Result<Vec<InvitedMemberModel>>> + Send;
}

pub struct PgInviteStore {
	pool: PgPool
}

impl PgInviteStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}

impl InviteStore for PgInviteStore {
	async fn save_invites(&self, guild_id: Id<GuildMarker>, invites: &[InviteSnapshot]) -> Result<()> {
		Ok(InviteSnapshot::replace_guild(&self.pool, guild_id, invites).await?)
	}

	async fn save_invite(&self, guild_id: Id<GuildMarker>, invite: &InviteSnapshot) -> Result<()> {
		Ok(invite.save(&self.pool, guild_id).await?)
	}

	async fn delete_invite(&self, guild_id: Id<GuildMarker>, code: &str) -> Result<()> {
		Ok(InviteSnapshot::delete(&self.pool, guild_id, code).await?)
	}

	async fn delete_guild(&self, guild_id: Id<GuildMarker>) -> Result<()> {
		Ok(InviteSnapshot::delete_guild(&self.pool, guild_id).await?)
	}

	async fn save_join(&self, record: &InvitedMemberModel) -> Result<Option<InvitedMemberModel>> {
		Ok(record.save(&self.pool).await?)
	}

	async fn delete_join(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Result<Option<InvitedMemberModel>> {
		Ok(InvitedMemberModel::delete(&self.pool, guild_id, member_id).await?)
	}

	async fn join(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Result<Option<InvitedMemberModel>> {
		Ok(InvitedMemberModel::get(&self.pool, guild_id, member_id).await?)
	}

	async fn invited_by(&self, guild_id: Id<GuildMarker>, inviter_id: Id<UserMarker>) -> Result<Vec<InvitedMemberModel>> {
		Ok(InvitedMemberModel::invited_by(&self.pool, guild_id, inviter_id).await?)
	}
}

/// Keeps everything in process memory, for running without a database.
#[derive(Default)]
pub struct MemoryStore {
	invites: DashMap<(Id<GuildMarker>, String), InviteSnapshot>,
	joins: DashMap<(Id<GuildMarker>, Id<UserMarker>), InvitedMemberModel>
}

impl MemoryStore {
	pub fn invite(&self, guild_id: Id<GuildMarker>, code: &str) -> Option<InviteSnapshot> {
		self.invites
			.get(&(guild_id, code.to_owned()))
			.map(|x| x.value().clone())
	}

	pub fn invite_count(&self, guild_id: Id<GuildMarker>) -> usize {
		self.invites
			.iter()
			.filter(|x| x.key().0 == guild_id)
			.count()
	}
}

impl InviteStore for MemoryStore {
	async fn save_invites(&self, guild_id: Id<GuildMarker>, invites: &[InviteSnapshot]) -> Result<()> {
		self.invites.retain(|key, _| key.0 != guild_id);
		for invite in invites {
			self.invites.insert((guild_id, invite.code.clone()), invite.clone());
		}

		Ok(())
	}

	async fn save_invite(&self, guild_id: Id<GuildMarker>, invite: &InviteSnapshot) -> Result<()> {
		self.invites
			.entry((guild_id, invite.code.clone()))
			.and_modify(|x| {
				x.uses = invite.uses;
				x.inviter_id = invite.inviter_id.or(x.inviter_id);
			})
			.or_insert_with(|| invite.clone());

		Ok(())
	}

	async fn delete_invite(&self, guild_id: Id<GuildMarker>, code: &str) -> Result<()> {
		self.invites.remove(&(guild_id, code.to_owned()));
		Ok(())
	}

	async fn delete_guild(&self, guild_id: Id<GuildMarker>) -> Result<()> {
		self.invites.retain(|key, _| key.0 != guild_id);
		Ok(())
	}

	async fn save_join(&self, record: &InvitedMemberModel) -> Result<Option<InvitedMemberModel>> {
		Ok(self.joins.insert((record.guild_id, record.member_id), record.clone()))
	}

	async fn delete_join(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Result<Option<InvitedMemberModel>> {
		Ok(self.joins
			.remove(&(guild_id, member_id))
			.map(|(_, record)| record)
		)
	}

	async fn join(&self, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Result<Option<InvitedMemberModel>> {
		Ok(self.joins
			.get(&(guild_id, member_id))
			.map(|x| x.value().clone())
		)
	}

	async fn invited_by(&self, guild_id: Id<GuildMarker>, inviter_id: Id<UserMarker>) -> Result<Vec<InvitedMemberModel>> {
		let mut records: Vec<_> = self.joins
			.iter()
			.filter(|x| x.guild_id == guild_id && x.inviter_id == Some(inviter_id))
			.map(|x| x.value().clone())
			.collect();
		records.sort_by_key(|x| x.joined_at);

		Ok(records)
	}
}
