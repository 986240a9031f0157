use chrono::{ DateTime, Utc };
use futures::TryStreamExt;
use sqlx::PgPool;
use twilight_http::Client;
use twilight_model::{
	guild::Member,
	id::{
		marker::{ GuildMarker, UserMarker },
		Id
	},
	util::Timestamp
};

use crate::Result;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberModel {
	pub joined_at: Option<Timestamp>,
	pub nick: Option<String>,
	pub pending: bool,
	pub user_id: Id<UserMarker>
}

impl MemberModel {
	pub async fn get(client: &Client, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> Result<Self> {
		Ok(client
			.guild_member(guild_id, user_id)
			.await?
			.model()
			.await?
			.into()
		)
	}
}

impl std::hash::Hash for MemberModel {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.user_id.hash(state);
	}
}

impl From<Member> for MemberModel {
	fn from(value: Member) -> Self {
		Self {
			joined_at: value.joined_at,
			nick: value.nick,
			pending: value.pending,
			user_id: value.user.id
		}
	}
}

/// A member joining a guild through a known invite.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvitedMemberModel {
	pub code: String,
	pub guild_id: Id<GuildMarker>,
	pub inviter_id: Option<Id<UserMarker>>,
	pub joined_at: DateTime<Utc>,
	pub member_id: Id<UserMarker>
}

#[derive(sqlx::FromRow)]
struct InvitedMemberRecord {
	code: String,
	guild_id: i64,
	inviter_id: Option<i64>,
	joined_at: DateTime<Utc>,
	member_id: i64
}

impl From<InvitedMemberRecord> for InvitedMemberModel {
	fn from(record: InvitedMemberRecord) -> Self {
		Self {
			code: record.code,
			guild_id: Id::new(record.guild_id as u64),
			inviter_id: record.inviter_id.map(|x| Id::new(x as u64)),
			joined_at: record.joined_at,
			member_id: Id::new(record.member_id as u64)
		}
	}
}

impl InvitedMemberModel {
	pub async fn get(pool: &PgPool, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Result<Option<Self>> {
		Ok(sqlx::query_as::<_, InvitedMemberRecord>(
			"
			SELECT code, guild_id, inviter_id, joined_at, member_id
			FROM invited_members
			WHERE guild_id = $1 AND member_id = $2
			"
		)
			.bind(guild_id.get() as i64)
			.bind(member_id.get() as i64)
			.fetch_optional(pool)
			.await?
			.map(Into::into)
		)
	}

	pub async fn invited_by(pool: &PgPool, guild_id: Id<GuildMarker>, inviter_id: Id<UserMarker>) -> Result<Vec<Self>> {
		Ok(sqlx::query_as::<_, InvitedMemberRecord>(
			"
			SELECT code, guild_id, inviter_id, joined_at, member_id
			FROM invited_members
			WHERE guild_id = $1 AND inviter_id = $2
			ORDER BY joined_at
			"
		)
			.bind(guild_id.get() as i64)
			.bind(inviter_id.get() as i64)
			.fetch(pool)
			.try_fold(Vec::<Self>::new(), |mut acc, record| {
				acc.push(record.into());
				async move { Ok(acc) }
			})
			.await?
		)
	}

	/// Stores this join, handing back the record a leave we never saw left behind.
	pub async fn save(&self, pool: &PgPool) -> Result<Option<Self>> {
		let mut transaction = pool.begin().await?;
		let previous = sqlx::query_as::<_, InvitedMemberRecord>(
			"
			DELETE FROM invited_members
			WHERE guild_id = $1 AND member_id = $2
			RETURNING code, guild_id, inviter_id, joined_at, member_id
			"
		)
			.bind(self.guild_id.get() as i64)
			.bind(self.member_id.get() as i64)
			.fetch_optional(&mut *transaction)
			.await?
			.map(Into::into);

		sqlx::query(
			"
			INSERT INTO invited_members (guild_id, member_id, code, inviter_id, joined_at)
			VALUES ($1, $2, $3, $4, $5)
			"
		)
			.bind(self.guild_id.get() as i64)
			.bind(self.member_id.get() as i64)
			.bind(&self.code)
			.bind(self.inviter_id.map(|x| x.get() as i64))
			.bind(self.joined_at)
			.execute(&mut *transaction)
			.await?;

		transaction.commit().await?;
		Ok(previous)
	}

	pub async fn delete(pool: &PgPool, guild_id: Id<GuildMarker>, member_id: Id<UserMarker>) -> Result<Option<Self>> {
		Ok(sqlx::query_as::<_, InvitedMemberRecord>(
			"
			DELETE FROM invited_members
			WHERE guild_id = $1 AND member_id = $2
			RETURNING code, guild_id, inviter_id, joined_at, member_id
			"
		)
			.bind(guild_id.get() as i64)
			.bind(member_id.get() as i64)
			.fetch_optional(pool)
			.await?
			.map(Into::into)
		)
	}
}
