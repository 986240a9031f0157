use sqlx::PgPool;
use twilight_http::Client;
use twilight_model::{
	gateway::payload::incoming::InviteCreate,
	guild::invite::Invite,
	id::{
		marker::{ GuildMarker, UserMarker },
		Id
	}
};

use crate::Result;

/// One invite's use count as last observed.
///
/// Codes are only unique within a guild at a given moment, discord hands out
/// a deleted code again with its count starting from zero.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct InviteSnapshot {
	pub code: String,
	pub uses: u64,
	pub inviter_id: Option<Id<UserMarker>>
}

impl InviteSnapshot {
	pub fn new(code: impl Into<String>, uses: u64) -> Self {
		Self {
			code: code.into(),
			uses,
			inviter_id: None
		}
	}

	pub fn with_inviter(mut self, inviter_id: Id<UserMarker>) -> Self {
		self.inviter_id = Some(inviter_id);
		self
	}

	pub async fn list(client: &Client, guild_id: Id<GuildMarker>) -> Result<Vec<Self>> {
		Ok(client
			.guild_invites(guild_id)
			.await?
			.models()
			.await?
			.into_iter()
			.map(Into::into)
			.collect()
		)
	}

	pub async fn save(&self, pool: &PgPool, guild_id: Id<GuildMarker>) -> Result<()> {
		sqlx::query(
			"
			INSERT INTO guild_invites (guild_id, code, uses, inviter_id)
			VALUES ($1, $2, $3, $4)
			ON CONFLICT (guild_id, code)
			DO UPDATE SET uses = EXCLUDED.uses, inviter_id = COALESCE(EXCLUDED.inviter_id, guild_invites.inviter_id)
			"
		)
			.bind(guild_id.get() as i64)
			.bind(&self.code)
			.bind(self.uses as i64)
			.bind(self.inviter_id.map(|x| x.get() as i64))
			.execute(pool)
			.await?;

		Ok(())
	}

	/// Replaces every stored invite of a guild with `invites`.
	pub async fn replace_guild(pool: &PgPool, guild_id: Id<GuildMarker>, invites: &[Self]) -> Result<()> {
		let mut transaction = pool.begin().await?;
		sqlx::query(
			"
			DELETE FROM guild_invites
			WHERE guild_id = $1
			"
		)
			.bind(guild_id.get() as i64)
			.execute(&mut *transaction)
			.await?;

		for invite in invites {
			sqlx::query(
				"
				INSERT INTO guild_invites (guild_id, code, uses, inviter_id)
				VALUES ($1, $2, $3, $4)
				"
			)
				.bind(guild_id.get() as i64)
				.bind(&invite.code)
				.bind(invite.uses as i64)
				.bind(invite.inviter_id.map(|x| x.get() as i64))
				.execute(&mut *transaction)
				.await?;
		}

		transaction.commit().await?;
		Ok(())
	}

	pub async fn delete(pool: &PgPool, guild_id: Id<GuildMarker>, code: &str) -> Result<()> {
		sqlx::query(
			"
			DELETE FROM guild_invites
			WHERE guild_id = $1 AND code = $2
			"
		)
			.bind(guild_id.get() as i64)
			.bind(code)
			.execute(pool)
			.await?;

		Ok(())
	}

	pub async fn delete_guild(pool: &PgPool, guild_id: Id<GuildMarker>) -> Result<()> {
		sqlx::query(
			"
			DELETE FROM guild_invites
			WHERE guild_id = $1
			"
		)
			.bind(guild_id.get() as i64)
			.execute(pool)
			.await?;

		Ok(())
	}
}

impl From<Invite> for InviteSnapshot {
	fn from(value: Invite) -> Self {
		Self {
			code: value.code,
			uses: value.uses.unwrap_or_default(),
			inviter_id: value.inviter.map(|x| x.id)
		}
	}
}

impl From<&InviteCreate> for InviteSnapshot {
	fn from(value: &InviteCreate) -> Self {
		Self {
			code: value.code.clone(),
			uses: u64::from(value.uses),
			inviter_id: value.inviter.as_ref().map(|x| x.id)
		}
	}
}
