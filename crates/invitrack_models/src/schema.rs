use sqlx::PgPool;

use crate::Result;

const TABLES: [&str; 3] = [
	"
	CREATE TABLE IF NOT EXISTS guild_invites (
		guild_id BIGINT NOT NULL,
		code TEXT NOT NULL,
		uses BIGINT NOT NULL DEFAULT 0,
		inviter_id BIGINT,
		PRIMARY KEY (guild_id, code)
	)
	",
	"
	CREATE TABLE IF NOT EXISTS invited_members (
		guild_id BIGINT NOT NULL,
		member_id BIGINT NOT NULL,
		code TEXT NOT NULL,
		inviter_id BIGINT,
		joined_at TIMESTAMPTZ NOT NULL,
		PRIMARY KEY (guild_id, member_id)
	)
	",
	"
	CREATE INDEX IF NOT EXISTS invited_members_inviter
	ON invited_members (guild_id, inviter_id)
	"
];

/// Creates the tables invitrack writes to, if they don't exist yet.
pub async fn initialise(pool: &PgPool) -> Result<()> {
	for statement in TABLES {
		sqlx::query(statement)
			.execute(pool)
			.await?;
	}

	Ok(())
}
