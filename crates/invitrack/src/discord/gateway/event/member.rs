use std::sync::Arc;
use twilight_model::id::{
	marker::{ GuildMarker, UserMarker },
	Id
};

use crate::{
	source::InviteSource,
	store::InviteStore,
	JoinOutcome, Result, Tracker
};

pub async fn member_add<S: InviteSource, P: InviteStore>(tracker: Arc<Tracker<S, P>>, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> Result<()> {
	match tracker.on_member_join(guild_id, user_id).await? {
		JoinOutcome::Attributed(record) => match record.inviter_id {
			Some(inviter_id) => tracing::info!("{user_id} joined {guild_id} using {} from {inviter_id}", record.code),
			None => tracing::info!("{user_id} joined {guild_id} using {}", record.code)
		},
		JoinOutcome::Unattributed => tracing::info!("{user_id} joined {guild_id}, no inviter found")
	}

	Ok(())
}

pub async fn member_remove<S: InviteSource, P: InviteStore>(tracker: Arc<Tracker<S, P>>, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> Result<()> {
	tracker.on_member_leave(guild_id, user_id).await
}
