use std::sync::Arc;
use twilight_model::{
	gateway::payload::incoming::GuildCreate,
	id::{ marker::GuildMarker, Id }
};

use crate::{
	source::InviteSource,
	store::InviteStore,
	Result, Tracker
};

pub fn available_guild_id(guild_create: GuildCreate) -> Option<Id<GuildMarker>> {
	match guild_create {
		GuildCreate::Available(guild) => Some(guild.id),
		GuildCreate::Unavailable(guild) => (!guild.unavailable).then_some(guild.id)
	}
}

pub async fn guild_create<S: InviteSource, P: InviteStore>(tracker: Arc<Tracker<S, P>>, guild_id: Id<GuildMarker>) -> Result<()> {
	tracker.on_guild_join(guild_id).await
}

pub async fn guild_delete<S: InviteSource, P: InviteStore>(tracker: Arc<Tracker<S, P>>, guild_id: Id<GuildMarker>) -> Result<()> {
	tracker.on_guild_remove(guild_id).await
}
