use std::sync::Arc;
use twilight_model::gateway::payload::incoming::{ InviteCreate, InviteDelete };

use crate::{
	source::InviteSource,
	store::InviteStore,
	Result, Tracker
};

pub async fn invite_create<S: InviteSource, P: InviteStore>(tracker: Arc<Tracker<S, P>>, invite_create: InviteCreate) -> Result<()> {
	tracker.on_invite_create(invite_create.guild_id, (&invite_create).into()).await
}

pub async fn invite_delete<S: InviteSource, P: InviteStore>(tracker: Arc<Tracker<S, P>>, invite_delete: InviteDelete) -> Result<()> {
	tracker.on_invite_delete(invite_delete.guild_id, &invite_delete.code).await
}
