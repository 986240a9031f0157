use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use twilight_gateway::{ ConfigBuilder, EventTypeFlags, Intents, Shard, ShardId, StreamExt };

use crate::{
	source::InviteSource,
	store::InviteStore,
	Tracker
};

pub mod event;
use event::Dispatcher;

/// Feeds gateway events into the tracker until `stop_signal` fires or the shard closes.
pub async fn initialise<S: InviteSource, P: InviteStore>(tracker: Arc<Tracker<S, P>>, token: String, stop_signal: CancellationToken) {
	tracing::info!("initialising discord gateway");

	let config = ConfigBuilder::new(
		token,
		Intents::GUILDS | Intents::GUILD_MEMBERS | Intents::GUILD_INVITES
	)
		.build();
	let mut shard = Shard::with_config(ShardId::ONE, config);
	let dispatcher = Dispatcher::default();

	loop {
		let item = tokio::select! {
			item = shard.next_event(EventTypeFlags::all()) => item,
			_ = stop_signal.cancelled() => {
				tracing::info!("gracefully shutting down discord gateway");
				break;
			}
		};
		let Some(item) = item else {
			tracing::warn!("discord gateway closed");
			break;
		};
		let event = match item {
			Ok(event) => event,
			Err(source) => {
				tracing::warn!(?source, "error receiving event");
				continue;
			}
		};

		event::handle_event(&dispatcher, &tracker, event);
	}
}
