use dashmap::DashMap;
use std::{
	future::Future,
	pin::Pin,
	sync::Arc
};
use tokio::sync::mpsc;
use twilight_gateway::Event;
use twilight_model::id::{
	marker::GuildMarker,
	Id
};

use crate::{
	source::InviteSource,
	store::InviteStore,
	Result, Tracker
};

pub mod guild;
pub mod invite;
pub mod member;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type GuildQueue = mpsc::UnboundedSender<BoxFuture<'static, Result<()>>>;

/// Runs event handlers one guild at a time, in the order the gateway delivered them.
///
/// Every guild gets a queue drained by its own task, so different guilds still
/// progress concurrently.
#[derive(Default)]
pub struct Dispatcher {
	queues: DashMap<Id<GuildMarker>, GuildQueue>
}

impl Dispatcher {
	pub fn dispatch<F: Future<Output = Result<()>> + Send + 'static>(&self, guild_id: Id<GuildMarker>, future: F) {
		let queue = self.queues
			.entry(guild_id)
			.or_insert_with(|| spawn_queue(guild_id))
			.clone();
		if queue.send(Box::pin(future)).is_err() {
			tracing::error!("event queue closed, dropping event (guild_id={guild_id})");
		}
	}
}

fn spawn_queue(guild_id: Id<GuildMarker>) -> GuildQueue {
	let (sender, mut receiver) = mpsc::unbounded_channel::<BoxFuture<'static, Result<()>>>();
	tokio::spawn(async move {
		while let Some(future) = receiver.recv().await {
			if let Err(error) = future.await {
				if error.is_host_failure() {
					tracing::warn!("dropped event after discord failure (guild_id={guild_id}): {error}");
				} else {
					tracing::error!("error occurred in async event handler! (guild_id={guild_id}) {error}\n{}", error.context);
				}
			}
		}
	});

	sender
}

pub fn handle_event<S: InviteSource, P: InviteStore>(dispatcher: &Dispatcher, tracker: &Arc<Tracker<S, P>>, event: Event) {
	let event_kind = event.kind();
	tracing::debug!("handle_event {event_kind:?}");

	match event {
		Event::GuildCreate(x) => if let Some(guild_id) = guild::available_guild_id(*x) {
			dispatcher.dispatch(guild_id, guild::guild_create(tracker.clone(), guild_id));
		},
		Event::GuildDelete(x) => dispatcher.dispatch(x.id, guild::guild_delete(tracker.clone(), x.id)),
		Event::InviteCreate(x) => dispatcher.dispatch(x.guild_id, invite::invite_create(tracker.clone(), *x)),
		Event::InviteDelete(x) => dispatcher.dispatch(x.guild_id, invite::invite_delete(tracker.clone(), x)),
		Event::MemberAdd(x) => dispatcher.dispatch(x.guild_id, member::member_add(tracker.clone(), x.guild_id, x.user.id)),
		Event::MemberRemove(x) => dispatcher.dispatch(x.guild_id, member::member_remove(tracker.clone(), x.guild_id, x.user.id)),
		Event::Ready(x) => tracing::info!("discord gateway ready (guilds={})", x.guilds.len()),
		_ => ()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use tokio::sync::{ Mutex, oneshot };

	#[tokio::test]
	async fn events_of_one_guild_run_in_delivery_order() {
		let dispatcher = Dispatcher::default();
		let order = Arc::new(Mutex::new(Vec::new()));
		let (done_sender, done) = oneshot::channel();

		let slow = order.clone();
		dispatcher.dispatch(Id::new(1), async move {
			tokio::time::sleep(Duration::from_millis(30)).await;
			slow.lock().await.push("guild_delete");
			Ok(())
		});
		let fast = order.clone();
		dispatcher.dispatch(Id::new(1), async move {
			fast.lock().await.push("guild_create");
			let _ = done_sender.send(());
			Ok(())
		});

		done.await.unwrap();
		assert_eq!(*order.lock().await, vec!["guild_delete", "guild_create"]);
	}

	#[tokio::test]
	async fn other_guilds_are_not_held_up() {
		let dispatcher = Dispatcher::default();
		let (release_sender, release) = oneshot::channel::<()>();
		let (done_sender, done) = oneshot::channel();

		dispatcher.dispatch(Id::new(1), async move {
			let _ = release.await;
			Ok(())
		});
		dispatcher.dispatch(Id::new(2), async move {
			let _ = done_sender.send(());
			Ok(())
		});

		tokio::time::timeout(Duration::from_secs(5), done).await.unwrap().unwrap();
		let _ = release_sender.send(());
	}
}
