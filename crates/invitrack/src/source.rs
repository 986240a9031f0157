use invitrack_models::{ InviteSnapshot, MemberModel };
use std::{
	future::Future,
	sync::Arc
};
use twilight_http::Client;
use twilight_model::id::{
	marker::{ GuildMarker, UserMarker },
	Id
};

use crate::{
	error::ErrorKind,
	Result
};

/// The slice of the host platform the tracker reads from.
pub trait InviteSource: Send + Sync + 'static {
	/// Every live invite of a guild with its current use count.
	fn invites(&self, guild_id: Id<GuildMarker>) -> impl Future<Output = Result<Vec<InviteSnapshot>>> + Send;

	/// A guild member, `None` when they are not (or no longer) in the guild.
	fn member(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> impl Future<Output = Result<Option<MemberModel>>> + Send;
}

pub struct DiscordSource {
	client: Arc<Client>
}

impl DiscordSource {
	pub fn new(client: Arc<Client>) -> Self {
		Self { client }
	}
}

impl InviteSource for DiscordSource {
	async fn invites(&self, guild_id: Id<GuildMarker>) -> Result<Vec<InviteSnapshot>> {
		InviteSnapshot::list(&self.client, guild_id)
			.await
			.map_err(|error| invites_error(guild_id, error.status(), error.to_string()).into())
	}

	async fn member(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> Result<Option<MemberModel>> {
		match MemberModel::get(&self.client, guild_id, user_id).await {
			Ok(member) => Ok(Some(member)),
			Err(error) if is_missing_member(error.status()) => Ok(None),
			Err(error) => Err(ErrorKind::Transport(error.to_string()).into())
		}
	}
}

/// Maps a failed invite listing to the error kind the tracker acts on.
fn invites_error(guild_id: Id<GuildMarker>, status: Option<u16>, message: String) -> ErrorKind {
	match status {
		Some(403) => ErrorKind::PermissionDenied(guild_id),
		_ => ErrorKind::Transport(message)
	}
}

fn is_missing_member(status: Option<u16>) -> bool {
	status == Some(404)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn forbidden_invite_listing_is_permission_denied() {
		let kind = invites_error(Id::new(42), Some(403), "Missing Permissions".into());
		assert!(matches!(kind, ErrorKind::PermissionDenied(guild_id) if guild_id == Id::new(42)));
	}

	#[test]
	fn other_invite_listing_failures_are_transport() {
		assert!(matches!(invites_error(Id::new(42), Some(500), "server error".into()), ErrorKind::Transport(x) if x == "server error"));
		assert!(matches!(invites_error(Id::new(42), Some(404), "unknown guild".into()), ErrorKind::Transport(_)));
		assert!(matches!(invites_error(Id::new(42), None, "connection reset".into()), ErrorKind::Transport(_)));
	}

	#[test]
	fn only_not_found_means_missing_member() {
		assert!(is_missing_member(Some(404)));
		assert!(!is_missing_member(Some(403)));
		assert!(!is_missing_member(Some(500)));
		assert!(!is_missing_member(None));
	}
}
