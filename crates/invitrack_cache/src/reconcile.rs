use invitrack_models::InviteSnapshot;
use std::sync::Arc;
use twilight_model::id::{
	marker::GuildMarker,
	Id
};

use crate::InviteUsageCache;

/// Works out which invite a joining member used by diffing live counts against the cache.
///
/// Attribution is first-match: live invites are scanned in the order discord
/// returned them and the first one whose count went up is taken, even when
/// several went up since the last look. Two members joining through different
/// invites between two polls can therefore both land on the first of them.
pub struct Reconciler {
	cache: Arc<InviteUsageCache>
}

impl Reconciler {
	pub fn new(cache: Arc<InviteUsageCache>) -> Self {
		Self { cache }
	}

	pub fn cache(&self) -> &InviteUsageCache {
		&self.cache
	}

	/// Returns the consumed invite and records its new count, or `None` if no cached invite moved.
	///
	/// Invites missing from the cache are skipped, they are seeded by invite creation.
	/// A guild that hasn't been loaded yet never matches.
	pub fn resolve_used_invite(&self, guild_id: Id<GuildMarker>, live_invites: &[InviteSnapshot]) -> Option<InviteSnapshot> {
		let Some(mut cached_invites) = self.cache.get_mut(guild_id) else {
			tracing::debug!("reconcile.guild_unloaded (guild_id={guild_id})");
			return None;
		};

		for live in live_invites {
			let Some(cached) = cached_invites.get_mut(&live.code) else {
				tracing::trace!("reconcile.untracked (guild_id={guild_id}) (code={})", live.code);
				continue;
			};
			if live.uses > cached.uses {
				tracing::debug!("reconcile.match (guild_id={guild_id}) (code={}) ({} -> {})", live.code, cached.uses, live.uses);
				*cached = InviteSnapshot {
					inviter_id: live.inviter_id.or(cached.inviter_id),
					..live.clone()
				};
				return Some(cached.clone());
			}
		}

		None
	}

	/// Trusts the live invite list wholesale; used when there is nothing to diff against.
	pub fn resync(&self, guild_id: Id<GuildMarker>, live_invites: impl IntoIterator<Item = InviteSnapshot>) {
		self.cache.put(guild_id, live_invites);
	}
}
