use invitrack::{
	discord::gateway,
	DiscordSource, InviteStore, MemoryStore, PgInviteStore, Result, Tracker, TrackerOptions
};
use invitrack_cache::InviteUsageCache;
use invitrack_models::schema;
use invitrack_util::{ connect_pg_pool, discord_client, Config };
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{ layer::SubscriberExt, FmtSubscriber };

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
	let config = Config::from_env()?;

	let subscriber = FmtSubscriber::builder()
		.with_max_level(config.log_level)
		.finish()
		.with(ErrorLayer::default());
	tracing::subscriber::set_global_default(subscriber)?;

	LogTracer::init()?;

	info!("starting invitrack v{}", env!("CARGO_PKG_VERSION"));

	let source = DiscordSource::new(Arc::new(discord_client(&config)));
	let cache = Arc::new(InviteUsageCache::default());
	let options = TrackerOptions::from(&config);

	let stop_signal = CancellationToken::new();
	tokio::spawn(wait_for_shutdown(stop_signal.clone()));

	match connect_pg_pool(&config).await? {
		Some(pool) => {
			schema::initialise(&pool).await?;

			let tracker = Tracker::new(source, PgInviteStore::new(pool.clone()), cache, options);
			run(tracker, &config, stop_signal).await;
			pool.close().await;
		},
		None => {
			tracing::warn!("DATABASE_URL is not set, invite records will only live as long as this process");

			let tracker = Tracker::new(source, MemoryStore::default(), cache, options);
			run(tracker, &config, stop_signal).await;
		}
	}

	info!("shutting down invitrack...goodbye!");
	Ok(())
}

async fn run<P: InviteStore>(tracker: Tracker<DiscordSource, P>, config: &Config, stop_signal: CancellationToken) {
	gateway::initialise(Arc::new(tracker), config.discord_bot_token.clone(), stop_signal).await;
}

async fn wait_for_shutdown(stop_signal: CancellationToken) {
	match tokio::signal::ctrl_c().await {
		Ok(()) => info!("received ctrl-c"),
		Err(error) => tracing::error!("unable to listen for shutdown signal: {error}")
	}

	stop_signal.cancel();
}
