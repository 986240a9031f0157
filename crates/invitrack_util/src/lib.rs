use sqlx::{ postgres::PgPoolOptions, PgPool };
use twilight_http::Client;

pub mod config;
pub use config::{ Config, ConfigError };

pub fn discord_client(config: &Config) -> Client {
	Client::new(config.discord_bot_token.clone())
}

/// Connects to the configured database, `None` when the tracker should run without one.
pub async fn connect_pg_pool(config: &Config) -> Result<Option<PgPool>, sqlx::Error> {
	let Some(database_url) = config.database_url.as_deref() else {
		return Ok(None);
	};

	let pool = PgPoolOptions::new()
		.max_connections(config.database_connections)
		.connect(database_url)
		.await?;
	tracing::info!("connected to database (max_connections={})", config.database_connections);

	Ok(Some(pool))
}
