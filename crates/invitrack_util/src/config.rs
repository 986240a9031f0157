use std::{
	str::FromStr,
	time::Duration
};
use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{0} is not set")]
	Missing(&'static str),

	#[error("{key} has an invalid value: {value:?}")]
	Invalid {
		key: &'static str,
		value: String
	}
}

#[derive(Clone, Debug)]
pub struct Config {
	pub discord_bot_token: String,
	pub database_url: Option<String>,
	pub database_connections: u32,
	pub fetch_timeout: Duration,
	pub lookup_capacity: u64,
	pub lookup_ttl: Duration,
	pub log_level: Level
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let discord_bot_token = lookup("DISCORD_BOT_TOKEN")
			.filter(|x| !x.is_empty())
			.ok_or(ConfigError::Missing("DISCORD_BOT_TOKEN"))?;
		Ok(Self {
			discord_bot_token,
			database_url: lookup("DATABASE_URL").filter(|x| !x.is_empty()),
			database_connections: parse(&lookup, "INVITRACK_DATABASE_CONNECTIONS", 5)?,
			fetch_timeout: Duration::from_secs(parse(&lookup, "INVITRACK_FETCH_TIMEOUT_SECS", 10)?),
			lookup_capacity: parse(&lookup, "INVITRACK_LOOKUP_CAPACITY", 1000)?,
			lookup_ttl: Duration::from_secs(parse(&lookup, "INVITRACK_LOOKUP_TTL_SECS", 300)?),
			log_level: parse(&lookup, "INVITRACK_LOG_LEVEL", Level::INFO)?
		})
	}
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
	match lookup(key) {
		Some(value) => value
			.trim()
			.parse()
			.map_err(|_| ConfigError::Invalid { key, value }),
		None => Ok(default)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
		let vars: HashMap<String, String> = vars
			.iter()
			.map(|(key, value)| (key.to_string(), value.to_string()))
			.collect();
		Config::from_lookup(|key| vars.get(key).cloned())
	}

	#[test]
	fn defaults_apply_when_only_the_token_is_set() {
		let config = config(&[("DISCORD_BOT_TOKEN", "token")]).unwrap();
		assert_eq!(config.discord_bot_token, "token");
		assert_eq!(config.database_url, None);
		assert_eq!(config.fetch_timeout, Duration::from_secs(10));
		assert_eq!(config.lookup_capacity, 1000);
		assert_eq!(config.log_level, Level::INFO);
	}

	#[test]
	fn token_is_required() {
		assert!(matches!(config(&[]), Err(ConfigError::Missing("DISCORD_BOT_TOKEN"))));
		assert!(matches!(config(&[("DISCORD_BOT_TOKEN", "")]), Err(ConfigError::Missing(_))));
	}

	#[test]
	fn overrides_are_parsed() {
		let config = config(&[
			("DISCORD_BOT_TOKEN", "token"),
			("DATABASE_URL", "postgres://localhost/invitrack"),
			("INVITRACK_FETCH_TIMEOUT_SECS", "3"),
			("INVITRACK_LOG_LEVEL", "debug")
		]).unwrap();
		assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/invitrack"));
		assert_eq!(config.fetch_timeout, Duration::from_secs(3));
		assert_eq!(config.log_level, Level::DEBUG);
	}

	#[test]
	fn garbage_values_are_rejected() {
		let error = config(&[("DISCORD_BOT_TOKEN", "token"), ("INVITRACK_LOOKUP_CAPACITY", "lots")]).unwrap_err();
		assert!(matches!(error, ConfigError::Invalid { key: "INVITRACK_LOOKUP_CAPACITY", .. }));
	}
}
