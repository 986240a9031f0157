use tracing_error::SpanTrace;
use twilight_model::id::{
	marker::GuildMarker,
	Id
};

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
	#[error("Missing Permissions: cannot list invites of guild {0}")]
	PermissionDenied(Id<GuildMarker>),

	#[error("Discord Error: {0}")]
	Transport(String),

	#[error("Discord request timed out")]
	TimedOut(#[from] tokio::time::error::Elapsed),

	#[error("Model Error: {0}")]
	Model(#[from] invitrack_models::Error),

	#[error("Config Error: {0}")]
	Config(#[from] invitrack_util::ConfigError),

	#[error("SQLx Error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("IO Error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Logger Error: {0}")]
	Logger(#[from] tracing_log::log::SetLoggerError),

	#[error("Subscriber Error: {0}")]
	Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError)
}

#[derive(Debug)]
pub struct Error {
	pub kind: ErrorKind,
	pub context: SpanTrace
}

impl Error {
	/// Whether discord couldn't be reached or refused us; these only cost the current guild event.
	pub fn is_host_failure(&self) -> bool {
		matches!(self.kind, ErrorKind::PermissionDenied(_) | ErrorKind::Transport(_) | ErrorKind::TimedOut(_))
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(fmt, "{}", self.kind)
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		std::error::Error::source(&self.kind)
	}
}

impl<E: Into<ErrorKind>> From<E> for Error {
	fn from(source: E) -> Self {
		Self {
			kind: Into::<ErrorKind>::into(source),
			context: SpanTrace::capture()
		}
	}
}

pub type Result<T> = core::result::Result<T, Error>;
