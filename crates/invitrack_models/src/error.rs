use twilight_http::error::ErrorType;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("SQLx: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Twilight HTTP: {0}")]
	TwilightHttp(#[from] twilight_http::Error),

	#[error("Twilight HTTP Deserialise Body: {0}")]
	TwilightHttpDeserialiseBody(#[from] twilight_http::response::DeserializeBodyError)
}

impl Error {
	/// The HTTP status discord answered with, if this error came from a response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::TwilightHttp(error) => match error.kind() {
				ErrorType::Response { status, .. } => Some(status.get()),
				_ => None
			},
			_ => None
		}
	}
}

pub type Result<T> = core::result::Result<T, Error>;
