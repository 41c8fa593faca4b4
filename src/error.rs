//! Client-level error types shared across the transport, session, and codec layers.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Credential exchange with the identity host failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Request body could not be serialized.
	#[error(transparent)]
	Encode(#[from] EncodeError),
	/// Response body could not be decoded into the requested type.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// API host answered with a non-success status.
	#[error("API responded with HTTP {status}: {body}.")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Truncated response body preview.
		body: String,
	},
}
impl Error {
	/// Classifies the error without inspecting its message.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(_) => ErrorKind::Config,
			Self::Auth(_) => ErrorKind::Auth,
			Self::Transport(_) => ErrorKind::Network,
			Self::Encode(_) => ErrorKind::Encode,
			Self::Decode(_) => ErrorKind::Decode,
			Self::Server { status, .. } => ErrorKind::Server(*status),
		}
	}
}

/// Coarse error classification for callers that branch on failure modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Local configuration problem.
	Config,
	/// Credential or token exchange failure.
	Auth,
	/// Network or IO failure.
	Network,
	/// Request serialization failure.
	Encode,
	/// Response decoding failure.
	Decode,
	/// Non-success HTTP status from the API host.
	Server(u16),
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Config => f.write_str("config"),
			Self::Auth => f.write_str("auth"),
			Self::Network => f.write_str("network"),
			Self::Encode => f.write_str("encode"),
			Self::Decode => f.write_str("decode"),
			Self::Server(status) => write!(f, "server({status})"),
		}
	}
}

/// Configuration and validation failures raised before any request is sent.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Endpoint URL cannot be parsed or joined.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidEndpoint {
		/// Offending URL or path.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Required credential variable is unset or empty.
	#[error("Missing {var}; set the {var} environment variable.")]
	MissingCredential {
		/// Environment variable name.
		var: &'static str,
	},
	/// Environment name is neither `sandbox` nor `prod`.
	#[error("Unknown OnSched environment `{value}`; expected `sandbox` or `prod`.")]
	InvalidEnvironment {
		/// Rejected value.
		value: String,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Token record builder validation failed.
	#[error("Unable to build token record.")]
	TokenBuild(#[from] crate::auth::TokenRecordBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn invalid_endpoint(url: impl Into<String>, source: url::ParseError) -> Self {
		Self::InvalidEndpoint { url: url.into(), source }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Identity-host failures: rejected credentials or unusable token responses.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Requested scope is not granted to this client.
	#[error("Requested scope was rejected: {reason}.")]
	InvalidScope {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Any other OAuth error code returned by the identity host.
	#[error("Identity host rejected the grant: {reason}.")]
	Rejected {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Identity host returned an unexpected response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with a body that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {endpoint}.")]
	Network {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the configured timeout.
	#[error("Request to {endpoint} timed out.")]
	Timeout {
		/// Logical endpoint label.
		endpoint: &'static str,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

/// Request body serialization failure.
#[derive(Debug, ThisError)]
#[error("Failed to encode the {target} request body.")]
pub struct EncodeError {
	/// Type name of the body being encoded.
	pub target: &'static str,
	/// Serializer failure.
	#[source]
	pub source: serde_json::Error,
}

/// Response body decoding failure.
#[derive(Debug, ThisError)]
#[error("Failed to decode {target} from the HTTP {status} response at `{path}`.")]
pub struct DecodeError {
	/// Type name of the decode target.
	pub target: &'static str,
	/// HTTP status of the response that carried the body.
	pub status: u16,
	/// JSON path where decoding stopped.
	pub path: String,
	/// Deserializer failure.
	#[source]
	pub source: serde_json::Error,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn kinds_cover_every_variant() {
		let server = Error::Server { status: 503, body: "unavailable".into() };

		assert_eq!(server.kind(), ErrorKind::Server(503));
		assert_eq!(server.kind().to_string(), "server(503)");

		let auth = Error::from(AuthError::InvalidClient { reason: "bad secret".into() });

		assert_eq!(auth.kind(), ErrorKind::Auth);

		let timeout = Error::from(TransportError::Timeout { endpoint: "api" });

		assert_eq!(timeout.kind(), ErrorKind::Network);

		let missing = Error::from(ConfigError::MissingCredential { var: "ONSCHED_CLIENT_ID" });

		assert_eq!(missing.kind(), ErrorKind::Config);
		assert_eq!(
			missing.to_string(),
			"Missing ONSCHED_CLIENT_ID; set the ONSCHED_CLIENT_ID environment variable."
		);
	}
}
