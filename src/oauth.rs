//! Client-credentials exchange built on the `oauth2` crate, plus error classification.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenRecord, TokenSecret},
	error::{AuthError, ConfigError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;

const TOKEN_ENDPOINT: &str = "the token endpoint";
const BODY_PREVIEW_LIMIT: usize = 256;

/// How the client authenticates itself at the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Maps HTTP transport failures into client [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a client error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(TOKEN_ENDPOINT, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => AuthError::TokenEndpoint {
				message: format!("HTTP client error occurred: {message}"),
				status: meta_status(meta),
				retry_after: meta_retry_after(meta),
			}
			.into(),
			_ => AuthError::TokenEndpoint {
				message: "HTTP client error occurred".into(),
				status: meta_status(meta),
				retry_after: meta_retry_after(meta),
			}
			.into(),
		}
	}
}

/// Classifies a reqwest failure against a logical endpoint label.
pub(crate) fn map_reqwest_error(endpoint: &'static str, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { endpoint }.into();
	}

	TransportError::network(endpoint, err).into()
}

/// Token-endpoint facade configured once per session.
pub(crate) struct ClientCredentialsFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
	fallback_ttl: Duration,
}
impl<C, M> ClientCredentialsFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		token_url: &Url,
		client_id: &str,
		client_secret: &TokenSecret,
		auth_method: ClientAuthMethod,
		fallback_ttl: Duration,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self> {
		let token_url = TokenUrl::new(token_url.to_string())
			.map_err(|source| ConfigError::invalid_endpoint(token_url.as_str(), source))?;
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_token_uri(token_url);

		if matches!(auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, http_client, error_mapper, fallback_ttl })
	}

	/// Performs one `client_credentials` grant and converts the response into a record.
	pub(crate) async fn exchange(&self, scope: &ScopeSet) -> Result<TokenRecord> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let mut request = self.oauth_client.exchange_client_credentials();

		for value in scope.iter() {
			request = request.add_scope(Scope::new(value.to_owned()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper.as_ref()))?;

		map_token_response(scope, response, self.fallback_ttl)
	}
}

fn map_token_response(
	scope: &ScopeSet,
	response: FacadeTokenResponse,
	fallback_ttl: Duration,
) -> Result<TokenRecord> {
	let expires_in = match response.expires_in() {
		Some(value) => Duration::seconds(
			i64::try_from(value.as_secs()).map_err(|_| AuthError::ExpiresInOutOfRange)?,
		),
		None => fallback_ttl,
	};

	if !expires_in.is_positive() {
		return Err(AuthError::NonPositiveExpiresIn.into());
	}

	TokenRecord::builder(scope.clone())
		.access_token(response.access_token().secret().to_owned())
		.issued_at(OffsetDateTime::now_utc())
		.expires_in(expires_in)
		.build()
		.map_err(|err| ConfigError::from(err).into())
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, meta_ref),
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		// Error pages that are not OAuth JSON still carry a meaningful status.
		RequestTokenError::Parse(error, body) => match meta_status(meta_ref) {
			Some(status) if status >= 400 => classify_status(status, &body),
			status => AuthError::TokenResponseParse { source: error, status }.into(),
		},
		// Non-JSON content types are reported as `Other` before any parsing happens.
		RequestTokenError::Other(message) => match meta_status(meta_ref) {
			Some(401) => classify_status(401, message.as_bytes()),
			status => AuthError::TokenEndpoint {
				message,
				status,
				retry_after: meta_retry_after(meta_ref),
			}
			.into(),
		},
	}
}

fn map_server_response_error(response: BasicErrorResponse, meta: Option<&ResponseMetadata>) -> Error {
	let code = response.error().as_ref().to_owned();
	let reason = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code.clone(),
	};

	match code.to_ascii_lowercase().as_str() {
		"invalid_client" | "unauthorized_client" => AuthError::InvalidClient { reason }.into(),
		"invalid_scope" => AuthError::InvalidScope { reason }.into(),
		"temporarily_unavailable" | "server_error" => AuthError::TokenEndpoint {
			message: reason,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
		_ => AuthError::Rejected { reason }.into(),
	}
}

fn classify_status(status: u16, body: &[u8]) -> Error {
	let preview = body_preview(body);

	match status {
		401 => AuthError::InvalidClient { reason: format!("HTTP 401 {preview}") }.into(),
		_ => AuthError::TokenEndpoint { message: preview, status: Some(status), retry_after: None }
			.into(),
	}
}

/// Lossy UTF-8 preview of a response body, truncated for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	if trimmed.chars().count() <= BODY_PREVIEW_LIMIT {
		return trimmed.to_owned();
	}

	let mut buf = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
