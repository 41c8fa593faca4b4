//! OnSched API client: company reads and full-replace updates over an authenticated transport.

// crates.io
use reqwest::{
	Method, StatusCode,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	codec,
	company::{COMPANIES_PATH, Company},
	config::ClientConfig,
	env::{Endpoints, Environment},
	http::ReqwestHttpClient,
	oauth::{self, ReqwestTransportErrorMapper},
	obs::{self, OpKind},
	session::ReqwestTokenSession,
};

const API_ENDPOINT: &str = "the API endpoint";
const JSON: &str = "application/json";

/// Authenticated OnSched client.
///
/// Construction never contacts the network: the first request exchanges the client
/// credentials, and every later request reuses the cached bearer token until it nears
/// expiry. Clones share the transport and the token cache.
#[derive(Clone)]
pub struct Client {
	http: ReqwestHttpClient,
	session: Arc<ReqwestTokenSession>,
	environment: Environment,
	endpoints: Endpoints,
}
impl Client {
	/// Creates a client for `environment` with default timeouts and the `OnSchedApi` scope.
	pub fn new(
		environment: Environment,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self> {
		Self::with_config(ClientConfig::new(environment, client_id, client_secret))
	}

	/// Creates a client from credentials found in the process environment.
	pub fn from_env() -> Result<Self> {
		Self::with_config(ClientConfig::from_env()?)
	}

	/// Creates a client from a full configuration.
	pub fn with_config(config: ClientConfig) -> Result<Self> {
		let http = ReqwestHttpClient::from_options(&config.transport)?;

		Self::with_http_client(config, http)
	}

	/// Creates a client that reuses a caller-provided reqwest transport.
	pub fn with_http_client(config: ClientConfig, http: ReqwestHttpClient) -> Result<Self> {
		let endpoints = config.resolve_endpoints()?;
		let session = ReqwestTokenSession::new(
			&endpoints.token_url()?,
			&config.client_id,
			&config.client_secret,
			config.client_auth_method,
			config.scope.clone(),
			config.refresh_policy(),
			config.fallback_token_ttl,
			http.clone(),
			ReqwestTransportErrorMapper,
		)?;

		Ok(Self { http, session: Arc::new(session), environment: config.environment, endpoints })
	}

	/// Deployment this client targets.
	pub fn environment(&self) -> Environment {
		self.environment
	}

	/// Resolved API and identity endpoints.
	pub fn endpoints(&self) -> &Endpoints {
		&self.endpoints
	}

	/// Token cache shared by every clone of this client.
	pub fn session(&self) -> &ReqwestTokenSession {
		&self.session
	}

	/// Fetches the company record.
	pub async fn get_company(&self) -> Result<Company> {
		obs::observe(OpKind::GetCompany, "get_company", self.get(COMPANIES_PATH)).await
	}

	/// Replaces the company record and returns the server's echo.
	///
	/// The endpoint is full-replace: send a record obtained from [`get_company`](Self::get_company)
	/// (or use [`modify_company`](Self::modify_company)) so unchanged fields are preserved.
	pub async fn update_company(&self, company: &Company) -> Result<Company> {
		obs::observe(OpKind::UpdateCompany, "update_company", self.put(COMPANIES_PATH, company))
			.await
	}

	/// Read-modify-write helper: fetches the record, applies `mutate`, and sends it back.
	///
	/// There is no concurrency token, so concurrent writers can overwrite each other.
	pub async fn modify_company<F>(&self, mutate: F) -> Result<Company>
	where
		F: FnOnce(&mut Company),
	{
		let mut company = self.get_company().await?;

		mutate(&mut company);

		self.update_company(&company).await
	}

	/// Issues an authenticated `GET` and decodes the response.
	pub async fn get<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let (status, body) = self.execute(Method::GET, path, None).await?;

		codec::decode(status, &body)
	}

	/// Issues an authenticated `PUT` with a JSON body and decodes the response.
	pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let payload = codec::encode(body)?;
		let (status, body) = self.execute(Method::PUT, path, Some(payload)).await?;

		codec::decode(status, &body)
	}

	async fn execute(
		&self,
		method: Method,
		path: &str,
		body: Option<Vec<u8>>,
	) -> Result<(u16, Vec<u8>)> {
		let url = self.endpoints.resource(path)?;
		let token = self.session.access_token().await?;
		let mut request =
			self.http.request(method, url).header(AUTHORIZATION, token.bearer()).header(ACCEPT, JSON);

		if let Some(payload) = body {
			request = request.header(CONTENT_TYPE, JSON).body(payload);
		}

		let response =
			request.send().await.map_err(|e| oauth::map_reqwest_error(API_ENDPOINT, e))?;
		let status = response.status();
		let bytes =
			response.bytes().await.map_err(|e| oauth::map_reqwest_error(API_ENDPOINT, e))?;

		if status == StatusCode::UNAUTHORIZED {
			self.session.invalidate_if_current(&token);
		}
		if !status.is_success() {
			return Err(Error::Server { status: status.as_u16(), body: oauth::body_preview(&bytes) });
		}

		Ok((status.as_u16(), bytes.to_vec()))
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("environment", &self.environment)
			.field("endpoints", &self.endpoints)
			.field("session", &self.session)
			.finish()
	}
}
