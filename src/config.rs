//! Client configuration and environment-variable loading.

// std
use std::{env, time::Duration as StdDuration};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	env::{Endpoints, Environment},
	error::ConfigError,
	http::TransportOptions,
	oauth::ClientAuthMethod,
	session::RefreshPolicy,
};

/// Variable holding the OAuth client identifier.
pub const ENV_CLIENT_ID: &str = "ONSCHED_CLIENT_ID";
/// Variable holding the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "ONSCHED_CLIENT_SECRET";
/// Optional variable selecting `sandbox` or `prod`.
pub const ENV_ENVIRONMENT: &str = "ONSCHED_ENVIRONMENT";

/// Everything needed to construct a [`Client`](crate::client::Client).
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Deployment targeted by the client.
	pub environment: Environment,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Scope requested on every exchange.
	pub scope: ScopeSet,
	/// Token endpoint authentication style.
	pub client_auth_method: ClientAuthMethod,
	/// Timeouts and user agent for every request.
	pub transport: TransportOptions,
	/// Window before expiry in which a cached token is refreshed.
	pub preemptive_window: Duration,
	/// Token lifetime assumed when the identity host omits `expires_in`.
	pub fallback_token_ttl: Duration,
	/// Overrides the environment's canonical hosts.
	pub endpoints: Option<Endpoints>,
}
impl ClientConfig {
	const DEFAULT_FALLBACK_TOKEN_TTL: Duration = Duration::hours(1);

	/// Creates a configuration with defaults for everything but the credentials.
	pub fn new(
		environment: Environment,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			environment,
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			scope: ScopeSet::onsched_api(),
			client_auth_method: ClientAuthMethod::default(),
			transport: TransportOptions::default(),
			preemptive_window: RefreshPolicy::DEFAULT_PREEMPTIVE_WINDOW,
			fallback_token_ttl: Self::DEFAULT_FALLBACK_TOKEN_TTL,
			endpoints: None,
		}
	}

	/// Loads credentials and the environment from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Loads credentials and the environment through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |var: &'static str| {
			lookup(var)
				.filter(|value| !value.trim().is_empty())
				.ok_or(ConfigError::MissingCredential { var })
		};
		let client_id = required(ENV_CLIENT_ID)?;
		let client_secret = required(ENV_CLIENT_SECRET)?;
		let environment = match lookup(ENV_ENVIRONMENT) {
			Some(value) if !value.trim().is_empty() => value.parse()?,
			_ => Environment::default(),
		};

		Ok(Self::new(environment, client_id, client_secret))
	}

	/// Overrides the requested scope.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Overrides the token endpoint authentication style.
	pub fn with_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Overrides the total request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.transport.timeout = timeout;

		self
	}

	/// Overrides the connect timeout.
	pub fn with_connect_timeout(mut self, timeout: StdDuration) -> Self {
		self.transport.connect_timeout = timeout;

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.transport.user_agent = user_agent.into();

		self
	}

	/// Overrides the preemptive refresh window (negative values clamp to zero).
	pub fn with_preemptive_window(mut self, window: Duration) -> Self {
		self.preemptive_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Overrides the lifetime assumed for tokens without `expires_in`.
	pub fn with_fallback_token_ttl(mut self, ttl: Duration) -> Self {
		self.fallback_token_ttl = ttl;

		self
	}

	/// Points the client at custom hosts instead of the environment's canonical ones.
	pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
		self.endpoints = Some(endpoints);

		self
	}

	/// Resolves the effective endpoints.
	pub fn resolve_endpoints(&self) -> Result<Endpoints, ConfigError> {
		match &self.endpoints {
			Some(endpoints) => Ok(endpoints.clone()),
			None => Endpoints::for_environment(self.environment),
		}
	}

	pub(crate) fn refresh_policy(&self) -> RefreshPolicy {
		RefreshPolicy::new(self.preemptive_window, &self.client_id, &self.scope)
	}
}
