//! Deployment environments and the host router that resolves API/identity endpoints.
//!
//! Host names are a pure function of `(service, environment)`: sandbox prefixes the service
//! with `sandbox-`, production uses the bare service name. Both environments are served over
//! HTTPS.

// self
use crate::{_prelude::*, error::ConfigError};

const BASE_DOMAIN: &str = "onsched.com";
const API_SERVICE: &str = "api";
const IDENTITY_SERVICE: &str = "identity";
const TOKEN_PATH: &str = "connect/token";

/// OnSched deployment targeted by a client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	#[default]
	/// Isolated sandbox deployment.
	Sandbox,
	/// Production deployment.
	Prod,
}
impl Environment {
	/// Returns the stable configuration label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Sandbox => "sandbox",
			Self::Prod => "prod",
		}
	}

	/// Resolves the absolute origin for a service in this environment.
	pub fn host(self, service: &str) -> String {
		match self {
			Self::Sandbox => format!("https://sandbox-{service}.{BASE_DOMAIN}"),
			Self::Prod => format!("https://{service}.{BASE_DOMAIN}"),
		}
	}

	/// Origin of the resource API.
	pub fn api_host(self) -> String {
		self.host(API_SERVICE)
	}

	/// Origin of the identity (token) service.
	pub fn identity_host(self) -> String {
		self.host(IDENTITY_SERVICE)
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Environment {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"sandbox" => Ok(Self::Sandbox),
			"prod" => Ok(Self::Prod),
			other => Err(ConfigError::InvalidEnvironment { value: other.to_owned() }),
		}
	}
}

/// Resolved API and identity base URLs, computed once per client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
	/// Base URL of the resource API.
	pub api: Url,
	/// Base URL of the identity service.
	pub identity: Url,
}
impl Endpoints {
	/// Builds the canonical endpoints for an environment.
	pub fn for_environment(env: Environment) -> Result<Self, ConfigError> {
		Self::custom(&env.api_host(), &env.identity_host())
	}

	/// Builds endpoints for a custom deployment (or a mock server).
	///
	/// Trailing slashes are normalized so path prefixes survive [`Url::join`].
	pub fn custom(api: &str, identity: &str) -> Result<Self, ConfigError> {
		Ok(Self { api: parse_base(api)?, identity: parse_base(identity)? })
	}

	/// Token endpoint on the identity host.
	pub fn token_url(&self) -> Result<Url, ConfigError> {
		join(&self.identity, TOKEN_PATH)
	}

	/// Absolute URL for a logical resource path such as `setup/v1/companies`.
	pub fn resource(&self, path: &str) -> Result<Url, ConfigError> {
		join(&self.api, path.trim_start_matches('/'))
	}
}

fn parse_base(raw: &str) -> Result<Url, ConfigError> {
	let normalized = if raw.ends_with('/') { raw.to_owned() } else { format!("{raw}/") };

	Url::parse(&normalized).map_err(|source| ConfigError::invalid_endpoint(raw, source))
}

fn join(base: &Url, path: &str) -> Result<Url, ConfigError> {
	base.join(path).map_err(|source| ConfigError::invalid_endpoint(path, source))
}
