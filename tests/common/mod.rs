//! Shared fixtures for integration tests.

#![allow(dead_code)]

// crates.io
use httpmock::prelude::*;
// self
use onsched_client::{Client, ClientConfig, Endpoints, Environment};

pub const CLIENT_ID: &str = "client-onsched";
pub const CLIENT_SECRET: &str = "secret-onsched";
pub const TOKEN_PATH: &str = "/connect/token";
pub const COMPANY_PATH: &str = "/setup/v1/companies";
pub const TOKEN_BODY: &str =
	r#"{"access_token":"tok1","token_type":"bearer","expires_in":3600,"scope":"OnSchedApi"}"#;
pub const COMPANY_BODY: &str = r#"{
	"object": "company",
	"id": "c1",
	"name": "Acme",
	"city": "Springfield",
	"state": "OR",
	"country": "US",
	"timezoneId": "America/Los_Angeles",
	"bookingWebhookUrl": "https://hooks.acme.test/booking",
	"customerWebhookUrl": "SOFT_DELETED",
	"reminderWebhookUrl": "SOFT_DELETED",
	"resourceWebhookUrl": "SOFT_DELETED",
	"webhookSignatureHash": "c2lnbmF0dXJl",
	"disableEmailAndSmsNotifications": false,
	"planTier": "gold"
}"#;

/// Plain-HTTP origin of `server`; the `https` listener uses a self-signed certificate.
pub fn http_base(server: &MockServer) -> String {
	format!("http://{}", server.address())
}

/// Builds a client whose identity and API hosts both point at `server`.
pub fn build_client(server: &MockServer) -> Client {
	build_client_with(server, |config| config)
}

/// Like [`build_client`], with a hook to adjust the configuration first.
pub fn build_client_with<F>(server: &MockServer, configure: F) -> Client
where
	F: FnOnce(ClientConfig) -> ClientConfig,
{
	let base = http_base(server);
	let endpoints =
		Endpoints::custom(&base, &base).expect("Mock server endpoints should parse successfully.");
	let config = ClientConfig::new(Environment::Sandbox, CLIENT_ID, CLIENT_SECRET)
		.with_endpoints(endpoints);

	Client::with_config(configure(config)).expect("Client should build against the mock server.")
}

/// Registers a token endpoint that answers with `body`.
pub async fn mock_token<'a>(server: &'a MockServer, body: &str) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH).body_includes("grant_type=client_credentials");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

/// Registers a company `GET` that requires the `tok1` bearer token.
pub async fn mock_get_company<'a>(
	server: &'a MockServer,
	status: u16,
	body: &str,
) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(GET).path(COMPANY_PATH).header("authorization", "Bearer tok1");
			then.status(status).header("content-type", "application/json").body(body);
		})
		.await
}
