//! Changes the company's city with a read-modify-write against a local mock of the OnSched
//! identity and API hosts.
//!
//! Point [`ClientConfig::from_env`] at the real sandbox instead by exporting
//! `ONSCHED_CLIENT_ID` and `ONSCHED_CLIENT_SECRET`.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use onsched_client::{Client, ClientConfig, Endpoints, Environment};

const COMPANY: &str = r#"{"object":"company","id":"c1","name":"Acme","city":"Springfield"}"#;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/connect/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let _get_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/setup/v1/companies").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body(COMPANY);
		})
		.await;
	let put_mock = server
		.mock_async(|when, then| {
			when.method(PUT).path("/setup/v1/companies").body_includes("\"city\":\"Tagbilaran\"");
			then.status(200)
				.header("content-type", "application/json")
				.body(COMPANY.replace("Springfield", "Tagbilaran"));
		})
		.await;
	let base = format!("http://{}", server.address());
	let config = ClientConfig::new(Environment::Sandbox, "demo-client", "super-secret")
		.with_endpoints(Endpoints::custom(&base, &base)?);
	let client = Client::with_config(config)?;
	let before = client.get_company().await?;
	let after = client.modify_company(|company| company.city = Some("Tagbilaran".into())).await?;

	println!(
		"Company {} moved from {:?} to {:?}.",
		after.id.as_deref().unwrap_or("?"),
		before.city.as_deref().unwrap_or_default(),
		after.city.as_deref().unwrap_or_default(),
	);

	token_mock.assert_calls_async(1).await;
	put_mock.assert_async().await;

	Ok(())
}
