//! Configures and then soft-deletes the company's webhook targets against a local mock.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use onsched_client::{Client, ClientConfig, Endpoints, Environment, WebhookSettings};

const COMPANY: &str = r#"{
	"object": "company",
	"id": "c1",
	"bookingWebhookUrl": "https://hooks.acme.test/booking",
	"customerWebhookUrl": "SOFT_DELETED",
	"reminderWebhookUrl": "SOFT_DELETED",
	"resourceWebhookUrl": "SOFT_DELETED",
	"webhookSignatureHash": "c2lnbmF0dXJl",
	"disableEmailAndSmsNotifications": false
}"#;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/connect/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let _get_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/setup/v1/companies");
			then.status(200).header("content-type", "application/json").body(COMPANY);
		})
		.await;
	let put_mock = server
		.mock_async(|when, then| {
			when.method(PUT).path("/setup/v1/companies");
			then.status(200).header("content-type", "application/json").body(COMPANY);
		})
		.await;
	let base = format!("http://{}", server.address());
	let config = ClientConfig::new(Environment::Sandbox, "demo-client", "super-secret")
		.with_endpoints(Endpoints::custom(&base, &base)?);
	let client = Client::with_config(config)?;
	let settings = WebhookSettings {
		booking_webhook_url: "https://hooks.acme.test/booking/v2".into(),
		disable_email_and_sms_notifications: true,
		..WebhookSettings::default()
	};
	let applied = client.apply_webhooks(&settings).await?;

	println!("Server reports booking webhook {}.", applied.booking_webhook_url);

	let cleared = client.soft_delete_webhooks().await?;

	println!("Soft-deleted: {}.", cleared.is_soft_deleted());

	put_mock.assert_calls_async(2).await;

	Ok(())
}
