//! Company record exposed by `setup/v1/companies`.
//!
//! The record mirrors the API's JSON representation field for field. The endpoint is a
//! full-replace resource, so keys this crate does not model are retained in
//! [`Company::extra`] and sent back untouched on update.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Logical path of the company resource.
pub const COMPANIES_PATH: &str = "setup/v1/companies";

/// Company configuration, including webhook targets.
///
/// String fields are optional because the API returns `null` for unset values; absent keys
/// decode to `None`/`false`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Company {
	/// Object type discriminator, `company`.
	pub object: Option<String>,
	/// Company identifier.
	pub id: Option<String>,
	/// Display name.
	pub name: Option<String>,
	/// Registration timestamp as returned by the API.
	pub registration_date: Option<String>,
	/// Email used at registration.
	pub registration_email: Option<String>,
	/// Soft-deletion flag.
	pub deleted_status: bool,
	/// Soft-deletion timestamp.
	pub deleted_time: Option<String>,
	/// First address line.
	pub address_line1: Option<String>,
	/// Second address line.
	pub address_line2: Option<String>,
	/// City.
	pub city: Option<String>,
	/// State or province.
	pub state: Option<String>,
	/// Postal code.
	pub postal_code: Option<String>,
	/// Country code.
	pub country: Option<String>,
	/// Phone number.
	pub phone: Option<String>,
	/// Fax number.
	pub fax: Option<String>,
	/// Contact email.
	pub email: Option<String>,
	/// Website URL.
	pub website: Option<String>,
	/// IANA-style timezone identifier.
	pub timezone_id: Option<String>,
	/// Human-readable timezone name.
	pub timezone_name: Option<String>,
	/// Sender address for notifications.
	pub notification_from_email_address: Option<String>,
	/// Sender name for notifications.
	pub notification_from_name: Option<String>,
	/// Webhook called on booking events.
	pub booking_webhook_url: Option<String>,
	/// Webhook called on customer events.
	pub customer_webhook_url: Option<String>,
	/// Webhook called on reminder events.
	pub reminder_webhook_url: Option<String>,
	/// Webhook called on resource events.
	pub resource_webhook_url: Option<String>,
	/// Hash used to sign webhook deliveries.
	pub webhook_signature_hash: Option<String>,
	/// Suppresses email and SMS notifications; webhooks still fire.
	pub disable_email_and_sms_notifications: bool,
	/// Server fields not modeled above.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::codec;

	const FIXTURE: &str = r#"{
		"object": "company",
		"id": "c1",
		"name": "Acme",
		"registrationDate": "2023-04-01T10:00:00",
		"registrationEmail": "owner@acme.test",
		"deletedStatus": false,
		"deletedTime": null,
		"addressLine1": "742 Evergreen Terrace",
		"addressLine2": null,
		"city": "Springfield",
		"state": "OR",
		"postalCode": "97403",
		"country": "US",
		"phone": "5555550100",
		"fax": null,
		"email": "hello@acme.test",
		"website": "https://acme.test",
		"timezoneId": "America/Los_Angeles",
		"timezoneName": "Pacific Standard Time",
		"notificationFromEmailAddress": "noreply@acme.test",
		"notificationFromName": "Acme Bookings",
		"bookingWebhookUrl": "https://hooks.acme.test/booking",
		"customerWebhookUrl": "https://hooks.acme.test/customer",
		"reminderWebhookUrl": "SOFT_DELETED",
		"resourceWebhookUrl": "https://hooks.acme.test/resource",
		"webhookSignatureHash": "c2lnbmF0dXJl",
		"disableEmailAndSmsNotifications": true
	}"#;

	#[test]
	fn decodes_every_field() {
		let company: Company = codec::decode(200, FIXTURE.as_bytes()).expect("Fixture decodes.");

		assert_eq!(company.object.as_deref(), Some("company"));
		assert_eq!(company.id.as_deref(), Some("c1"));
		assert_eq!(company.address_line1.as_deref(), Some("742 Evergreen Terrace"));
		assert_eq!(company.address_line2, None);
		assert_eq!(company.timezone_id.as_deref(), Some("America/Los_Angeles"));
		assert_eq!(company.notification_from_name.as_deref(), Some("Acme Bookings"));
		assert_eq!(company.reminder_webhook_url.as_deref(), Some("SOFT_DELETED"));
		assert_eq!(company.webhook_signature_hash.as_deref(), Some("c2lnbmF0dXJl"));
		assert!(company.disable_email_and_sms_notifications);
		assert!(!company.deleted_status);
		assert!(company.extra.is_empty());
	}

	#[test]
	fn encode_of_decode_is_structurally_identical() {
		let company: Company = codec::decode(200, FIXTURE.as_bytes()).expect("Fixture decodes.");
		let encoded = codec::encode(&company).expect("Company encodes.");
		let original: Value = serde_json::from_str(FIXTURE).expect("Fixture is valid JSON.");
		let round_tripped: Value = serde_json::from_slice(&encoded).expect("Output is valid JSON.");

		assert_eq!(original, round_tripped);
	}

	#[test]
	fn unknown_fields_survive_full_replace() {
		let company: Company =
			codec::decode(200, br#"{"id":"c1","planTier":"gold","limits":{"seats":5}}"#)
				.expect("Partial document decodes.");

		assert_eq!(company.extra.get("planTier"), Some(&Value::from("gold")));

		let encoded: Value =
			serde_json::from_slice(&codec::encode(&company).expect("Company encodes."))
				.expect("Output is valid JSON.");

		assert_eq!(encoded["planTier"], "gold");
		assert_eq!(encoded["limits"]["seats"], 5);
		assert_eq!(encoded["city"], Value::Null);
	}

	#[test]
	fn wrong_field_types_fail_instead_of_zeroing() {
		let err = codec::decode::<Company>(200, br#"{"id":"c1","deletedStatus":"nope"}"#)
			.expect_err("Mistyped fields must not decode.");

		assert_eq!(err.kind(), crate::error::ErrorKind::Decode);
	}
}
