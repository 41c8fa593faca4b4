//! Webhook settings carried on the company record.
//!
//! OnSched has no dedicated webhook resource: the four delivery URLs, the signature hash and
//! the notification flag are plain fields of [`Company`]. "Removing" a webhook means writing
//! the [`SOFT_DELETED`] sentinel back into its URL.

// self
use crate::{_prelude::*, client::Client, company::Company};

/// Sentinel URL value the API treats as "no webhook configured".
pub const SOFT_DELETED: &str = "SOFT_DELETED";

/// Projection of the webhook-related company fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookSettings {
	/// Booking event target.
	pub booking_webhook_url: String,
	/// Customer event target.
	pub customer_webhook_url: String,
	/// Reminder event target.
	pub reminder_webhook_url: String,
	/// Resource event target.
	pub resource_webhook_url: String,
	/// Hash used to sign deliveries.
	pub webhook_signature_hash: String,
	/// Suppresses email and SMS notifications.
	pub disable_email_and_sms_notifications: bool,
}
impl WebhookSettings {
	/// Settings with every URL soft-deleted, an empty hash, and notifications enabled.
	pub fn soft_deleted() -> Self {
		Self {
			booking_webhook_url: SOFT_DELETED.into(),
			customer_webhook_url: SOFT_DELETED.into(),
			reminder_webhook_url: SOFT_DELETED.into(),
			resource_webhook_url: SOFT_DELETED.into(),
			webhook_signature_hash: String::new(),
			disable_email_and_sms_notifications: false,
		}
	}

	/// Projects the webhook fields out of a company record; `null` values read as empty.
	pub fn from_company(company: &Company) -> Self {
		let text = |value: &Option<String>| value.clone().unwrap_or_default();

		Self {
			booking_webhook_url: text(&company.booking_webhook_url),
			customer_webhook_url: text(&company.customer_webhook_url),
			reminder_webhook_url: text(&company.reminder_webhook_url),
			resource_webhook_url: text(&company.resource_webhook_url),
			webhook_signature_hash: text(&company.webhook_signature_hash),
			disable_email_and_sms_notifications: company.disable_email_and_sms_notifications,
		}
	}

	/// Overwrites the webhook fields of `company`, leaving every other field untouched.
	pub fn apply_to(&self, company: &mut Company) {
		company.booking_webhook_url = Some(self.booking_webhook_url.clone());
		company.customer_webhook_url = Some(self.customer_webhook_url.clone());
		company.reminder_webhook_url = Some(self.reminder_webhook_url.clone());
		company.resource_webhook_url = Some(self.resource_webhook_url.clone());
		company.webhook_signature_hash = Some(self.webhook_signature_hash.clone());
		company.disable_email_and_sms_notifications = self.disable_email_and_sms_notifications;
	}

	/// Returns `true` when every URL carries the [`SOFT_DELETED`] sentinel.
	pub fn is_soft_deleted(&self) -> bool {
		[
			&self.booking_webhook_url,
			&self.customer_webhook_url,
			&self.reminder_webhook_url,
			&self.resource_webhook_url,
		]
		.into_iter()
		.all(|url| url == SOFT_DELETED)
	}
}
impl Default for WebhookSettings {
	fn default() -> Self {
		Self::soft_deleted()
	}
}

impl Client {
	/// Fetches the company and projects its webhook settings.
	pub async fn read_webhooks(&self) -> Result<WebhookSettings> {
		Ok(WebhookSettings::from_company(&self.get_company().await?))
	}

	/// Writes `settings` onto the company record, then reads them back.
	///
	/// The follow-up `GET` reports what the server persisted rather than trusting the `PUT` echo.
	pub async fn apply_webhooks(&self, settings: &WebhookSettings) -> Result<WebhookSettings> {
		self.modify_company(|company| settings.apply_to(company)).await?;

		self.read_webhooks().await
	}

	/// Soft-deletes all four webhook URLs; the signature hash and notification flag are kept.
	pub async fn soft_delete_webhooks(&self) -> Result<WebhookSettings> {
		self.modify_company(|company| {
			for url in [
				&mut company.booking_webhook_url,
				&mut company.customer_webhook_url,
				&mut company.reminder_webhook_url,
				&mut company.resource_webhook_url,
			] {
				*url = Some(SOFT_DELETED.into());
			}
		})
		.await?;

		self.read_webhooks().await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn company() -> Company {
		Company {
			id: Some("c1".into()),
			city: Some("Springfield".into()),
			booking_webhook_url: Some("https://hooks.acme.test/booking".into()),
			customer_webhook_url: None,
			reminder_webhook_url: Some(SOFT_DELETED.into()),
			resource_webhook_url: Some("https://hooks.acme.test/resource".into()),
			webhook_signature_hash: Some("c2lnbmF0dXJl".into()),
			disable_email_and_sms_notifications: true,
			..Default::default()
		}
	}

	#[test]
	fn defaults_are_soft_deleted() {
		let settings = WebhookSettings::default();

		assert!(settings.is_soft_deleted());
		assert_eq!(settings.webhook_signature_hash, "");
		assert!(!settings.disable_email_and_sms_notifications);
	}

	#[test]
	fn projection_reads_null_urls_as_empty() {
		let settings = WebhookSettings::from_company(&company());

		assert_eq!(settings.booking_webhook_url, "https://hooks.acme.test/booking");
		assert_eq!(settings.customer_webhook_url, "");
		assert_eq!(settings.reminder_webhook_url, SOFT_DELETED);
		assert_eq!(settings.webhook_signature_hash, "c2lnbmF0dXJl");
		assert!(settings.disable_email_and_sms_notifications);
		assert!(!settings.is_soft_deleted());
	}

	#[test]
	fn apply_touches_only_webhook_fields() {
		let mut company = company();
		let settings = WebhookSettings {
			customer_webhook_url: "https://hooks.acme.test/customer".into(),
			..WebhookSettings::default()
		};

		settings.apply_to(&mut company);

		assert_eq!(company.id.as_deref(), Some("c1"));
		assert_eq!(company.city.as_deref(), Some("Springfield"));
		assert_eq!(company.booking_webhook_url.as_deref(), Some(SOFT_DELETED));
		assert_eq!(company.customer_webhook_url.as_deref(), Some("https://hooks.acme.test/customer"));
		assert_eq!(company.webhook_signature_hash.as_deref(), Some(""));
		assert!(!company.disable_email_and_sms_notifications);
		assert_eq!(WebhookSettings::from_company(&company), settings);
	}
}
