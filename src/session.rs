//! Access token cache with single-flight refresh.
//!
//! [`TokenSession::access_token`] serves the cached record until it enters a jittered
//! preemptive window before expiry. Refreshes are serialized behind an async mutex and the
//! cache is re-checked once the guard is held, so concurrent callers that observed the same
//! stale token piggy-back on a single exchange instead of stampeding the identity host.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenRecord, TokenSecret},
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{
		ClientAuthMethod, ClientCredentialsFacade, ReqwestTransportErrorMapper,
		TransportErrorMapper,
	},
	obs::{self, OpKind},
};

/// Session specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenSession = TokenSession<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Refresh timing shared by every token the session mints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshPolicy {
	/// Window before expiry in which a cached token is treated as stale.
	pub preemptive_window: Duration,
	/// Seed for the deterministic jitter subtracted from the window.
	pub jitter_seed: u64,
}
impl RefreshPolicy {
	/// Default preemptive window.
	pub const DEFAULT_PREEMPTIVE_WINDOW: Duration = Duration::seconds(60);

	/// Builds a policy whose jitter is derived from the client identity.
	pub fn new(preemptive_window: Duration, client_id: &str, scope: &ScopeSet) -> Self {
		let mut hasher = DefaultHasher::new();

		client_id.hash(&mut hasher);
		scope.hash(&mut hasher);

		Self {
			preemptive_window: if preemptive_window.is_negative() {
				Duration::ZERO
			} else {
				preemptive_window
			},
			jitter_seed: hasher.finish(),
		}
	}

	/// Determines whether the cached record should be refreshed.
	///
	/// The window never exceeds half of the record's own lifetime, so a freshly minted
	/// short-lived token is served before it is replaced.
	pub fn should_refresh(&self, record: &TokenRecord, now: OffsetDateTime) -> bool {
		if record.is_expired_at(now) {
			return true;
		}

		let effective_window = self.effective_preemptive_window().min(record.lifetime() / 2);

		if !effective_window.is_positive() {
			return false;
		}

		record.expires_at - now <= effective_window
	}

	fn effective_preemptive_window(&self) -> Duration {
		self.preemptive_window.checked_sub(self.preemptive_jitter()).unwrap_or(Duration::ZERO)
	}

	fn preemptive_jitter(&self) -> Duration {
		let window_secs = self.preemptive_window.whole_seconds();

		if window_secs <= 1 {
			return Duration::ZERO;
		}

		let modulus = u64::try_from(window_secs).unwrap_or(u64::MAX);
		// Keep at least half of the window so short-lived tokens still refresh early.
		let jitter_secs = self.jitter_seed % modulus.div_ceil(2);

		Duration::seconds(i64::try_from(jitter_secs).unwrap_or(i64::MAX))
	}
}

/// Lazily authenticated token cache for one client identity.
pub struct TokenSession<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	facade: ClientCredentialsFacade<C, M>,
	scope: ScopeSet,
	policy: RefreshPolicy,
	cached: RwLock<Option<TokenRecord>>,
	refresh_guard: AsyncMutex<()>,
}
impl<C, M> TokenSession<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a session; no request is sent until the first [`access_token`](Self::access_token).
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		token_url: &Url,
		client_id: &str,
		client_secret: &TokenSecret,
		auth_method: ClientAuthMethod,
		scope: ScopeSet,
		policy: RefreshPolicy,
		fallback_ttl: Duration,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let facade = ClientCredentialsFacade::new(
			token_url,
			client_id,
			client_secret,
			auth_method,
			fallback_ttl,
			http_client.into(),
			mapper.into(),
		)?;

		Ok(Self {
			facade,
			scope,
			policy,
			cached: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
		})
	}

	/// Returns a usable token, exchanging credentials at most once per expiry.
	pub async fn access_token(&self) -> Result<TokenRecord> {
		let observed = self.cached();
		let now = OffsetDateTime::now_utc();

		if let Some(current) = observed.as_ref().filter(|record| !self.policy.should_refresh(record, now)) {
			return Ok(current.clone());
		}

		let _singleflight = self.refresh_guard.lock().await;

		// Another caller may have replaced the record this one saw while it waited for the guard.
		if let Some(current) = self.replacement(observed.as_ref(), OffsetDateTime::now_utc()) {
			return Ok(current);
		}

		let record = obs::observe(OpKind::TokenExchange, "access_token", async {
			self.facade.exchange(&self.scope).await
		})
		.await?;

		obs::token_refreshed(record.expires_at);

		*self.cached.write() = Some(record.clone());

		Ok(record)
	}

	/// Returns the cached record without contacting the identity host.
	pub fn cached(&self) -> Option<TokenRecord> {
		self.cached.read().clone()
	}

	/// Drops the cached record so the next call re-authenticates.
	pub fn invalidate(&self) {
		if self.cached.write().take().is_some() {
			obs::token_invalidated("invalidate");
		}
	}

	/// Drops the cached record only if it still holds `rejected`.
	///
	/// Returns `false` when another caller already replaced the token.
	pub fn invalidate_if_current(&self, rejected: &TokenRecord) -> bool {
		let mut cached = self.cached.write();

		if !cached.as_ref().is_some_and(|current| same_token(current, rejected)) {
			return false;
		}

		*cached = None;

		drop(cached);
		obs::token_invalidated("unauthorized");

		true
	}

	/// Scope requested on every exchange.
	pub fn scope(&self) -> &ScopeSet {
		&self.scope
	}

	fn replacement(
		&self,
		observed: Option<&TokenRecord>,
		now: OffsetDateTime,
	) -> Option<TokenRecord> {
		let cached = self.cached.read();
		let current = cached.as_ref()?;

		if current.is_expired_at(now) {
			return None;
		}
		// Still the record this caller judged stale, so it is this caller's turn to refresh.
		if observed.is_some_and(|seen| same_token(seen, current))
			&& self.policy.should_refresh(current, now)
		{
			return None;
		}

		Some(current.clone())
	}
}
impl<C, M> Debug for TokenSession<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSession")
			.field("scope", &self.scope)
			.field("policy", &self.policy)
			.field("cached", &self.cached.read().is_some())
			.finish()
	}
}

fn same_token(lhs: &TokenRecord, rhs: &TokenRecord) -> bool {
	lhs.access_token == rhs.access_token && lhs.issued_at == rhs.issued_at
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn record(expires_at: OffsetDateTime) -> TokenRecord {
		TokenRecord::builder(ScopeSet::onsched_api())
			.access_token("tok")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_at(expires_at)
			.build()
			.expect("Token record fixture should build.")
	}

	#[test]
	fn expired_tokens_always_refresh() {
		let policy = RefreshPolicy::new(Duration::ZERO, "client", &ScopeSet::onsched_api());
		let token = record(macros::datetime!(2025-01-01 01:00 UTC));

		assert!(!policy.should_refresh(&token, macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(policy.should_refresh(&token, macros::datetime!(2025-01-01 01:00 UTC)));
	}

	#[test]
	fn preemptive_window_refreshes_early_within_jitter_bounds() {
		let policy = RefreshPolicy::new(Duration::seconds(60), "client", &ScopeSet::onsched_api());
		let token = record(macros::datetime!(2025-01-01 01:00 UTC));

		// Jitter never removes more than half of the window.
		assert!(policy.should_refresh(&token, macros::datetime!(2025-01-01 00:59:31 UTC)));
		assert!(!policy.should_refresh(&token, macros::datetime!(2025-01-01 00:58:59 UTC)));
	}

	#[test]
	fn short_lived_tokens_are_not_stale_when_minted() {
		let policy = RefreshPolicy::new(Duration::seconds(60), "client", &ScopeSet::onsched_api());
		let token = TokenRecord::builder(ScopeSet::onsched_api())
			.access_token("tok")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::seconds(30))
			.build()
			.expect("Short-lived token fixture should build.");

		assert!(!policy.should_refresh(&token, macros::datetime!(2025-01-01 00:00 UTC)));
		assert!(!policy.should_refresh(&token, macros::datetime!(2025-01-01 00:00:14 UTC)));
		assert!(policy.should_refresh(&token, macros::datetime!(2025-01-01 00:00:16 UTC)));
	}

	#[test]
	fn invalidate_if_current_keeps_replacement_tokens() {
		let url = Url::parse("https://sandbox-identity.onsched.com/connect/token")
			.expect("Token URL fixture should parse.");
		let scope = ScopeSet::onsched_api();
		let session = ReqwestTokenSession::new(
			&url,
			"client",
			&TokenSecret::new("secret"),
			ClientAuthMethod::default(),
			scope.clone(),
			RefreshPolicy::new(Duration::ZERO, "client", &scope),
			Duration::hours(1),
			ReqwestHttpClient::default(),
			ReqwestTransportErrorMapper,
		)
		.expect("Session should build without network access.");
		let rejected = record(macros::datetime!(2025-01-01 01:00 UTC));
		let replacement = TokenRecord::builder(scope)
			.access_token("tok2")
			.issued_at(macros::datetime!(2025-01-01 00:30 UTC))
			.expires_at(macros::datetime!(2025-01-01 01:30 UTC))
			.build()
			.expect("Replacement token fixture should build.");

		*session.cached.write() = Some(replacement);

		assert!(!session.invalidate_if_current(&rejected));
		assert_eq!(
			session.cached().map(|current| current.access_token.expose().to_owned()).as_deref(),
			Some("tok2")
		);

		*session.cached.write() = Some(rejected.clone());

		assert!(session.invalidate_if_current(&rejected));
		assert!(session.cached().is_none());
	}

	#[test]
	fn jitter_is_deterministic_per_identity() {
		let scope = ScopeSet::onsched_api();
		let lhs = RefreshPolicy::new(Duration::seconds(60), "client", &scope);
		let rhs = RefreshPolicy::new(Duration::seconds(60), "client", &scope);

		assert_eq!(lhs, rhs);
		assert_eq!(
			RefreshPolicy::new(Duration::seconds(-5), "client", &scope).preemptive_window,
			Duration::ZERO
		);
	}
}
