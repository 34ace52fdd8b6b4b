//! Typed profile-history operations over the event cache.
//!
//! Each operation is a get/decode/mutate/encode/set round trip against
//! one named event. The cache stays payload-agnostic; this layer owns
//! which event name holds which collection and how decode failures
//! degrade (logged, treated as an empty collection, matching the cache's
//! own failure posture).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use profile_events::{
    names, AccessTokenEntry, AccessTokens, ConnectedOrganizations, LoginEvent, LoginEvents,
    RefreshTokenEntry, RefreshTokens,
};

use crate::cache::ProfileCache;
use crate::error::{CacheError, CacheResult};
use crate::revocation::RevocationCache;

/// Default login-history cap when the caller does not supply one.
pub const DEFAULT_MAX_LOGIN_EVENTS: usize = 50;

/// Typed operations over one principal's profile record.
///
/// All read operations return an empty collection when the principal has
/// no history, the record was unreadable, or the stored payload failed to
/// decode. Write operations report success as `bool`, mirroring the
/// cache underneath.
pub struct ProfileHistory {
    cache: Arc<ProfileCache>,
    revocation: Option<Arc<dyn RevocationCache>>,
}

impl ProfileHistory {
    /// Creates a history layer without revocation support.
    #[must_use]
    pub fn new(cache: Arc<ProfileCache>) -> Self {
        Self {
            cache,
            revocation: None,
        }
    }

    /// Attaches a revocation backend, enabling the revoke operations.
    #[must_use]
    pub fn with_revocation(mut self, revocation: Arc<dyn RevocationCache>) -> Self {
        self.revocation = Some(revocation);
        self
    }

    /// Returns the underlying cache.
    #[must_use]
    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    // === Login events ===

    /// Returns the principal's login history, oldest first.
    pub async fn login_events(&self, principal: &str) -> LoginEvents {
        match self.cache.get_single_event(principal, names::LOGIN_EVENTS).await {
            Some(event) => parse_or_empty(LoginEvents::parse(event.value()), names::LOGIN_EVENTS),
            None => LoginEvents::new(),
        }
    }

    /// Records a login, keeping at most `max_entries` entries (oldest
    /// evicted first). Callers that pass `None` get
    /// [`DEFAULT_MAX_LOGIN_EVENTS`].
    pub async fn record_login_event(
        &self,
        principal: &str,
        event: LoginEvent,
        max_entries: Option<usize>,
    ) -> bool {
        let cap = max_entries.unwrap_or(DEFAULT_MAX_LOGIN_EVENTS);
        let mut events = self.login_events(principal).await.with_max_entries(cap);
        events.append(event);

        let Ok(json) = log_encode_failure(events.serialize()) else {
            return false;
        };
        self.cache.set_single_event(principal, names::LOGIN_EVENTS, &json).await
    }

    // === Connected organizations ===

    /// Returns the principal's connected-organization counters.
    pub async fn connected_organizations(&self, principal: &str) -> ConnectedOrganizations {
        match self
            .cache
            .get_single_event(principal, names::CONNECTED_ORGANIZATIONS)
            .await
        {
            Some(event) => parse_or_empty(
                ConnectedOrganizations::parse(event.value()),
                names::CONNECTED_ORGANIZATIONS,
            ),
            None => ConnectedOrganizations::new(),
        }
    }

    /// Records one authentication to a relying party, creating or
    /// incrementing its counter and replacing its released-attribute
    /// list.
    pub async fn record_authentication(
        &self,
        principal: &str,
        relying_party_id: &str,
        service_name: &str,
        attribute_ids: Vec<String>,
    ) -> bool {
        let mut orgs = self.connected_organizations(principal).await;
        orgs.record_authentication(relying_party_id, service_name, attribute_ids);

        let Ok(json) = log_encode_failure(orgs.serialize()) else {
            return false;
        };
        self.cache
            .set_single_event(principal, names::CONNECTED_ORGANIZATIONS, &json)
            .await
    }

    // === Access tokens ===

    /// Returns the principal's access-token snapshots verbatim,
    /// including expired entries.
    pub async fn access_tokens(&self, principal: &str) -> AccessTokens {
        match self.cache.get_single_event(principal, names::ACCESS_TOKENS).await {
            Some(event) => parse_or_empty(AccessTokens::parse(event.value()), names::ACCESS_TOKENS),
            None => AccessTokens::new(),
        }
    }

    /// Returns the principal's access-token snapshots with expired
    /// entries pruned. The stored record is not rewritten.
    pub async fn active_access_tokens(&self, principal: &str) -> AccessTokens {
        let mut tokens = self.access_tokens(principal).await;
        tokens.prune_expired(now_seconds());
        tokens
    }

    /// Appends an access-token snapshot, dropping already-expired
    /// entries while the record is being rewritten anyway.
    pub async fn record_access_token(&self, principal: &str, entry: AccessTokenEntry) -> bool {
        let mut tokens = self.access_tokens(principal).await;
        tokens.prune_expired(now_seconds());
        tokens.append(entry);

        let Ok(json) = log_encode_failure(tokens.serialize()) else {
            return false;
        };
        self.cache.set_single_event(principal, names::ACCESS_TOKENS, &json).await
    }

    /// Revokes an access token by its snapshot's root identifier.
    ///
    /// Returns `Ok(false)` when no live snapshot with that token ID
    /// exists (unknown or already expired).
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if no revocation backend is
    /// attached, or a revocation error if the backend call fails.
    pub async fn revoke_access_token(&self, principal: &str, token_id: &str) -> CacheResult<bool> {
        let tokens = self.access_tokens(principal).await;
        let Some(entry) = tokens.get(token_id) else {
            return Ok(false);
        };
        self.revoke(&entry.token_root_id, entry.exp).await
    }

    // === Refresh tokens ===

    /// Returns the principal's refresh-token snapshots verbatim,
    /// including expired entries.
    pub async fn refresh_tokens(&self, principal: &str) -> RefreshTokens {
        match self.cache.get_single_event(principal, names::REFRESH_TOKENS).await {
            Some(event) => {
                parse_or_empty(RefreshTokens::parse(event.value()), names::REFRESH_TOKENS)
            }
            None => RefreshTokens::new(),
        }
    }

    /// Returns the principal's refresh-token snapshots with expired
    /// entries pruned. The stored record is not rewritten.
    pub async fn active_refresh_tokens(&self, principal: &str) -> RefreshTokens {
        let mut tokens = self.refresh_tokens(principal).await;
        tokens.prune_expired(now_seconds());
        tokens
    }

    /// Appends a refresh-token snapshot, dropping already-expired
    /// entries while the record is being rewritten anyway.
    pub async fn record_refresh_token(&self, principal: &str, entry: RefreshTokenEntry) -> bool {
        let mut tokens = self.refresh_tokens(principal).await;
        tokens.prune_expired(now_seconds());
        tokens.append(entry);

        let Ok(json) = log_encode_failure(tokens.serialize()) else {
            return false;
        };
        self.cache.set_single_event(principal, names::REFRESH_TOKENS, &json).await
    }

    /// Revokes a refresh token by its snapshot's root identifier.
    ///
    /// Returns `Ok(false)` when no live snapshot with that token ID
    /// exists (unknown or already expired).
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if no revocation backend is
    /// attached, or a revocation error if the backend call fails.
    pub async fn revoke_refresh_token(&self, principal: &str, token_id: &str) -> CacheResult<bool> {
        let tokens = self.refresh_tokens(principal).await;
        let Some(entry) = tokens.get(token_id) else {
            return Ok(false);
        };
        self.revoke(&entry.token_root_id, entry.exp).await
    }

    async fn revoke(&self, token_root_id: &str, exp: u64) -> CacheResult<bool> {
        let revocation = self.revocation.as_ref().ok_or_else(|| {
            CacheError::Configuration("no revocation cache configured".to_string())
        })?;

        let remaining = exp.saturating_sub(now_seconds());
        if remaining == 0 {
            // Already expired; nothing to revoke.
            return Ok(false);
        }

        revocation.revoke(token_root_id, Duration::from_secs(remaining)).await?;
        Ok(true)
    }
}

fn now_seconds() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

fn parse_or_empty<T: Default>(
    result: Result<T, profile_events::EventsError>,
    event_name: &str,
) -> T {
    match result {
        Ok(collection) => collection,
        Err(e) => {
            tracing::warn!(event = event_name, "undecodable payload, treating as empty: {e}");
            T::default()
        }
    }
}

fn log_encode_failure<T>(result: Result<T, profile_events::EventsError>) -> Result<T, ()> {
    result.map_err(|e| {
        tracing::warn!("failed to encode payload, skipping update: {e}");
    })
}
