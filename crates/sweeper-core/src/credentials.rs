//! Credential state for one account: the bearer token and the web-app auth
//! blob, each with its own expiry clock.
//!
//! The two clocks are deliberately independent value pairs checked against
//! their own TTLs; refreshing one never touches the other. A
//! [`CredentialState`] is owned exclusively by one account runner and is only
//! ever mutated through `&mut self`, so at most one refresh per credential
//! type can be in flight.

use std::time::{Duration, Instant};

/// Bearer-token TTL range in seconds; a fresh value is drawn on every reset.
pub const ACCESS_TOKEN_TTL_SECS: (u64, u64) = (3500, 3600);

/// Web-app auth blob TTL range in seconds.
pub const AUTH_BLOB_TTL_SECS: (u64, u64) = (850, 900);

/// One `{issued_at, ttl}` expiry pair.
///
/// A clock starts expired (nothing issued yet). [`TokenClock::reset`] stamps
/// "now" and redraws the TTL uniformly from the clock's range.
#[derive(Debug, Clone)]
pub struct TokenClock {
    issued_at: Option<Instant>,
    ttl: Duration,
    ttl_range_secs: (u64, u64),
}

impl TokenClock {
    /// Create an expired clock with the given inclusive TTL range.
    #[must_use]
    pub fn new(ttl_range_secs: (u64, u64)) -> Self {
        Self {
            issued_at: None,
            ttl: Duration::from_secs(fastrand::u64(ttl_range_secs.0..=ttl_range_secs.1)),
            ttl_range_secs,
        }
    }

    /// Whether the credential guarded by this clock must be refreshed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        match self.issued_at {
            None => true,
            Some(at) => at.elapsed() >= self.ttl,
        }
    }

    /// Stamp "now" and redraw the TTL from the clock's range.
    pub fn reset(&mut self) {
        self.issued_at = Some(Instant::now());
        self.ttl = Duration::from_secs(fastrand::u64(
            self.ttl_range_secs.0..=self.ttl_range_secs.1,
        ));
    }

    /// Force the clock expired so the next cycle refreshes.
    pub fn expire(&mut self) {
        self.issued_at = None;
    }

    /// The currently drawn TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Mutable credential state for one account runner.
#[derive(Debug, Clone)]
pub struct CredentialState {
    /// Short-lived bearer token for game API calls.
    pub access_token: Option<String>,
    /// Refresh token accepted by the refresh endpoint.
    pub refresh_token: Option<String>,
    /// Decoded web-app init data, sent verbatim as `Tl-Init-Data` and in the
    /// login body.
    pub init_data: Option<String>,
    /// Whether a login has succeeded since the last full re-auth.
    pub logged_in: bool,
    access_clock: TokenClock,
    auth_clock: TokenClock,
}

impl CredentialState {
    /// Fresh state: nothing issued, both clocks expired.
    #[must_use]
    pub fn new() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            init_data: None,
            logged_in: false,
            access_clock: TokenClock::new(ACCESS_TOKEN_TTL_SECS),
            auth_clock: TokenClock::new(AUTH_BLOB_TTL_SECS),
        }
    }

    /// Whether the bearer token must be refreshed before the next API call.
    #[must_use]
    pub fn access_token_expired(&self) -> bool {
        self.access_clock.is_expired()
    }

    /// Whether the web-app auth blob must be re-obtained from Telegram.
    #[must_use]
    pub fn auth_blob_expired(&self) -> bool {
        self.auth_clock.is_expired()
    }

    /// Replace both tokens and restart the access clock with a fresh TTL.
    pub fn store_tokens(&mut self, access_token: String, refresh_token: String) {
        self.access_token = Some(access_token);
        self.refresh_token = Some(refresh_token);
        self.access_clock.reset();
    }

    /// Store a freshly extracted auth blob and restart the auth clock.
    ///
    /// The clock is advanced here and only here: a failed extraction leaves
    /// the clock expired, so the next cycle retries instead of stalling on
    /// stale state.
    pub fn store_init_data(&mut self, init_data: String) {
        self.init_data = Some(init_data);
        self.auth_clock.reset();
    }

    /// Force the bearer token expired (after an HTTP 401).
    pub fn expire_access_token(&mut self) {
        self.access_clock.expire();
    }

    /// The bearer token, if one is held.
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// The currently drawn access-token TTL.
    #[must_use]
    pub fn access_token_ttl(&self) -> Duration {
        self.access_clock.ttl()
    }

    /// The currently drawn auth-blob TTL.
    #[must_use]
    pub fn auth_blob_ttl(&self) -> Duration {
        self.auth_clock.ttl()
    }
}

impl Default for CredentialState {
    fn default() -> Self {
        Self::new()
    }
}
