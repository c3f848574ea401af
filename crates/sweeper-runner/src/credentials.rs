//! The credential manager: keeps the bearer token and the web-app auth blob
//! valid on their independent schedules.

use std::time::Duration;

use tracing::{info, warn};

use sweeper_api::GameApi;
use sweeper_core::CredentialState;
use sweeper_telegram::{GatewayError, PeerRef, TelegramGateway, WebAppUser, extract_init_data};

use crate::error::{RunnerError, RunnerResult};

/// Bot handle the web-app flow talks to.
pub const BOT_HANDLE: &str = "BybitCoinsweeper_Bot";

/// Web-app target URL passed to the web-view request.
pub const GAME_URL: &str = "https://bybitcoinsweeper.com";

/// Extra seconds slept on top of a flood-wait's mandated duration.
const FLOOD_WAIT_BUFFER_SECS: u64 = 3;

/// Pause after a generic web-app auth failure before reporting "no update".
const AUTH_FAILURE_PAUSE_SECS: u64 = 3;

/// What a web-app auth attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The cached blob is still inside its TTL; nothing was done.
    StillFresh,
    /// A fresh blob was obtained and stored; the caller should log in.
    Refreshed,
    /// The attempt failed non-fatally. Clocks were not advanced, so the
    /// next cycle retries; stale credentials stay usable meanwhile.
    NoUpdate,
}

/// Owns one account's [`CredentialState`] and drives both refresh flows.
pub struct CredentialManager {
    state: CredentialState,
    user: Option<WebAppUser>,
}

impl CredentialManager {
    /// Fresh manager with both credentials expired.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CredentialState::new(),
            user: None,
        }
    }

    /// Read access to the credential state.
    #[must_use]
    pub fn state(&self) -> &CredentialState {
        &self.state
    }

    /// Mutable access for the round engine's 401 handling.
    pub fn state_mut(&mut self) -> &mut CredentialState {
        &mut self.state
    }

    /// The Telegram user id extracted with the last auth blob.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    /// Refresh the bearer token if it is expired and a login has happened.
    ///
    /// Returns `true` when the token is usable afterwards (fresh already, or
    /// refreshed now, or no login yet so there is nothing to refresh) and
    /// `false` on a failed refresh; the caller counts those.
    pub async fn ensure_access_token(&mut self, account: &str, api: &dyn GameApi) -> bool {
        if !self.state.access_token_expired() || !self.state.logged_in {
            return true;
        }
        let Some(refresh_token) = self.state.refresh_token.clone() else {
            warn!(account, "access token expired but no refresh token held");
            return false;
        };

        info!(account, "access token expired, refreshing");
        match api.refresh_token(&refresh_token).await {
            Ok(pair) => {
                self.state.store_tokens(pair.access_token, pair.refresh_token);
                info!(account, "token refresh succeeded");
                true
            },
            Err(e) => {
                warn!(account, error = %e, "token refresh failed");
                false
            },
        }
    }

    /// Re-obtain the web-app auth blob if its clock has expired.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::AccountInvalid`] when the gateway reports the
    /// identity unusable; every other failure is absorbed into
    /// [`AuthOutcome::NoUpdate`].
    pub async fn ensure_web_app_auth(
        &mut self,
        account: &str,
        gateway: &mut dyn TelegramGateway,
        referral_id: &str,
    ) -> RunnerResult<AuthOutcome> {
        if !self.state.auth_blob_expired() {
            return Ok(AuthOutcome::StillFresh);
        }

        let start_param = format!("referredBy={referral_id}");
        match obtain_web_app_data(account, gateway, &start_param).await {
            Ok((init_data, user)) => {
                info!(account, user_id = %user.id, "web-app auth refreshed");
                self.state.store_init_data(init_data);
                self.user = Some(user);
                Ok(AuthOutcome::Refreshed)
            },
            Err(e) if e.is_fatal() => Err(RunnerError::AccountInvalid(e.to_string())),
            Err(e) => {
                warn!(account, error = %e, "web-app auth failed, keeping stale credentials");
                tokio::time::sleep(Duration::from_secs(AUTH_FAILURE_PAUSE_SECS)).await;
                Ok(AuthOutcome::NoUpdate)
            },
        }
    }

    /// Exchange the held auth blob for a token pair.
    ///
    /// Failures are logged and swallowed: the next cycle sees
    /// `logged_in == false` and tries again.
    pub async fn login(&mut self, account: &str, api: &dyn GameApi, referral_id: &str) {
        let Some(init_data) = self.state.init_data.clone() else {
            return;
        };
        match api.login(&init_data, referral_id).await {
            Ok(pair) => {
                self.state.store_tokens(pair.access_token, pair.refresh_token);
                self.state.logged_in = true;
                info!(account, "logged in");
            },
            Err(e) => {
                warn!(account, error = %e, "login failed");
            },
        }
    }
}

impl Default for CredentialManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive the gateway through the full web-view flow and pull the auth
/// payload out of the returned URL.
async fn obtain_web_app_data(
    account: &str,
    gateway: &mut dyn TelegramGateway,
    start_param: &str,
) -> Result<(String, WebAppUser), GatewayError> {
    if !gateway.is_connected() {
        gateway.connect().await?;
    }

    if !gateway.has_start_command(BOT_HANDLE).await? {
        let peer = resolve_with_flood_retry(account, gateway).await?;
        let random_id = fastrand::u64(1..=9_999_999);
        gateway.start_bot(&peer, start_param, random_id).await?;
        info!(account, "sent /start to bot");
    }

    let peer = resolve_with_flood_retry(account, gateway).await?;
    let url = gateway.request_web_view(&peer, GAME_URL, start_param).await?;

    let data = extract_init_data(&url)
        .map_err(|e| GatewayError::Transport(format!("web-app payload: {e}")))?;

    // Session stays closed between auth refreshes.
    gateway.disconnect().await?;

    Ok((data.init_data, data.user))
}

/// Resolve the bot peer, honoring flood-wait signals with unbounded
/// sleep-and-retry.
async fn resolve_with_flood_retry(
    account: &str,
    gateway: &mut dyn TelegramGateway,
) -> Result<PeerRef, GatewayError> {
    loop {
        match gateway.resolve_bot_peer(BOT_HANDLE).await {
            Ok(peer) => return Ok(peer),
            Err(GatewayError::FloodWait { seconds }) => {
                let wait = seconds.saturating_add(FLOOD_WAIT_BUFFER_SECS);
                warn!(account, seconds, wait, "flood wait while resolving bot peer");
                tokio::time::sleep(Duration::from_secs(wait)).await;
            },
            Err(e) => return Err(e),
        }
    }
}
