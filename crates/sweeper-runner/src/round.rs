//! The round engine: plays exactly one round end-to-end and reports its
//! result.
//!
//! The engine is stateless between calls. It draws the win/lose decision,
//! simulates human play latency, and for wins computes the reward score and
//! the HMAC the remote anti-cheat verifies.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use sweeper_api::{ApiError, GameApi, LossReport, WinReport};
use sweeper_config::{BoundedRange, Settings};
use sweeper_core::{CredentialState, RoundData, RoundOutcome, score};

/// What one round slot produced.
#[derive(Debug)]
pub enum RoundResult {
    /// The round never started (transient failure or 401); the slot is
    /// consumed anyway.
    NotStarted,
    /// The round was played to completion and reported.
    Played(RoundOutcome),
}

/// Plays rounds against the game API.
pub struct RoundEngine {
    play_time_secs: BoundedRange,
    chance_to_win: u8,
}

impl RoundEngine {
    /// Build an engine from the runner settings.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            play_time_secs: settings.play_time_secs,
            chance_to_win: settings.chance_to_win,
        }
    }

    /// Win/lose gate: a uniform draw in `[1, 100]` above the configured
    /// chance selects the losing path.
    #[must_use]
    pub fn decide_win(&self) -> bool {
        fastrand::u64(1..=100) <= u64::from(self.chance_to_win)
    }

    /// Play one full round: start, simulate play time, resolve as win or
    /// loss, report.
    pub async fn play_round(
        &self,
        account: &str,
        api: &dyn GameApi,
        creds: &mut CredentialState,
        user_id: &str,
    ) -> RoundResult {
        let round = match api.start_round(creds).await {
            Ok(round) => round,
            Err(ApiError::AuthExpired) => {
                warn!(account, "round start rejected (401), refreshing token");
                refresh_after_401(account, api, creds).await;
                return RoundResult::NotStarted;
            },
            Err(e) => {
                warn!(account, error = %e, "round start failed");
                return RoundResult::NotStarted;
            },
        };

        let won = if self.decide_win() {
            self.resolve_win(account, api, creds, user_id, &round).await
        } else {
            self.resolve_loss(account, api, creds, &round).await;
            false
        };

        RoundResult::Played(RoundOutcome {
            game_id: round.id,
            won,
        })
    }

    /// Resolve a round as a loss.
    async fn resolve_loss(
        &self,
        account: &str,
        api: &dyn GameApi,
        creds: &mut CredentialState,
        round: &RoundData,
    ) {
        self.simulate_play().await;

        match api.report_loss(creds, &LossReport::for_round(round)).await {
            Ok(()) => {
                info!(account, game_id = %round.id, "round lost");
                refresh_profile(account, api, creds).await;
            },
            Err(ApiError::AuthExpired) => {
                warn!(account, game_id = %round.id, "loss report rejected (401)");
                refresh_after_401(account, api, creds).await;
            },
            Err(e) => {
                warn!(account, game_id = %round.id, error = %e, "loss report failed");
            },
        }
    }

    /// Resolve a round as a win. Returns whether the server accepted it.
    async fn resolve_win(
        &self,
        account: &str,
        api: &dyn GameApi,
        creds: &mut CredentialState,
        user_id: &str,
        round: &RoundData,
    ) -> bool {
        let seconds_played = self.simulate_play().await;

        let elapsed_ms = Utc::now()
            .signed_duration_since(round.created_at)
            .num_milliseconds();
        let game_score = score::compute_score(seconds_played, &round.id);
        let signature = score::win_signature(user_id, &round.id, elapsed_ms, seconds_played);
        let report = WinReport::for_round(round, seconds_played, signature, game_score);

        match api.report_win(creds, &report).await {
            Ok(()) => {
                info!(account, game_id = %round.id, score = game_score, "round won");
                refresh_profile(account, api, creds).await;
                true
            },
            Err(ApiError::AuthExpired) => {
                warn!(account, game_id = %round.id, "win report rejected (401)");
                refresh_after_401(account, api, creds).await;
                false
            },
            Err(e) => {
                warn!(account, game_id = %round.id, error = %e, "win report failed");
                false
            },
        }
    }

    /// Sleep a uniform draw from the play-time range; returns the seconds
    /// "played".
    async fn simulate_play(&self) -> u64 {
        let seconds = self.play_time_secs.sample();
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        seconds
    }
}

/// Expire the bearer token and attempt one refresh. The rejected call is
/// not retried; the next loop iteration re-authenticates naturally.
async fn refresh_after_401(account: &str, api: &dyn GameApi, creds: &mut CredentialState) {
    creds.expire_access_token();
    let Some(refresh_token) = creds.refresh_token.clone() else {
        return;
    };
    match api.refresh_token(&refresh_token).await {
        Ok(pair) => {
            creds.store_tokens(pair.access_token, pair.refresh_token);
            info!(account, "token refreshed after 401");
        },
        Err(e) => {
            warn!(account, error = %e, "refresh after 401 failed");
        },
    }
}

/// Re-fetch the balance after a confirmed round; failures only warn.
async fn refresh_profile(account: &str, api: &dyn GameApi, creds: &mut CredentialState) {
    match api.me(creds).await {
        Ok(profile) => {
            info!(account, score = profile.score, "balance updated");
        },
        Err(e) => {
            warn!(account, error = %e, "balance refresh failed");
        },
    }
}
