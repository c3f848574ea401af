//! The per-account session lifecycle state machine.
//!
//! One runner owns one identity, one gateway session, one API client, and
//! one credential state. It cycles forever: refresh credentials on their
//! independent clocks, authenticate, play a batch of rounds with human-like
//! pacing, cool down, and optionally sit out the nightly quiet window. Only
//! two things stop it: the Telegram account turning invalid, or the bearer
//! token refusing to refresh three times in a row.

use std::fmt;
use std::time::Duration;

use chrono::{Local, NaiveTime, Timelike};
use tracing::{debug, error, info, warn};

use sweeper_api::{ApiError, GameApi};
use sweeper_config::Settings;
use sweeper_core::{Identity, UserProfile};
use sweeper_telegram::TelegramGateway;

use crate::credentials::{AuthOutcome, CredentialManager};
use crate::error::{RunnerError, RunnerResult};
use crate::round::{RoundEngine, RoundResult};

/// Consecutive bearer-refresh failures tolerated before giving up.
const MAX_REFRESH_FAILURES: u32 = 3;

/// Profile fetch attempts per cycle.
const PROFILE_ATTEMPTS: u32 = 3;

/// Pause between local retries (refresh, profile, failed round start).
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Pause between rounds, seconds.
const ROUND_PAUSE_SECS: (u64, u64) = (15, 25);

/// Short cooldown between cycles, seconds.
const SHORT_COOLDOWN_SECS: (u64, u64) = (200, 1000);

/// Long "antifrost" cooldown, seconds.
const LONG_COOLDOWN_SECS: (u64, u64) = (3600, 10_800);

/// Every n-th cycle takes the long cooldown.
const CYCLES_PER_LONG_COOLDOWN: u32 = 3;

/// The nightly quiet window ends at this local hour.
const NIGHT_END_HOUR: u32 = 8;

/// Random extra sleep appended to the quiet window, seconds.
const NIGHT_JITTER_SECS: u64 = 3600;

/// Lifecycle states, tracked for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Constructed, not yet cycling.
    Init,
    /// Refreshing credentials and logging in.
    Authenticating,
    /// Playing rounds.
    Playing,
    /// Sleeping between cycles.
    Cooldown,
    /// Sitting out the nightly quiet window.
    NightWait,
    /// Terminal: the identity stopped playing.
    Failed,
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Authenticating => "authenticating",
            Self::Playing => "playing",
            Self::Cooldown => "cooldown",
            Self::NightWait => "night-wait",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One account's perpetual play loop.
pub struct AccountRunner<G, A> {
    identity: Identity,
    settings: Settings,
    gateway: G,
    api: A,
    creds: CredentialManager,
    engine: RoundEngine,
    state: RunnerState,
    refresh_failures: u32,
    cycles_since_cooldown: u32,
}

impl<G, A> AccountRunner<G, A>
where
    G: TelegramGateway,
    A: GameApi,
{
    /// Build a runner for one identity.
    #[must_use]
    pub fn new(identity: Identity, settings: Settings, gateway: G, api: A) -> Self {
        let engine = RoundEngine::new(&settings);
        Self {
            identity,
            settings,
            gateway,
            api,
            creds: CredentialManager::new(),
            engine,
            state: RunnerState::Init,
            refresh_failures: 0,
            cycles_since_cooldown: 0,
        }
    }

    /// The account's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Cycle until a terminal failure.
    ///
    /// # Errors
    ///
    /// Returns the [`RunnerError`] that stopped this identity; transient
    /// problems never surface here.
    pub async fn run(&mut self) -> RunnerResult<()> {
        info!(account = %self.identity.name, "account runner started");
        loop {
            if let Err(e) = self.cycle().await {
                self.transition(RunnerState::Failed);
                error!(account = %self.identity.name, error = %e, "account runner stopped");
                return Err(e);
            }
        }
    }

    /// One full cycle: credentials, profile, rounds, cooldown.
    async fn cycle(&mut self) -> RunnerResult<()> {
        self.transition(RunnerState::Authenticating);
        self.refresh_access_token().await?;
        self.refresh_web_app_auth().await?;

        let profile = self.fetch_profile().await?;

        self.transition(RunnerState::Playing);
        self.play_rounds(&profile).await;

        self.cooldown().await;
        Ok(())
    }

    /// Step 1: keep the bearer token fresh; three consecutive failed
    /// refreshes end the runner.
    async fn refresh_access_token(&mut self) -> RunnerResult<()> {
        while self.creds.state().access_token_expired() && self.creds.state().logged_in {
            if self
                .creds
                .ensure_access_token(&self.identity.name, &self.api)
                .await
            {
                self.refresh_failures = 0;
                break;
            }

            self.refresh_failures = self.refresh_failures.saturating_add(1);
            warn!(
                account = %self.identity.name,
                attempt = self.refresh_failures,
                "token refresh attempt failed"
            );
            if self.refresh_failures >= MAX_REFRESH_FAILURES {
                return Err(RunnerError::RefreshExhausted {
                    attempts: self.refresh_failures,
                });
            }
            tokio::time::sleep(RETRY_PAUSE).await;
        }
        Ok(())
    }

    /// Step 2: keep the web-app auth blob fresh on its own clock, logging
    /// in whenever a new blob lands (or a previous login never stuck).
    async fn refresh_web_app_auth(&mut self) -> RunnerResult<()> {
        let outcome = self
            .creds
            .ensure_web_app_auth(
                &self.identity.name,
                &mut self.gateway,
                &self.identity.referral_id,
            )
            .await?;

        let should_login = match outcome {
            AuthOutcome::Refreshed => true,
            AuthOutcome::StillFresh | AuthOutcome::NoUpdate => {
                !self.creds.state().logged_in && self.creds.state().init_data.is_some()
            },
        };
        if should_login {
            self.creds
                .login(&self.identity.name, &self.api, &self.identity.referral_id)
                .await;
        }
        Ok(())
    }

    /// Step 3: fetch the profile, with bounded retries and a refresh
    /// attempt between them.
    async fn fetch_profile(&mut self) -> RunnerResult<UserProfile> {
        for attempt in 1..=PROFILE_ATTEMPTS {
            match self.api.me(self.creds.state()).await {
                Ok(profile) => {
                    debug!(
                        account = %self.identity.name,
                        user_id = %profile.id,
                        score = profile.score,
                        "profile fetched"
                    );
                    return Ok(profile);
                },
                Err(e) => {
                    warn!(
                        account = %self.identity.name,
                        attempt,
                        error = %e,
                        "profile fetch failed"
                    );
                    if matches!(e, ApiError::AuthExpired) {
                        self.creds.state_mut().expire_access_token();
                    }
                    if attempt < PROFILE_ATTEMPTS {
                        tokio::time::sleep(RETRY_PAUSE).await;
                        let _ = self
                            .creds
                            .ensure_access_token(&self.identity.name, &self.api)
                            .await;
                    }
                },
            }
        }
        Err(RunnerError::ProfileUnavailable {
            attempts: PROFILE_ATTEMPTS,
        })
    }

    /// Step 4: play a drawn number of rounds. A slot whose round fails to
    /// start is still consumed after a short pause.
    async fn play_rounds(&mut self, profile: &UserProfile) {
        let rounds = self.settings.rounds_per_game.sample();
        info!(account = %self.identity.name, rounds, "play session started");

        let user_id = self
            .creds
            .user_id()
            .map_or_else(|| profile.id.clone(), str::to_string);

        for slot in 1..=rounds {
            match self
                .engine
                .play_round(
                    &self.identity.name,
                    &self.api,
                    self.creds.state_mut(),
                    &user_id,
                )
                .await
            {
                RoundResult::Played(outcome) => {
                    debug!(
                        account = %self.identity.name,
                        slot,
                        game_id = %outcome.game_id,
                        won = outcome.won,
                        "round finished"
                    );
                },
                RoundResult::NotStarted => {
                    tokio::time::sleep(RETRY_PAUSE).await;
                },
            }

            if slot < rounds {
                let pause = fastrand::u64(ROUND_PAUSE_SECS.0..=ROUND_PAUSE_SECS.1);
                tokio::time::sleep(Duration::from_secs(pause)).await;
            }
        }
    }

    /// Steps 5–6: pace the next cycle; every third cycle idles long enough
    /// to look cold, and the nightly window is honored afterwards.
    async fn cooldown(&mut self) {
        self.transition(RunnerState::Cooldown);
        self.cycles_since_cooldown = self.cycles_since_cooldown.saturating_add(1);

        let secs = if self.cycles_since_cooldown >= CYCLES_PER_LONG_COOLDOWN {
            self.cycles_since_cooldown = 0;
            let secs = fastrand::u64(LONG_COOLDOWN_SECS.0..=LONG_COOLDOWN_SECS.1);
            info!(account = %self.identity.name, secs, "antifrost cooldown");
            secs
        } else {
            let secs = fastrand::u64(SHORT_COOLDOWN_SECS.0..=SHORT_COOLDOWN_SECS.1);
            debug!(account = %self.identity.name, secs, "cooldown");
            secs
        };
        tokio::time::sleep(Duration::from_secs(secs)).await;

        self.night_wait().await;
    }

    /// Sleep out the nightly quiet window (00:00–08:00 local) plus jitter.
    async fn night_wait(&mut self) {
        if !self.settings.night_sleep {
            return;
        }
        let Some(remaining) = night_seconds_remaining(Local::now().time()) else {
            return;
        };

        self.transition(RunnerState::NightWait);
        let total = remaining.saturating_add(fastrand::u64(0..=NIGHT_JITTER_SECS));
        info!(
            account = %self.identity.name,
            sleep_secs = total,
            "inside night window, sleeping until morning"
        );
        tokio::time::sleep(Duration::from_secs(total)).await;
    }

    fn transition(&mut self, next: RunnerState) {
        if self.state != next {
            debug!(
                account = %self.identity.name,
                from = %self.state,
                to = %next,
                "state transition"
            );
            self.state = next;
        }
    }
}

/// Seconds until the quiet window ends, if `now` falls inside it.
fn night_seconds_remaining(now: NaiveTime) -> Option<u64> {
    if now.hour() >= NIGHT_END_HOUR {
        return None;
    }
    let window_end = u64::from(NIGHT_END_HOUR).saturating_mul(3600);
    let since_midnight = u64::from(now.num_seconds_from_midnight());
    Some(window_end.saturating_sub(since_midnight))
}
