//! Fan-out: one independent task per account, with staggered starts.

use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{error, info};

use sweeper_api::GameApi;
use sweeper_telegram::TelegramGateway;

use crate::runner::AccountRunner;

/// Staggered start offset range, seconds.
const STAGGER_SECS: (u64, u64) = (1, 5);

/// Runs account runners as independent tokio tasks.
///
/// Runners share nothing; the only cross-account coordination is the random
/// start offset. A failing runner takes down only itself.
pub struct RunnerPool {
    tasks: JoinSet<()>,
}

impl RunnerPool {
    /// Empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    /// Number of spawned runners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the pool holds no runners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawn a runner with a staggered start.
    pub fn spawn<G, A>(&mut self, mut runner: AccountRunner<G, A>)
    where
        G: TelegramGateway + 'static,
        A: GameApi + 'static,
    {
        self.tasks.spawn(async move {
            let delay = fastrand::u64(STAGGER_SECS.0..=STAGGER_SECS.1);
            info!(account = %runner.name(), delay, "account ready, staggering start");
            tokio::time::sleep(Duration::from_secs(delay)).await;

            // The runner logs its own terminal error; the pool only keeps
            // the other accounts alive.
            let _ = runner.run().await;
        });
    }

    /// Wait for every runner to stop.
    pub async fn join_all(mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "runner task aborted");
            }
        }
    }
}

impl Default for RunnerPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GatewayScript, MockApi, MockGateway};
    use sweeper_config::{BoundedRange, Settings};
    use sweeper_core::Identity;

    fn failing_runner(name: &str) -> AccountRunner<MockGateway, MockApi> {
        let mut script = GatewayScript::happy();
        script.connect_error = Some("deactivated".to_string());
        let identity = Identity {
            name: name.to_string(),
            user_agent: "UA".to_string(),
            proxy: None,
            referral_id: "1".to_string(),
        };
        let settings = Settings {
            night_sleep: false,
            rounds_per_game: BoundedRange::new(1, 1),
            ..Settings::default()
        };
        AccountRunner::new(identity, settings, MockGateway::new(script), MockApi::new())
    }

    #[tokio::test(start_paused = true)]
    async fn pool_joins_independent_failures() {
        let mut pool = RunnerPool::new();
        pool.spawn(failing_runner("a"));
        pool.spawn(failing_runner("b"));
        assert_eq!(pool.len(), 2);

        // Both runners fail fatally on their first cycle; join_all returns.
        pool.join_all().await;
    }

    #[tokio::test]
    async fn empty_pool_joins_immediately() {
        let pool = RunnerPool::new();
        assert!(pool.is_empty());
        pool.join_all().await;
    }
}
