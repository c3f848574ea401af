#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! The per-account session lifecycle: credential manager, round engine, and
//! the state machine that drives them.
//!
//! One [`AccountRunner`] owns one identity end to end. Its cycle:
//!
//! ```text
//! init → authenticating → playing → cooldown ─┬→ authenticating → …
//!                                             └→ night-wait → authenticating → …
//! ```
//!
//! Two credentials expire on independent clocks (the bearer token and the
//! Telegram web-app auth blob) and are refreshed separately by the
//! [`CredentialManager`]. The [`RoundEngine`] plays individual rounds with
//! randomized human-like pacing and computes the win-report score and
//! signature. [`RunnerPool`] fans runners out as independent tasks.

/// The credential manager.
pub mod credentials;
/// Terminal runner errors.
pub mod error;
/// Task fan-out.
pub mod pool;
/// The round engine.
pub mod round;
/// The account state machine.
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use credentials::{AuthOutcome, BOT_HANDLE, CredentialManager, GAME_URL};
pub use error::{RunnerError, RunnerResult};
pub use pool::RunnerPool;
pub use round::{RoundEngine, RoundResult};
pub use runner::{AccountRunner, RunnerState};
