#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Domain types for the sweeper account runner.
//!
//! This crate has no dependencies on the other internal sweeper crates. It
//! holds the value types shared across the workspace:
//!
//! - [`Identity`]: one provisioned Telegram account (name, user agent,
//!   optional proxy, referral id).
//! - [`CredentialState`]: the two independently-expiring credentials
//!   (bearer token and web-app auth blob) with their [`TokenClock`]s.
//! - [`RoundData`] / [`RoundOutcome`]: one play of the reward game.
//! - [`score`]: the reward-score formula and the HMAC win signature,
//!   reproduced exactly as the remote service verifies them.

/// Credential state and expiry clocks.
pub mod credentials;
/// Account identity, proxy configuration, and profile snapshot.
pub mod identity;
/// Round payloads and outcomes.
pub mod round;
/// Reward scoring and the win-report signature.
pub mod score;

pub use credentials::{CredentialState, TokenClock};
pub use identity::{Identity, IdentityError, ProxyConfig, UserProfile};
pub use round::{RoundData, RoundOutcome, RoundRewards};
