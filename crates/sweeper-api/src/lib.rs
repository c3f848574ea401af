#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! HTTP client for the coinsweeper game API.
//!
//! [`GameApiClient`] is a thin, stateless transport: callers supply the
//! credential state for headers and interpret the typed results. Status
//! handling follows the service's conventions: the auth endpoints treat
//! HTTP 201 as the only success, authenticated calls map HTTP 401 to
//! [`ApiError::AuthExpired`] so the caller can refresh, and everything else
//! surfaces as [`ApiError::Status`].

/// The reqwest-backed client and the [`GameApi`] trait.
pub mod client;
/// Error types.
pub mod error;
/// Wire DTOs.
pub mod types;

pub use client::{DEFAULT_BASE_URL, GAME_ORIGIN, GameApi, GameApiClient};
pub use error::{ApiError, ApiResult};
pub use types::{LossReport, TokenPair, WinReport};
