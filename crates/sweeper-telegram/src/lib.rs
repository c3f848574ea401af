#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Telegram-side capabilities for the sweeper runner.
//!
//! The MTProto client itself lives behind the [`TelegramGateway`] trait: the
//! runner only needs connect/disconnect, a one-time `/start`, peer
//! resolution, and a web-app view request. Everything protocol-specific is
//! an implementation concern of whoever provides the trait object.
//!
//! [`webapp`] turns the URL returned by a web-view request into the auth
//! blob the game API expects, plus the identity fields embedded in it.

/// The gateway capability trait and its error taxonomy.
pub mod gateway;
/// Web-app auth data extraction.
pub mod webapp;

pub use gateway::{GatewayError, GatewayResult, PeerRef, TelegramGateway};
pub use webapp::{WebAppData, WebAppError, WebAppUser, extract_init_data};
