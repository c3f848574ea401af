//! The Telegram gateway capability trait.

use async_trait::async_trait;

/// Opaque reference to a resolved bot peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRef(String);

impl PeerRef {
    /// Wrap an implementation-specific peer handle.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// The underlying handle.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors produced by a gateway implementation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The account is unauthorized, deactivated, or its auth key is
    /// unregistered. The identity is unusable; the runner terminates.
    #[error("account invalid: {0}")]
    AccountInvalid(String),

    /// Telegram-side rate limit; retry the same operation after the
    /// mandated wait.
    #[error("flood wait: retry after {seconds}s")]
    FloodWait {
        /// Mandated wait in seconds.
        seconds: u64,
    },

    /// Any other connection or protocol failure; transient.
    #[error("gateway transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Whether this error permanently invalidates the identity.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AccountInvalid(_))
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// The opaque Telegram capability set the runner drives.
///
/// One gateway instance belongs to one account; calls are never issued
/// concurrently. Implementations map their client's unauthorized /
/// deactivated / key-unregistered errors to
/// [`GatewayError::AccountInvalid`] and rate-limit signals to
/// [`GatewayError::FloodWait`].
#[async_trait]
pub trait TelegramGateway: Send {
    /// Open the underlying session.
    async fn connect(&mut self) -> GatewayResult<()>;

    /// Whether the session is currently open.
    fn is_connected(&self) -> bool;

    /// Scan recent chat history with `bot` for a prior `/start` command
    /// (message text or caption).
    async fn has_start_command(&mut self, bot: &str) -> GatewayResult<bool>;

    /// Resolve the bot's peer handle.
    async fn resolve_bot_peer(&mut self, bot: &str) -> GatewayResult<PeerRef>;

    /// Send the start-bot command with a referral start parameter and a
    /// caller-supplied correlation id.
    async fn start_bot(
        &mut self,
        peer: &PeerRef,
        start_param: &str,
        random_id: u64,
    ) -> GatewayResult<()>;

    /// Request a web-app view for `url`; returns the view URL whose
    /// fragment carries the auth payload.
    async fn request_web_view(
        &mut self,
        peer: &PeerRef,
        url: &str,
        start_param: &str,
    ) -> GatewayResult<String>;

    /// Close the underlying session.
    async fn disconnect(&mut self) -> GatewayResult<()>;
}
