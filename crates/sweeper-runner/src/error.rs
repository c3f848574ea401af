//! Runner error types.

use thiserror::Error;

/// Terminal failures of one account runner.
///
/// Everything transient is absorbed inside the cycle; an error reaching the
/// caller means this identity has stopped playing for good.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The Telegram account is unusable (unauthorized / deactivated /
    /// key unregistered).
    #[error("account invalid: {0}")]
    AccountInvalid(String),

    /// The bearer token could not be refreshed three times in a row.
    #[error("token refresh failed {attempts} consecutive times")]
    RefreshExhausted {
        /// Consecutive failure count at the time of giving up.
        attempts: u32,
    },

    /// The user profile stayed unreachable across retries and a refresh
    /// attempt.
    #[error("profile fetch failed after {attempts} attempts")]
    ProfileUnavailable {
        /// Attempts made before giving up.
        attempts: u32,
    },
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_counts() {
        let err = RunnerError::RefreshExhausted { attempts: 3 };
        assert!(err.to_string().contains('3'));

        let err = RunnerError::ProfileUnavailable { attempts: 3 };
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RunnerError>();
    }
}
