//! Reward scoring and the win-report signature.
//!
//! Both are reverse-engineered server-side checks: the remote service
//! recomputes the score and the HMAC from the submitted fields and rejects
//! the win on any mismatch. The integer floor, the key/message layout, and
//! the hex digest must stay exactly as they are.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Base points per round.
pub const SCORE_BASE: i64 = 45;
/// Divisor of the score multiplier.
pub const SCORE_DIVISOR: f64 = 54.0;
/// Offset of the score multiplier.
pub const SCORE_OFFSET: f64 = 9.0;

/// Time bonus ceiling: play time eats into it at 10 points per second.
const TIME_BONUS_CEILING: i64 = 1200;
/// Flat bonus added to every win.
const FLAT_BONUS: i64 = 2000;

/// Fractional per-game term: the sum of the round id's codepoints, divided
/// by 100000.
#[must_use]
pub fn character_value(game_id: &str) -> f64 {
    let sum: u64 = game_id.chars().map(|c| u64::from(u32::from(c))).sum();
    #[allow(clippy::cast_precision_loss)]
    let value = sum as f64 / 100_000.0;
    value
}

/// Reward score for a winning round.
///
/// `floor((10*45 + max(0, 1200 - 10*seconds_played) + 2000) * (1 + 9/54) / 10)`
/// plus [`character_value`] of the round id. The floor truncates the integer
/// component before the fractional term is added.
#[must_use]
pub fn compute_score(seconds_played: u64, game_id: &str) -> f64 {
    let played = i64::try_from(seconds_played).unwrap_or(i64::MAX);
    let time_bonus = TIME_BONUS_CEILING
        .saturating_sub(played.saturating_mul(10))
        .max(0);
    let points = SCORE_BASE
        .saturating_mul(10)
        .saturating_add(time_bonus)
        .saturating_add(FLAT_BONUS);

    let multiplier = 1.0 + SCORE_OFFSET / SCORE_DIVISOR;
    #[allow(clippy::cast_precision_loss)]
    let whole = ((points as f64) * multiplier / 10.0).floor();

    whole + character_value(game_id)
}

/// Hex-encoded HMAC-SHA256 signature for a win report.
///
/// Key is `"{user_id}v$2f1-{game_id}-{elapsed_ms}"`, message is
/// `"{seconds_played}-{game_id}"`.
#[must_use]
pub fn win_signature(
    user_id: &str,
    game_id: &str,
    elapsed_ms: i64,
    seconds_played: u64,
) -> String {
    let key = format!("{user_id}v$2f1-{game_id}-{elapsed_ms}");
    let message = format!("{seconds_played}-{game_id}");

    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
