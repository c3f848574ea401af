//! Round payloads as the game API returns them, and the per-round outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reward components attached to a round.
///
/// The values are opaque to us: whatever the start endpoint hands out is
/// passed back unchanged when the round is resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRewards {
    /// Coin reward component.
    #[serde(default)]
    pub bag_coins: Value,
    /// Bits reward component.
    #[serde(default)]
    pub bits: Value,
    /// Gift reward component.
    #[serde(default)]
    pub gifts: Value,
}

/// A started round, as returned by the start endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundData {
    /// Round id, echoed back on win/lose and mixed into the win signature.
    pub id: String,
    /// Server-side creation time (UTC); the win signature covers the elapsed
    /// milliseconds since this instant.
    pub created_at: DateTime<Utc>,
    /// Opaque reward components.
    #[serde(default)]
    pub rewards: RoundRewards,
}

/// The result of one played round, reported and then discarded.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// Id of the round that was played.
    pub game_id: String,
    /// Whether the round was resolved as a win.
    pub won: bool,
}
