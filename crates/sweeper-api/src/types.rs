//! Wire types for the game API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sweeper_core::RoundData;

/// Token pair returned by the login and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Token accepted by the refresh endpoint.
    pub refresh_token: String,
}

/// Body of `POST /auth/refresh-token`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub init_data: &'a str,
    pub referred_by: &'a str,
}

/// Body of `POST /games/lose`: the round's reward components echoed back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LossReport {
    /// Coin component, as received from the start endpoint.
    pub bag_coins: Value,
    /// Bits component.
    pub bits: Value,
    /// Round id.
    pub game_id: String,
    /// Gift component.
    pub gifts: Value,
}

impl LossReport {
    /// Build a loss report for a started round.
    #[must_use]
    pub fn for_round(round: &RoundData) -> Self {
        Self {
            bag_coins: round.rewards.bag_coins.clone(),
            bits: round.rewards.bits.clone(),
            game_id: round.id.clone(),
            gifts: round.rewards.gifts.clone(),
        }
    }
}

/// Body of `POST /games/win`: rewards plus the anti-cheat fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinReport {
    /// Coin component, as received from the start endpoint.
    pub bag_coins: Value,
    /// Bits component.
    pub bits: Value,
    /// Round id.
    pub game_id: String,
    /// Seconds the round was "played".
    pub game_time: u64,
    /// Gift component.
    pub gifts: Value,
    /// Hex HMAC signature over the play parameters.
    pub h: String,
    /// Claimed reward score (integer part floored, fractional id term added).
    pub score: f64,
}

impl WinReport {
    /// Build a win report for a started round.
    #[must_use]
    pub fn for_round(round: &RoundData, game_time: u64, signature: String, score: f64) -> Self {
        Self {
            bag_coins: round.rewards.bag_coins.clone(),
            bits: round.rewards.bits.clone(),
            game_id: round.id.clone(),
            game_time,
            gifts: round.rewards.gifts.clone(),
            h: signature,
            score,
        }
    }
}
