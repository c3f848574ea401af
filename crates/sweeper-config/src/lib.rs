#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Environment-sourced settings for the sweeper runner.
//!
//! Settings come from process environment variables (with an optional `.env`
//! file loaded first). Every field has a working default, so an empty
//! environment produces a usable configuration; anything that is set must
//! parse and pass validation.
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `REF_ID` | `12345678` | referral id sent on start + login |
//! | `CHANCE_TO_WIN` | `80` | win probability per round, percent |
//! | `NIGHT_SLEEP` | `1` | pause play during 00:00–08:00 local |
//! | `ROUND_COUNT_EACH_GAME` | `2,5` | rounds per cycle, inclusive range |
//! | `TIME_TO_PLAY_EACH_GAME` | `30,90` | simulated play seconds, inclusive range |

/// Configuration error types.
pub mod error;

pub use error::{ConfigError, ConfigResult};

use serde::Serialize;

/// An inclusive `min..=max` range sampled uniformly per use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundedRange {
    /// Inclusive lower bound.
    pub min: u64,
    /// Inclusive upper bound.
    pub max: u64,
}

impl BoundedRange {
    /// Create a range; callers validate `min <= max` separately.
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Draw a uniform value from the range.
    #[must_use]
    pub fn sample(&self) -> u64 {
        fastrand::u64(self.min..=self.max)
    }

    fn parse(key: &'static str, raw: &str) -> ConfigResult<Self> {
        let (min, max) = raw
            .split_once(',')
            .ok_or_else(|| ConfigError::Invalid {
                key,
                value: raw.to_string(),
                reason: "expected \"min,max\"".to_string(),
            })?;
        let min = parse_u64(key, min.trim())?;
        let max = parse_u64(key, max.trim())?;
        Ok(Self { min, max })
    }
}

fn parse_u64(key: &'static str, raw: &str) -> ConfigResult<u64> {
    raw.parse().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: format!("not a number: {e}"),
    })
}

/// Runtime settings consumed by the account runners.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Referral id sent with the bot start command and the login request.
    pub ref_id: String,
    /// Percent chance that a round is played to a win (0–100).
    pub chance_to_win: u8,
    /// Whether runners pause during the nightly quiet window.
    pub night_sleep: bool,
    /// How many rounds to play per cycle.
    pub rounds_per_game: BoundedRange,
    /// Simulated play duration per round, in seconds.
    pub play_time_secs: BoundedRange,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ref_id: "12345678".to_string(),
            chance_to_win: 80,
            night_sleep: true,
            rounds_per_game: BoundedRange::new(2, 5),
            play_time_secs: BoundedRange::new(30, 90),
        }
    }
}

impl Settings {
    /// Load settings from the process environment, reading a `.env` file
    /// first if one exists.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a set variable fails to parse or
    /// validation rejects the resulting settings.
    pub fn from_env() -> ConfigResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup("REF_ID") {
            settings.ref_id = raw;
        }
        if let Some(raw) = lookup("CHANCE_TO_WIN") {
            settings.chance_to_win = raw.parse().map_err(|e| ConfigError::Invalid {
                key: "CHANCE_TO_WIN",
                value: raw.clone(),
                reason: format!("not a number: {e}"),
            })?;
        }
        if let Some(raw) = lookup("NIGHT_SLEEP") {
            settings.night_sleep = parse_bool("NIGHT_SLEEP", &raw)?;
        }
        if let Some(raw) = lookup("ROUND_COUNT_EACH_GAME") {
            settings.rounds_per_game = BoundedRange::parse("ROUND_COUNT_EACH_GAME", &raw)?;
        }
        if let Some(raw) = lookup("TIME_TO_PLAY_EACH_GAME") {
            settings.play_time_secs = BoundedRange::parse("TIME_TO_PLAY_EACH_GAME", &raw)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.chance_to_win > 100 {
            return Err(ConfigError::Constraint {
                key: "CHANCE_TO_WIN",
                constraint: "0 <= chance <= 100",
            });
        }
        if self.rounds_per_game.min > self.rounds_per_game.max {
            return Err(ConfigError::Constraint {
                key: "ROUND_COUNT_EACH_GAME",
                constraint: "min <= max",
            });
        }
        if self.play_time_secs.min > self.play_time_secs.max {
            return Err(ConfigError::Constraint {
                key: "TIME_TO_PLAY_EACH_GAME",
                constraint: "min <= max",
            });
        }
        if self.play_time_secs.min == 0 {
            return Err(ConfigError::Constraint {
                key: "TIME_TO_PLAY_EACH_GAME",
                constraint: "min >= 1 second",
            });
        }
        Ok(())
    }
}

fn parse_bool(key: &'static str, raw: &str) -> ConfigResult<bool> {
    match raw.trim() {
        "1" | "true" | "True" | "TRUE" | "yes" => Ok(true),
        "0" | "false" | "False" | "FALSE" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            value: other.to_string(),
            reason: "expected a boolean (1/0/true/false)".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings.ref_id, "12345678");
        assert_eq!(settings.chance_to_win, 80);
        assert!(settings.night_sleep);
        assert_eq!(settings.rounds_per_game, BoundedRange::new(2, 5));
        assert_eq!(settings.play_time_secs, BoundedRange::new(30, 90));
    }

    #[test]
    fn all_fields_read_from_environment() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("REF_ID", "424242"),
            ("CHANCE_TO_WIN", "55"),
            ("NIGHT_SLEEP", "0"),
            ("ROUND_COUNT_EACH_GAME", "1,3"),
            ("TIME_TO_PLAY_EACH_GAME", "10, 20"),
        ]))
        .unwrap();

        assert_eq!(settings.ref_id, "424242");
        assert_eq!(settings.chance_to_win, 55);
        assert!(!settings.night_sleep);
        assert_eq!(settings.rounds_per_game, BoundedRange::new(1, 3));
        assert_eq!(settings.play_time_secs, BoundedRange::new(10, 20));
    }

    #[test]
    fn chance_above_100_is_rejected() {
        let err =
            Settings::from_lookup(lookup_from(&[("CHANCE_TO_WIN", "101")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Constraint {
                key: "CHANCE_TO_WIN",
                ..
            }
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[("ROUND_COUNT_EACH_GAME", "5,2")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Constraint {
                key: "ROUND_COUNT_EACH_GAME",
                ..
            }
        ));
    }

    #[test]
    fn zero_play_time_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[("TIME_TO_PLAY_EACH_GAME", "0,10")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Constraint {
                key: "TIME_TO_PLAY_EACH_GAME",
                ..
            }
        ));
    }

    #[test]
    fn malformed_range_is_rejected() {
        let err =
            Settings::from_lookup(lookup_from(&[("ROUND_COUNT_EACH_GAME", "3")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn bool_accepts_numeric_and_word_forms() {
        for truthy in ["1", "true", "True", "yes"] {
            assert!(parse_bool("NIGHT_SLEEP", truthy).unwrap());
        }
        for falsy in ["0", "false", "no"] {
            assert!(!parse_bool("NIGHT_SLEEP", falsy).unwrap());
        }
        assert!(parse_bool("NIGHT_SLEEP", "maybe").is_err());
    }

    #[test]
    fn sample_stays_in_bounds() {
        let range = BoundedRange::new(15, 25);
        for _ in 0..200 {
            let value = range.sample();
            assert!((15..=25).contains(&value));
        }
    }

    #[test]
    fn sample_of_degenerate_range_is_constant() {
        let range = BoundedRange::new(7, 7);
        assert_eq!(range.sample(), 7);
    }
}
