//! Game error types.
//!
//! Gameplay generation never fails: a missing rule spawns nothing and an
//! exhausted placement search falls back to an unconstrained point. Errors only
//! surface from configuration loading and validation, and from callers holding a
//! handle to an asteroid that has since been recycled.

use std::fmt;

/// Top-level error enum for the AsteraX core.
#[derive(Debug)]
pub enum GameError {
    /// The configuration file exists but could not be read.
    ConfigRead {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error message.
        reason: String,
    },

    /// The configuration file was read but is not valid TOML for [`crate::config::GameConfig`].
    ConfigParse {
        /// Parser error message.
        reason: String,
    },

    /// A spawn rule breaks the size ≥ 1 / health ≥ 1 invariant.
    InvalidSpawnRule {
        /// Level number of the offending rule.
        level: u32,
        /// Field name, e.g. `"child_size"`.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },

    /// A tuning constant is outside its usable range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        safe_range: &'static str,
    },

    /// An asteroid handle refers to an instance that was released and possibly reused.
    StaleHandle {
        /// Where the lookup occurred.
        context: &'static str,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::ConfigRead { path, reason } => {
                write!(f, "failed to read config '{}': {}", path, reason)
            }
            GameError::ConfigParse { reason } => write!(f, "invalid config: {}", reason),
            GameError::InvalidSpawnRule {
                level,
                field,
                value,
            } => write!(
                f,
                "spawn rule for level {} has {} = {} (sizes and health must be ≥ 1)",
                level, field, value
            ),
            GameError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            GameError::StaleHandle { context } => {
                write!(f, "stale asteroid handle during '{}'", context)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> GameResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` is zero or positive.
pub fn validate_non_negative(name: &'static str, value: f32) -> GameResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(validate_positive("x", 0.0).is_err());
        assert!(validate_positive("x", f32::NAN).is_err());
        assert!(validate_positive("x", 0.5).is_ok());
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert!(validate_non_negative("x", 0.0).is_ok());
        assert!(validate_non_negative("x", -0.1).is_err());
    }

    #[test]
    fn spawn_rule_error_names_level_and_field() {
        let err = GameError::InvalidSpawnRule {
            level: 4,
            field: "child_health",
            value: 0.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("level 4"), "message was: {msg}");
        assert!(msg.contains("child_health"), "message was: {msg}");
    }
}
