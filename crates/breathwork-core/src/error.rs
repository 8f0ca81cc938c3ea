use thiserror::Error;

/// Rejections raised while building or merging a [`BreathConfig`](crate::BreathConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cycles must be at least 1, got {0}")]
    InvalidCycles(u32),

    #[error("{field} must be a finite, non-negative number of seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f64 },

    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("invalid color {0:?}: expected #rgb, #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    #[error("unknown visual mode {0:?}")]
    UnknownVisualMode(String),

    #[error("unknown breathing preset {0:?}")]
    UnknownPreset(String),

    #[error("phase timings cannot change while a session is running")]
    TimingLockedWhileRunning,

    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}
