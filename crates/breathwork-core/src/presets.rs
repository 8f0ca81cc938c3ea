//! Named breathing patterns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::BreathConfig;
use crate::error::ConfigError;
use crate::phase::PhaseTimings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreathPreset {
    /// Equal four-count sides.
    Box,
    /// 4-7-8 for sleep and anxiety.
    Relaxing,
    /// Resonant breathing around six breaths per minute.
    Coherence,
    Triangle,
    Calm,
}

impl BreathPreset {
    pub const ALL: [BreathPreset; 5] = [
        BreathPreset::Box,
        BreathPreset::Relaxing,
        BreathPreset::Coherence,
        BreathPreset::Triangle,
        BreathPreset::Calm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BreathPreset::Box => "box",
            BreathPreset::Relaxing => "relaxing",
            BreathPreset::Coherence => "coherence",
            BreathPreset::Triangle => "triangle",
            BreathPreset::Calm => "calm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BreathPreset::Box => "Box breathing",
            BreathPreset::Relaxing => "4-7-8 relaxing breath",
            BreathPreset::Coherence => "Coherent breathing",
            BreathPreset::Triangle => "Triangle breathing",
            BreathPreset::Calm => "Calming long exhale",
        }
    }

    pub fn timings(self) -> PhaseTimings {
        let (inhale, hold_full, exhale, hold_empty) = match self {
            BreathPreset::Box => (4.0, 4.0, 4.0, 4.0),
            BreathPreset::Relaxing => (4.0, 7.0, 8.0, 0.0),
            BreathPreset::Coherence => (5.5, 0.0, 5.5, 0.0),
            BreathPreset::Triangle => (4.0, 4.0, 4.0, 0.0),
            BreathPreset::Calm => (4.0, 2.0, 6.0, 0.0),
        };
        PhaseTimings {
            inhale,
            hold_full,
            exhale,
            hold_empty,
        }
    }

    pub fn recommended_cycles(self) -> u32 {
        match self {
            BreathPreset::Box => 4,
            BreathPreset::Relaxing => 4,
            BreathPreset::Coherence => 10,
            BreathPreset::Triangle => 6,
            BreathPreset::Calm => 8,
        }
    }

    /// Replaces timings and cycle count on `config`, keeping visual settings.
    pub fn apply(self, config: &BreathConfig) -> BreathConfig {
        let timings = self.timings();
        BreathConfig {
            inhale_time: timings.inhale,
            hold_full_time: timings.hold_full,
            exhale_time: timings.exhale,
            hold_empty_time: timings.hold_empty,
            cycles: self.recommended_cycles(),
            ..config.clone()
        }
    }
}

impl fmt::Display for BreathPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BreathPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = match wanted.as_str() {
            "4-7-8" | "478" => "relaxing",
            other => other,
        };
        BreathPreset::ALL
            .into_iter()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_produces_a_valid_config() {
        for preset in BreathPreset::ALL {
            preset.apply(&BreathConfig::default()).validate().unwrap();
        }
    }

    #[test]
    fn applying_keeps_visual_settings() {
        let base = BreathConfig {
            complexity: 90,
            trail_effect: true,
            ..Default::default()
        };
        let config = BreathPreset::Relaxing.apply(&base);
        assert_eq!(config.complexity, 90);
        assert!(config.trail_effect);
        assert_eq!(config.hold_full_time, 7.0);
        assert_eq!(config.hold_empty_time, 0.0);
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("4-7-8".parse::<BreathPreset>().unwrap(), BreathPreset::Relaxing);
        assert_eq!(" Box ".parse::<BreathPreset>().unwrap(), BreathPreset::Box);
        assert!(matches!(
            "wim-hof".parse::<BreathPreset>(),
            Err(ConfigError::UnknownPreset(_))
        ));
    }
}
