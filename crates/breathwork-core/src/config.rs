//! Session configuration: defaults, partial overrides and validation.

use std::fmt;
use std::str::FromStr;

use breathwork_platform::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::phase::{PhaseTimings, MAX_PHASE_DURATION};

pub const MIN_COMPLEXITY: u32 = 10;
pub const MAX_COMPLEXITY: u32 = 100;

/// Scene selected for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualMode {
    #[default]
    Rings,
    RingsWave,
    RingsExpand,
    RingsSpiral,
    StarDust,
    Fluid,
    Crystal,
    Topography,
    Bio,
    Atmosphere,
}

impl VisualMode {
    pub const ALL: [VisualMode; 10] = [
        VisualMode::Rings,
        VisualMode::RingsWave,
        VisualMode::RingsExpand,
        VisualMode::RingsSpiral,
        VisualMode::StarDust,
        VisualMode::Fluid,
        VisualMode::Crystal,
        VisualMode::Topography,
        VisualMode::Bio,
        VisualMode::Atmosphere,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisualMode::Rings => "rings",
            VisualMode::RingsWave => "ringsWave",
            VisualMode::RingsExpand => "ringsExpand",
            VisualMode::RingsSpiral => "ringsSpiral",
            VisualMode::StarDust => "starDust",
            VisualMode::Fluid => "fluid",
            VisualMode::Crystal => "crystal",
            VisualMode::Topography => "topography",
            VisualMode::Bio => "bio",
            VisualMode::Atmosphere => "atmosphere",
        }
    }

    pub fn is_ring_family(self) -> bool {
        matches!(
            self,
            VisualMode::Rings
                | VisualMode::RingsWave
                | VisualMode::RingsExpand
                | VisualMode::RingsSpiral
        )
    }
}

impl fmt::Display for VisualMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisualMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownVisualMode(s.to_string()))
    }
}

/// A color written as a hex string in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(Rgba);

impl HexColor {
    pub fn rgba(self) -> Rgba {
        self.0
    }
}

impl FromStr for HexColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba::from_hex(s)
            .map(HexColor)
            .ok_or_else(|| ConfigError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for HexColor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0.to_hex()
    }
}

impl From<Rgba> for HexColor {
    fn from(color: Rgba) -> Self {
        HexColor(color)
    }
}

/// Everything a host hands to the engine. Missing keys in TOML/JSON input
/// take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BreathConfig {
    pub inhale_time: f64,
    pub hold_full_time: f64,
    pub exhale_time: f64,
    pub hold_empty_time: f64,
    pub cycles: u32,
    pub visual_mode: VisualMode,
    pub primary_color: HexColor,
    pub secondary_color: HexColor,
    pub background_color: HexColor,
    pub complexity: u32,
    pub glow_intensity: f32,
    pub line_thickness: f32,
    pub shadow_enabled: bool,
    pub shadow_blur: f32,
    pub trail_effect: bool,
    pub pulse_on_hold: bool,
}

impl Default for BreathConfig {
    fn default() -> Self {
        Self {
            inhale_time: 4.0,
            hold_full_time: 4.0,
            exhale_time: 4.0,
            hold_empty_time: 4.0,
            cycles: 4,
            visual_mode: VisualMode::Rings,
            primary_color: HexColor(Rgba::from_rgba8(0x7d, 0xd3, 0xfc, 0xff)),
            secondary_color: HexColor(Rgba::from_rgba8(0xc0, 0x84, 0xfc, 0xff)),
            background_color: HexColor(Rgba::from_rgba8(0x0f, 0x17, 0x2a, 0xff)),
            complexity: 50,
            glow_intensity: 50.0,
            line_thickness: 2.0,
            shadow_enabled: true,
            shadow_blur: 10.0,
            trail_effect: false,
            pulse_on_hold: true,
        }
    }
}

impl BreathConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: BreathConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: BreathConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn timings(&self) -> PhaseTimings {
        PhaseTimings {
            inhale: self.inhale_time,
            hold_full: self.hold_full_time,
            exhale: self.exhale_time,
            hold_empty: self.hold_empty_time,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("inhaleTime", self.inhale_time),
            ("holdFullTime", self.hold_full_time),
            ("exhaleTime", self.exhale_time),
            ("holdEmptyTime", self.hold_empty_time),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { field, value });
            }
            check_range(field, value, 0.0, MAX_PHASE_DURATION.as_secs_f64())?;
        }
        if self.cycles == 0 {
            return Err(ConfigError::InvalidCycles(self.cycles));
        }
        check_range(
            "complexity",
            self.complexity as f64,
            MIN_COMPLEXITY as f64,
            MAX_COMPLEXITY as f64,
        )?;
        check_range("glowIntensity", self.glow_intensity as f64, 0.0, 100.0)?;
        check_range("lineThickness", self.line_thickness as f64, 1.0, 5.0)?;
        check_range("shadowBlur", self.shadow_blur as f64, 0.0, 100.0)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}

/// Partial update merged onto an existing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BreathConfigOverrides {
    pub inhale_time: Option<f64>,
    pub hold_full_time: Option<f64>,
    pub exhale_time: Option<f64>,
    pub hold_empty_time: Option<f64>,
    pub cycles: Option<u32>,
    pub visual_mode: Option<VisualMode>,
    pub primary_color: Option<HexColor>,
    pub secondary_color: Option<HexColor>,
    pub background_color: Option<HexColor>,
    pub complexity: Option<u32>,
    pub glow_intensity: Option<f32>,
    pub line_thickness: Option<f32>,
    pub shadow_enabled: Option<bool>,
    pub shadow_blur: Option<f32>,
    pub trail_effect: Option<bool>,
    pub pulse_on_hold: Option<bool>,
}

impl BreathConfigOverrides {
    /// Whether applying these overrides would change phase timing or cycle count.
    pub fn touches_timing(&self) -> bool {
        self.inhale_time.is_some()
            || self.hold_full_time.is_some()
            || self.exhale_time.is_some()
            || self.hold_empty_time.is_some()
            || self.cycles.is_some()
    }

    /// Merges onto `base` and validates the result.
    pub fn apply(&self, base: &BreathConfig) -> Result<BreathConfig, ConfigError> {
        let merged = BreathConfig {
            inhale_time: self.inhale_time.unwrap_or(base.inhale_time),
            hold_full_time: self.hold_full_time.unwrap_or(base.hold_full_time),
            exhale_time: self.exhale_time.unwrap_or(base.exhale_time),
            hold_empty_time: self.hold_empty_time.unwrap_or(base.hold_empty_time),
            cycles: self.cycles.unwrap_or(base.cycles),
            visual_mode: self.visual_mode.unwrap_or(base.visual_mode),
            primary_color: self.primary_color.unwrap_or(base.primary_color),
            secondary_color: self.secondary_color.unwrap_or(base.secondary_color),
            background_color: self.background_color.unwrap_or(base.background_color),
            complexity: self.complexity.unwrap_or(base.complexity),
            glow_intensity: self.glow_intensity.unwrap_or(base.glow_intensity),
            line_thickness: self.line_thickness.unwrap_or(base.line_thickness),
            shadow_enabled: self.shadow_enabled.unwrap_or(base.shadow_enabled),
            shadow_blur: self.shadow_blur.unwrap_or(base.shadow_blur),
            trail_effect: self.trail_effect.unwrap_or(base.trail_effect),
            pulse_on_hold: self.pulse_on_hold.unwrap_or(base.pulse_on_hold),
        };
        merged.validate()?;
        Ok(merged)
    }
}
