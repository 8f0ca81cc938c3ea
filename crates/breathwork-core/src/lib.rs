//! Breathwork core engine: platform-agnostic breath timing, per-mode
//! simulation state and renderers.

pub mod config;
pub mod easing;
pub mod engine;
pub mod error;
pub mod noise;
pub mod phase;
pub mod presets;
pub mod render;
pub mod state;

pub use config::{BreathConfig, BreathConfigOverrides, HexColor, VisualMode, MAX_COMPLEXITY, MIN_COMPLEXITY};
pub use engine::{Engine, EngineStatus, RunSummary, SessionCallbacks, Snapshot, COUNTDOWN_STEPS};
pub use error::ConfigError;
pub use phase::{intensity, BreathPhase, PhaseSample, PhaseScheduler, PhaseTimings};
pub use presets::BreathPreset;
pub use render::{renderer_for, FrameContext, ModeRenderer, RenderStyle};
pub use state::{initialize, initialize_with_rng, VisualizationState};
