//! The frame loop.
//!
//! An [`Engine`] owns one session's configuration, run state and visualization
//! state. The host requests frames through a [`TickScheduler`] and calls
//! [`Engine::tick`] with a monotonic timestamp whenever a requested frame
//! fires. Nothing on the tick path fails: a surface that is not ready simply
//! produces no frame and the next tick catches up.

use std::fmt;
use std::time::Duration;

use breathwork_platform::{Surface, SurfaceMetrics, TickHandle, TickScheduler};
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::{BreathConfig, BreathConfigOverrides, VisualMode};
use crate::error::ConfigError;
use crate::phase::{BreathPhase, PhaseEvent, PhaseSample, PhaseScheduler, RunState};
use crate::render::{renderer_for, FrameContext, RenderStyle};
use crate::state::{initialize, VisualizationState};

/// Steps in the pre-roll countdown, one per second.
pub const COUNTDOWN_STEPS: u32 = 3;
const COUNTDOWN_STEP: Duration = Duration::from_secs(1);
/// Frame delta assumed for the first frame after a (re)start.
const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EngineStatus {
    Idle,
    Countdown,
    Running,
    Complete,
}

impl EngineStatus {
    /// Ticks are being requested.
    pub fn is_active(self) -> bool {
        matches!(self, EngineStatus::Countdown | EngineStatus::Running)
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineStatus::Idle => "idle",
            EngineStatus::Countdown => "countdown",
            EngineStatus::Running => "running",
            EngineStatus::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Outcome of a session that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub cycles: u32,
    pub duration_secs: u64,
}

/// Read-only view of the engine for host overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub status: EngineStatus,
    pub phase: BreathPhase,
    pub progress: f32,
    pub intensity: f32,
    /// 1-based cycle, 0 before the session starts.
    pub cycle: u32,
    pub cycles: u32,
    /// Remaining countdown step while counting down.
    pub countdown: Option<u32>,
    pub visual_mode: VisualMode,
}

/// Host hooks fired by the engine.
#[derive(Default)]
pub struct SessionCallbacks {
    on_complete: Option<Box<dyn FnMut(u64)>>,
    on_close: Option<Box<dyn FnMut()>>,
    on_phase: Option<Box<dyn FnMut(BreathPhase, u32)>>,
    on_countdown: Option<Box<dyn FnMut(u32)>>,
}

impl SessionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once with the session length in whole seconds.
    pub fn on_complete(mut self, f: impl FnMut(u64) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_close(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    /// Called on every phase entry with the 1-based cycle.
    pub fn on_phase(mut self, f: impl FnMut(BreathPhase, u32) + 'static) -> Self {
        self.on_phase = Some(Box::new(f));
        self
    }

    /// Called with 3, 2 and 1 as the countdown runs.
    pub fn on_countdown(mut self, f: impl FnMut(u32) + 'static) -> Self {
        self.on_countdown = Some(Box::new(f));
        self
    }

    fn complete(&mut self, duration_secs: u64) {
        if let Some(f) = self.on_complete.as_mut() {
            f(duration_secs);
        }
    }

    fn close(&mut self) {
        if let Some(f) = self.on_close.as_mut() {
            f();
        }
    }

    fn phase(&mut self, phase: BreathPhase, cycle: u32) {
        if let Some(f) = self.on_phase.as_mut() {
            f(phase, cycle);
        }
    }

    fn countdown(&mut self, remaining: u32) {
        if let Some(f) = self.on_countdown.as_mut() {
            f(remaining);
        }
    }
}

impl fmt::Debug for SessionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCallbacks")
            .field("on_complete", &self.on_complete.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_phase", &self.on_phase.is_some())
            .field("on_countdown", &self.on_countdown.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Countdown { remaining: u32, step_started: Duration },
    Running(RunState),
    Complete,
}

pub struct Engine {
    config: BreathConfig,
    style: RenderStyle,
    phases: PhaseScheduler,
    ticks: Box<dyn TickScheduler>,
    callbacks: SessionCallbacks,
    stage: Stage,
    pending: Option<TickHandle>,
    metrics: Option<SurfaceMetrics>,
    state: Option<VisualizationState>,
    last_sample: PhaseSample,
    epoch: Option<Duration>,
    last_frame: Option<Duration>,
    summary: Option<RunSummary>,
    closed: bool,
}

impl Engine {
    pub fn new(
        config: BreathConfig,
        ticks: Box<dyn TickScheduler>,
        callbacks: SessionCallbacks,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            style: RenderStyle::from_config(&config),
            phases: PhaseScheduler::new(config.timings(), config.cycles),
            config,
            ticks,
            callbacks,
            stage: Stage::Idle,
            pending: None,
            metrics: None,
            state: None,
            last_sample: PhaseSample::resting(BreathPhase::Idle),
            epoch: None,
            last_frame: None,
            summary: None,
            closed: false,
        })
    }

    pub fn config(&self) -> &BreathConfig {
        &self.config
    }

    pub fn status(&self) -> EngineStatus {
        match self.stage {
            Stage::Idle => EngineStatus::Idle,
            Stage::Countdown { .. } => EngineStatus::Countdown,
            Stage::Running(_) => EngineStatus::Running,
            Stage::Complete => EngineStatus::Complete,
        }
    }

    pub fn phase(&self) -> BreathPhase {
        match self.stage {
            Stage::Running(run) => run.phase,
            Stage::Complete => BreathPhase::Complete,
            Stage::Idle | Stage::Countdown { .. } => BreathPhase::Idle,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn visualization(&self) -> Option<&VisualizationState> {
        self.state.as_ref()
    }

    /// Summary of the last session that ran to completion.
    pub fn last_summary(&self) -> Option<RunSummary> {
        self.summary
    }

    /// Logical drawing size, once known.
    pub fn logical_size(&self) -> Option<Vec2> {
        self.metrics.map(|m| m.logical_size())
    }

    pub fn snapshot(&self) -> Snapshot {
        let (cycle, countdown) = match self.stage {
            Stage::Running(run) => (run.current_cycle, None),
            Stage::Countdown { remaining, .. } => (0, Some(remaining)),
            Stage::Complete => (self.phases.cycles(), None),
            Stage::Idle => (0, None),
        };
        let sample = match self.stage {
            Stage::Running(_) => self.last_sample,
            _ => PhaseSample::resting(self.phase()),
        };
        Snapshot {
            status: self.status(),
            phase: sample.phase,
            progress: sample.progress,
            intensity: sample.intensity,
            cycle,
            cycles: self.phases.cycles(),
            countdown,
            visual_mode: self.config.visual_mode,
        }
    }

    /// Begins the 3-2-1 countdown. The breathing session starts at inhale,
    /// cycle 1, three seconds after `now`.
    pub fn start(&mut self, now: Duration) {
        if self.closed {
            warn!("start ignored: engine was closed");
            return;
        }
        if self.status().is_active() {
            warn!("start ignored: session already {}", self.status());
            return;
        }
        info!(
            "starting {} session: {} cycles of {:.1}s",
            self.config.visual_mode,
            self.phases.cycles(),
            self.phases.timings().cycle_duration().as_secs_f64()
        );
        self.summary = None;
        self.epoch = Some(now);
        self.last_frame = None;
        self.last_sample = PhaseSample::resting(BreathPhase::Idle);
        self.stage = Stage::Countdown {
            remaining: COUNTDOWN_STEPS,
            step_started: now,
        };
        debug!("countdown {COUNTDOWN_STEPS}");
        self.callbacks.countdown(COUNTDOWN_STEPS);
        self.request_tick();
    }

    /// Skips the countdown and starts breathing at `now`.
    pub fn start_immediately(&mut self, now: Duration) {
        if self.closed {
            warn!("start ignored: engine was closed");
            return;
        }
        if self.status().is_active() {
            warn!("start ignored: session already {}", self.status());
            return;
        }
        info!(
            "starting {} session without countdown: {} cycles",
            self.config.visual_mode,
            self.phases.cycles()
        );
        self.summary = None;
        self.epoch = Some(now);
        self.last_frame = None;
        self.begin_run(now);
        self.request_tick();
    }

    /// Runs one frame. Call when the scheduled tick fires.
    pub fn tick(&mut self, now: Duration, surface: &mut dyn Surface) {
        self.pending = None;
        if !self.status().is_active() {
            trace!("tick ignored while {}", self.status());
            return;
        }
        if !surface.is_ready() {
            trace!("surface not ready, skipping frame");
            self.request_tick();
            return;
        }
        if self.metrics.is_none() {
            let (width, height) = surface.physical_size();
            self.apply_metrics(SurfaceMetrics::new(width, height, 1.0), surface);
        }

        if let Stage::Countdown {
            remaining,
            step_started,
        } = self.stage
        {
            if !self.advance_countdown(remaining, step_started, now) {
                self.draw(PhaseSample::resting(BreathPhase::Idle), now, surface);
                self.request_tick();
                return;
            }
        }

        let Stage::Running(mut run) = self.stage else {
            return;
        };
        let sample = self.phases.sample(run.phase, run.phase_started, now);
        self.last_sample = sample;
        self.draw(sample, now, surface);

        let events = self.phases.advance(&mut run, now);
        self.stage = Stage::Running(run);
        for event in events {
            match event {
                PhaseEvent::Entered { phase, cycle, at } => {
                    debug!("entered {phase} (cycle {cycle}) at {:.3}s", at.as_secs_f64());
                    self.callbacks.phase(phase, cycle);
                }
                PhaseEvent::Completed {
                    cycles,
                    duration_secs,
                    ..
                } => {
                    self.finish(RunSummary {
                        cycles,
                        duration_secs,
                    });
                    return;
                }
            }
        }
        self.request_tick();
    }

    /// Stops the session without notifying the host.
    pub fn stop(&mut self) {
        if self.status().is_active() {
            info!("session stopped while {}", self.status());
        }
        self.halt(Stage::Idle);
    }

    /// Dismisses the engine. Fires `on_close` once; no frames follow.
    pub fn close(&mut self) {
        self.halt(Stage::Idle);
        if !self.closed {
            self.closed = true;
            info!("engine closed");
            self.callbacks.close();
        }
    }

    /// Applies a new physical size and display scale. Existing visualization
    /// state is rebuilt for the new logical size.
    pub fn resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
        scale_factor: f32,
        surface: &mut dyn Surface,
    ) {
        let metrics = SurfaceMetrics::new(physical_width, physical_height, scale_factor);
        debug!(
            "resize to {physical_width}x{physical_height} at scale {}",
            metrics.scale_factor
        );
        self.apply_metrics(metrics, surface);
    }

    pub fn set_visual_mode(&mut self, mode: VisualMode) {
        if self.config.visual_mode == mode {
            return;
        }
        info!("visual mode {} -> {mode}", self.config.visual_mode);
        self.config.visual_mode = mode;
        self.rebuild_state();
    }

    pub fn set_complexity(&mut self, complexity: u32) -> Result<(), ConfigError> {
        self.apply_overrides(&BreathConfigOverrides {
            complexity: Some(complexity),
            ..Default::default()
        })
    }

    /// Merges a partial update. Timing and cycle changes are refused while a
    /// session is counting down or running.
    pub fn apply_overrides(&mut self, overrides: &BreathConfigOverrides) -> Result<(), ConfigError> {
        if overrides.touches_timing() && self.status().is_active() {
            warn!("rejected timing change while {}", self.status());
            return Err(ConfigError::TimingLockedWhileRunning);
        }
        let merged = overrides.apply(&self.config).map_err(|err| {
            warn!("rejected configuration update: {err}");
            err
        })?;
        let rebuild = merged.visual_mode != self.config.visual_mode
            || merged.complexity != self.config.complexity;
        self.style = RenderStyle::from_config(&merged);
        self.phases = PhaseScheduler::new(merged.timings(), merged.cycles);
        self.config = merged;
        if rebuild {
            self.rebuild_state();
        }
        Ok(())
    }

    /// Returns `true` once the countdown has finished and the run has begun.
    fn advance_countdown(&mut self, mut remaining: u32, mut step_started: Duration, now: Duration) -> bool {
        while now.saturating_sub(step_started) >= COUNTDOWN_STEP {
            step_started += COUNTDOWN_STEP;
            remaining -= 1;
            if remaining == 0 {
                self.begin_run(step_started);
                return true;
            }
            debug!("countdown {remaining}");
            self.callbacks.countdown(remaining);
        }
        self.stage = Stage::Countdown {
            remaining,
            step_started,
        };
        false
    }

    fn begin_run(&mut self, at: Duration) {
        if self.state.is_none() {
            self.rebuild_state();
        }
        let run = RunState::begin(at);
        self.stage = Stage::Running(run);
        info!("session running at {:.3}s", at.as_secs_f64());
        self.callbacks.phase(run.phase, run.current_cycle);
    }

    fn finish(&mut self, summary: RunSummary) {
        info!(
            "session complete: {} cycles in {}s",
            summary.cycles, summary.duration_secs
        );
        self.summary = Some(summary);
        self.last_sample = PhaseSample::resting(BreathPhase::Complete);
        self.halt(Stage::Complete);
        self.callbacks.phase(BreathPhase::Complete, summary.cycles);
        self.callbacks.complete(summary.duration_secs);
    }

    /// Cancels the outstanding tick and leaves the run in `stage`.
    fn halt(&mut self, stage: Stage) {
        if let Some(handle) = self.pending.take() {
            self.ticks.cancel(handle);
        }
        self.stage = stage;
        self.last_frame = None;
    }

    fn request_tick(&mut self) {
        self.pending = Some(self.ticks.schedule_next_tick());
    }

    fn apply_metrics(&mut self, metrics: SurfaceMetrics, surface: &mut dyn Surface) {
        surface.set_scale(metrics.scale_factor);
        let changed = self.metrics.map(|m| m.logical_size()) != Some(metrics.logical_size());
        self.metrics = Some(metrics);
        if changed && self.state.is_some() {
            self.rebuild_state();
        }
    }

    fn rebuild_state(&mut self) {
        let Some(size) = self.logical_size() else {
            // Built on the first frame, once the surface size is known.
            self.state = None;
            return;
        };
        self.state = Some(initialize(self.config.visual_mode, self.config.complexity, size));
    }

    fn draw(&mut self, sample: PhaseSample, now: Duration, surface: &mut dyn Surface) {
        let Some(size) = self.logical_size() else {
            return;
        };
        let mode = self.config.visual_mode;
        if !self.state.as_ref().is_some_and(|s| s.matches(mode)) {
            self.rebuild_state();
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let dt = self
            .last_frame
            .map_or(FIRST_FRAME_DT, |last| now.saturating_sub(last).as_secs_f32());
        let time = now.saturating_sub(self.epoch.unwrap_or(now)).as_secs_f32();
        self.last_frame = Some(now);

        let frame = FrameContext::new(&sample, time, dt, size, &self.style);
        renderer_for(mode).update_and_draw(&frame, state, surface);
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("status", &self.status())
            .field("phase", &self.phase())
            .field("visual_mode", &self.config.visual_mode)
            .field("pending", &self.pending)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breathwork_platform::{ManualTickScheduler, RecordingSurface};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine(config: BreathConfig) -> (Engine, ManualTickScheduler) {
        let ticks = ManualTickScheduler::new();
        let engine = Engine::new(config, Box::new(ticks.clone()), SessionCallbacks::new())
            .expect("valid config");
        (engine, ticks)
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn rejects_invalid_config() {
        let config = BreathConfig {
            cycles: 0,
            ..Default::default()
        };
        let result = Engine::new(config, Box::new(ManualTickScheduler::new()), SessionCallbacks::new());
        assert!(matches!(result, Err(ConfigError::InvalidCycles(0))));
    }

    #[test]
    fn rejects_phase_longer_than_a_day() {
        let config = BreathConfig {
            inhale_time: 1e20,
            ..Default::default()
        };
        let result = Engine::new(config, Box::new(ManualTickScheduler::new()), SessionCallbacks::new());
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange {
                field: "inhaleTime",
                ..
            })
        ));

        let (mut engine, _ticks) = engine(BreathConfig::default());
        let overrides = BreathConfigOverrides {
            exhale_time: Some(1e20),
            ..Default::default()
        };
        assert!(engine.apply_overrides(&overrides).is_err());
        assert_eq!(engine.config().exhale_time, BreathConfig::default().exhale_time);
    }

    #[test]
    fn countdown_steps_once_per_second() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let ticks = ManualTickScheduler::new();
        let mut engine = Engine::new(
            BreathConfig::default(),
            Box::new(ticks.clone()),
            SessionCallbacks::new().on_countdown(move |n| log.borrow_mut().push(n)),
        )
        .expect("valid config");
        let mut surface = RecordingSurface::new(200, 200);

        engine.start(secs(0.0));
        assert_eq!(engine.snapshot().countdown, Some(3));
        engine.tick(secs(1.5), &mut surface);
        assert_eq!(engine.snapshot().countdown, Some(2));
        engine.tick(secs(2.0), &mut surface);
        assert_eq!(*seen.borrow(), vec![3, 2, 1]);
        engine.tick(secs(3.0), &mut surface);
        assert_eq!(engine.status(), EngineStatus::Running);
        assert_eq!(engine.phase(), BreathPhase::Inhale);
        assert_eq!(engine.snapshot().cycle, 1);
    }

    #[test]
    fn idle_ticks_schedule_nothing() {
        let (mut engine, ticks) = engine(BreathConfig::default());
        let mut surface = RecordingSurface::new(200, 200);
        engine.tick(secs(1.0), &mut surface);
        assert_eq!(ticks.scheduled_count(), 0);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn timing_is_locked_while_running() {
        let (mut engine, _) = engine(BreathConfig::default());
        engine.start_immediately(secs(0.0));
        let err = engine
            .apply_overrides(&BreathConfigOverrides {
                inhale_time: Some(6.0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::TimingLockedWhileRunning));

        engine
            .apply_overrides(&BreathConfigOverrides {
                glow_intensity: Some(10.0),
                ..Default::default()
            })
            .expect("style changes are allowed");
        assert_eq!(engine.config().glow_intensity, 10.0);

        engine.stop();
        engine
            .apply_overrides(&BreathConfigOverrides {
                inhale_time: Some(6.0),
                ..Default::default()
            })
            .expect("timing can change once stopped");
        assert_eq!(engine.config().inhale_time, 6.0);
    }

    #[test]
    fn invalid_complexity_is_rejected() {
        let (mut engine, _) = engine(BreathConfig::default());
        assert!(matches!(
            engine.set_complexity(5),
            Err(ConfigError::OutOfRange { field: "complexity", .. })
        ));
        assert_eq!(engine.config().complexity, 50);
    }

    #[test]
    fn second_start_is_ignored() {
        let (mut engine, ticks) = engine(BreathConfig::default());
        engine.start(secs(0.0));
        engine.start(secs(0.5));
        assert_eq!(ticks.scheduled_count(), 1);
    }
}
