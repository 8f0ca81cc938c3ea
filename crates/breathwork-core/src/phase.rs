//! The breath state machine.
//!
//! Phase timing is pure: [`PhaseScheduler::sample`] maps a phase start and the
//! current time to progress and intensity, and [`PhaseScheduler::advance`]
//! applies every rollover the elapsed time covers. Rollovers land on the exact
//! phase boundary (`phase_started + duration`), never on the observed tick
//! time, so late frames do not accumulate drift.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::ease_in_out_sine;

/// Durations at or below zero are treated as this long to keep progress finite.
pub const MIN_PHASE_DURATION: Duration = Duration::from_millis(1);

/// Longest a single phase may last. Configuration rejects anything above it
/// and [`PhaseTimings::duration`] saturates here.
pub const MAX_PHASE_DURATION: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BreathPhase {
    #[default]
    Idle,
    Inhale,
    HoldFull,
    Exhale,
    HoldEmpty,
    Complete,
}

impl BreathPhase {
    /// One of the four phases of the breathing cycle.
    pub fn is_breathing(self) -> bool {
        matches!(
            self,
            BreathPhase::Inhale | BreathPhase::HoldFull | BreathPhase::Exhale | BreathPhase::HoldEmpty
        )
    }

    pub fn is_hold(self) -> bool {
        matches!(self, BreathPhase::HoldFull | BreathPhase::HoldEmpty)
    }

    /// Prompt shown to the user while the phase is active.
    pub fn instruction(self) -> &'static str {
        match self {
            BreathPhase::Idle => "Get ready",
            BreathPhase::Inhale => "Breathe in",
            BreathPhase::HoldFull | BreathPhase::HoldEmpty => "Hold",
            BreathPhase::Exhale => "Breathe out",
            BreathPhase::Complete => "Well done",
        }
    }
}

impl fmt::Display for BreathPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BreathPhase::Idle => "idle",
            BreathPhase::Inhale => "inhale",
            BreathPhase::HoldFull => "holdFull",
            BreathPhase::Exhale => "exhale",
            BreathPhase::HoldEmpty => "holdEmpty",
            BreathPhase::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Phase lengths in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    pub inhale: f64,
    pub hold_full: f64,
    pub exhale: f64,
    pub hold_empty: f64,
}

impl PhaseTimings {
    pub fn seconds(&self, phase: BreathPhase) -> f64 {
        match phase {
            BreathPhase::Inhale => self.inhale,
            BreathPhase::HoldFull => self.hold_full,
            BreathPhase::Exhale => self.exhale,
            BreathPhase::HoldEmpty => self.hold_empty,
            BreathPhase::Idle | BreathPhase::Complete => 0.0,
        }
    }

    /// Whether the phase is part of the cycle at all (holds of zero are skipped).
    pub fn is_visited(&self, phase: BreathPhase) -> bool {
        match phase {
            BreathPhase::Inhale | BreathPhase::Exhale => true,
            BreathPhase::HoldFull | BreathPhase::HoldEmpty => self.seconds(phase) > 0.0,
            BreathPhase::Idle | BreathPhase::Complete => false,
        }
    }

    pub fn duration(&self, phase: BreathPhase) -> Duration {
        let seconds = self.seconds(phase);
        if seconds.is_finite() && seconds > 0.0 {
            Duration::try_from_secs_f64(seconds)
                .unwrap_or(MAX_PHASE_DURATION)
                .clamp(MIN_PHASE_DURATION, MAX_PHASE_DURATION)
        } else {
            MIN_PHASE_DURATION
        }
    }

    /// Length of one full cycle over the visited phases.
    pub fn cycle_duration(&self) -> Duration {
        CYCLE_ORDER
            .into_iter()
            .filter(|phase| self.is_visited(*phase))
            .map(|phase| self.duration(phase))
            .sum()
    }
}

const CYCLE_ORDER: [BreathPhase; 4] = [
    BreathPhase::Inhale,
    BreathPhase::HoldFull,
    BreathPhase::Exhale,
    BreathPhase::HoldEmpty,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: BreathPhase,
    /// Entering `to` starts a new cycle.
    pub completes_cycle: bool,
}

/// Intensity ("how full the lungs are") for a phase at `progress`.
pub fn intensity(phase: BreathPhase, progress: f32) -> f32 {
    match phase {
        BreathPhase::Inhale => ease_in_out_sine(progress),
        BreathPhase::HoldFull => 1.0,
        BreathPhase::Exhale => 1.0 - ease_in_out_sine(progress),
        BreathPhase::HoldEmpty | BreathPhase::Idle | BreathPhase::Complete => 0.0,
    }
}

/// Point-in-time reading of the active phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSample {
    pub phase: BreathPhase,
    pub progress: f32,
    pub intensity: f32,
    /// Time-weighted position within the whole cycle, in [0, 1].
    pub cycle_position: f32,
    pub elapsed: Duration,
}

impl PhaseSample {
    pub fn resting(phase: BreathPhase) -> Self {
        Self {
            phase,
            progress: 0.0,
            intensity: intensity(phase, 0.0),
            cycle_position: 0.0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_breathing() && self.progress >= 1.0
    }
}

/// Mutable run bookkeeping for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub phase: BreathPhase,
    /// 1-based; exceeds the configured count exactly once, at completion.
    pub current_cycle: u32,
    pub session_started: Duration,
    pub phase_started: Duration,
}

impl RunState {
    pub fn begin(now: Duration) -> Self {
        Self {
            phase: BreathPhase::Inhale,
            current_cycle: 1,
            session_started: now,
            phase_started: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Entered {
        phase: BreathPhase,
        cycle: u32,
        at: Duration,
    },
    Completed {
        cycles: u32,
        duration_secs: u64,
        at: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseScheduler {
    timings: PhaseTimings,
    cycles: u32,
}

impl PhaseScheduler {
    pub fn new(timings: PhaseTimings, cycles: u32) -> Self {
        Self {
            timings,
            cycles: cycles.max(1),
        }
    }

    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Next phase after `phase`, or `None` outside the breathing cycle.
    pub fn transition(&self, phase: BreathPhase) -> Option<Transition> {
        let (to, completes_cycle) = match phase {
            BreathPhase::Inhale if self.timings.is_visited(BreathPhase::HoldFull) => {
                (BreathPhase::HoldFull, false)
            }
            BreathPhase::Inhale => (BreathPhase::Exhale, false),
            BreathPhase::HoldFull => (BreathPhase::Exhale, false),
            BreathPhase::Exhale if self.timings.is_visited(BreathPhase::HoldEmpty) => {
                (BreathPhase::HoldEmpty, false)
            }
            BreathPhase::Exhale => (BreathPhase::Inhale, true),
            BreathPhase::HoldEmpty => (BreathPhase::Inhale, true),
            BreathPhase::Idle | BreathPhase::Complete => return None,
        };
        Some(Transition {
            to,
            completes_cycle,
        })
    }

    pub fn progress(&self, phase: BreathPhase, elapsed: Duration) -> f32 {
        if !phase.is_breathing() {
            return 0.0;
        }
        let duration = self.timings.duration(phase);
        (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    pub fn cycle_position(&self, phase: BreathPhase, progress: f32) -> f32 {
        if !phase.is_breathing() {
            return 0.0;
        }
        let total = self.timings.cycle_duration().as_secs_f64();
        if total <= 0.0 {
            return 0.0;
        }
        let before: f64 = CYCLE_ORDER
            .into_iter()
            .take_while(|p| *p != phase)
            .filter(|p| self.timings.is_visited(*p))
            .map(|p| self.timings.duration(p).as_secs_f64())
            .sum();
        let within = self.timings.duration(phase).as_secs_f64() * progress.clamp(0.0, 1.0) as f64;
        ((before + within) / total).clamp(0.0, 1.0) as f32
    }

    pub fn sample(&self, phase: BreathPhase, phase_started: Duration, now: Duration) -> PhaseSample {
        let elapsed = now.saturating_sub(phase_started);
        let progress = self.progress(phase, elapsed);
        PhaseSample {
            phase,
            progress,
            intensity: intensity(phase, progress),
            cycle_position: self.cycle_position(phase, progress),
            elapsed,
        }
    }

    /// Applies every rollover covered by `now`, in order.
    pub fn advance(&self, run: &mut RunState, now: Duration) -> Vec<PhaseEvent> {
        let mut events = Vec::new();
        while run.phase.is_breathing() {
            let duration = self.timings.duration(run.phase);
            if now.saturating_sub(run.phase_started) < duration {
                break;
            }
            let Some(transition) = self.transition(run.phase) else {
                break;
            };
            let boundary = run.phase_started + duration;
            run.phase_started = boundary;

            if transition.completes_cycle {
                run.current_cycle += 1;
                if run.current_cycle > self.cycles {
                    run.phase = BreathPhase::Complete;
                    let elapsed = boundary.saturating_sub(run.session_started);
                    events.push(PhaseEvent::Completed {
                        cycles: self.cycles,
                        duration_secs: elapsed.as_secs_f64().round() as u64,
                        at: boundary,
                    });
                    break;
                }
            }

            run.phase = transition.to;
            events.push(PhaseEvent::Entered {
                phase: transition.to,
                cycle: run.current_cycle,
                at: boundary,
            });
        }
        events
    }
}
