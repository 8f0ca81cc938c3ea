//! Session scenarios driven with a manual tick scheduler and synthetic time.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use breathwork_core::{
    BreathConfig, BreathConfigOverrides, BreathPhase, Engine, EngineStatus, SessionCallbacks,
    VisualMode,
};
use breathwork_platform::{ManualTickScheduler, RecordingSurface};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Countdown(u32),
    Phase(BreathPhase, u32),
    Complete(u64),
    Close,
}

struct Session {
    engine: Engine,
    ticks: ManualTickScheduler,
    surface: RecordingSurface,
    events: Rc<RefCell<Vec<Event>>>,
    now: Duration,
    /// Phase observed after each tick.
    timeline: Vec<(Duration, BreathPhase)>,
}

impl Session {
    fn new(config: BreathConfig) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c, d) = (events.clone(), events.clone(), events.clone(), events.clone());
        let callbacks = SessionCallbacks::new()
            .on_countdown(move |n| a.borrow_mut().push(Event::Countdown(n)))
            .on_phase(move |phase, cycle| b.borrow_mut().push(Event::Phase(phase, cycle)))
            .on_complete(move |secs| c.borrow_mut().push(Event::Complete(secs)))
            .on_close(move || d.borrow_mut().push(Event::Close));
        let ticks = ManualTickScheduler::new();
        let engine = Engine::new(config, Box::new(ticks.clone()), callbacks).expect("valid config");
        Self {
            engine,
            ticks,
            surface: RecordingSurface::new(400, 300),
            events,
            now: Duration::ZERO,
            timeline: Vec::new(),
        }
    }

    /// Advances the clock in `step_ms` increments, firing requested ticks.
    fn pump(&mut self, until_ms: u64, step_ms: u64) {
        let until = Duration::from_millis(until_ms);
        while self.now < until {
            self.now += Duration::from_millis(step_ms);
            if self.ticks.take_pending().is_some() {
                self.engine.tick(self.now, &mut self.surface);
                self.timeline.push((self.now, self.engine.phase()));
                self.surface.take_commands();
            }
        }
    }

    fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    fn completions(&self) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Complete(secs) => Some(secs),
                _ => None,
            })
            .collect()
    }

    fn phase_entries(&self) -> Vec<(BreathPhase, u32)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Phase(phase, cycle) => Some((phase, cycle)),
                _ => None,
            })
            .collect()
    }
}

fn config(inhale: f64, hold_full: f64, exhale: f64, hold_empty: f64, cycles: u32) -> BreathConfig {
    BreathConfig {
        inhale_time: inhale,
        hold_full_time: hold_full,
        exhale_time: exhale,
        hold_empty_time: hold_empty,
        cycles,
        ..Default::default()
    }
}

// ── Timing scenarios ──────────────────────────────────────────────────

#[test]
fn box_breath_single_cycle_follows_the_clock() {
    let mut session = Session::new(config(4.0, 4.0, 4.0, 4.0, 1));
    session.engine.start_immediately(Duration::ZERO);
    session.pump(20_000, 100);

    for &(at, phase) in &session.timeline {
        let expected = match at.as_millis() {
            0..=3_999 => BreathPhase::Inhale,
            4_000..=7_999 => BreathPhase::HoldFull,
            8_000..=11_999 => BreathPhase::Exhale,
            12_000..=15_999 => BreathPhase::HoldEmpty,
            _ => BreathPhase::Complete,
        };
        assert_eq!(phase, expected, "phase at {at:?}");
    }
    assert_eq!(session.timeline.last().map(|(at, _)| at.as_millis()), Some(16_000));
    assert_eq!(session.completions(), vec![16]);
    assert_eq!(session.engine.status(), EngineStatus::Complete);
    assert_eq!(
        session.engine.last_summary().map(|s| (s.cycles, s.duration_secs)),
        Some((1, 16))
    );
}

#[test]
fn zero_holds_alternate_inhale_and_exhale() {
    let mut session = Session::new(config(4.0, 0.0, 4.0, 0.0, 2));
    session.engine.start_immediately(Duration::ZERO);
    session.pump(20_000, 250);

    assert_eq!(
        session.phase_entries(),
        vec![
            (BreathPhase::Inhale, 1),
            (BreathPhase::Exhale, 1),
            (BreathPhase::Inhale, 2),
            (BreathPhase::Exhale, 2),
            (BreathPhase::Complete, 2),
        ]
    );
    assert_eq!(session.completions(), vec![16]);
}

#[test]
fn four_cycles_visit_each_phase_four_times() {
    let mut session = Session::new(config(2.0, 1.0, 2.0, 1.0, 4));
    session.engine.start_immediately(Duration::ZERO);
    session.pump(30_000, 50);

    let entries = session.phase_entries();
    for phase in [
        BreathPhase::Inhale,
        BreathPhase::HoldFull,
        BreathPhase::Exhale,
        BreathPhase::HoldEmpty,
    ] {
        assert_eq!(entries.iter().filter(|(p, _)| *p == phase).count(), 4, "{phase}");
    }
    assert_eq!(entries.last(), Some(&(BreathPhase::Complete, 4)));
    assert_eq!(session.completions(), vec![24]);
}

#[test]
fn late_frame_catches_up_without_drift() {
    let mut session = Session::new(config(4.0, 4.0, 4.0, 4.0, 4));
    session.engine.start_immediately(Duration::ZERO);
    session.pump(100, 100);
    // One very late frame covers the rest of the session.
    session.now = Duration::from_secs(100);
    session.engine.tick(session.now, &mut session.surface);

    assert_eq!(session.phase_entries().len(), 16 + 1);
    assert_eq!(session.completions(), vec![64]);
}

#[test]
fn no_ticks_are_requested_after_completion() {
    let mut session = Session::new(config(1.0, 0.0, 1.0, 0.0, 1));
    session.engine.start_immediately(Duration::ZERO);
    session.pump(3_000, 100);
    let scheduled = session.ticks.scheduled_count();

    assert_eq!(session.ticks.pending(), None);
    session.engine.tick(Duration::from_secs(5), &mut session.surface);
    assert_eq!(session.ticks.scheduled_count(), scheduled);
    assert!(session.surface.commands().is_empty());
    assert_eq!(session.completions(), vec![2]);
}

// ── Countdown ─────────────────────────────────────────────────────────

#[test]
fn countdown_precedes_the_first_inhale() {
    let mut session = Session::new(config(4.0, 4.0, 4.0, 4.0, 1));
    session.engine.start(Duration::ZERO);
    session.pump(25_000, 100);

    let events = session.events();
    assert_eq!(
        &events[..4],
        &[
            Event::Countdown(3),
            Event::Countdown(2),
            Event::Countdown(1),
            Event::Phase(BreathPhase::Inhale, 1),
        ]
    );
    assert!(session
        .timeline
        .iter()
        .filter(|(at, _)| at.as_millis() < 3_000)
        .all(|(_, phase)| *phase == BreathPhase::Idle));
    // Session length excludes the countdown.
    assert_eq!(session.completions(), vec![16]);
}

#[test]
fn closing_during_countdown_cancels_the_session() {
    let mut session = Session::new(config(4.0, 4.0, 4.0, 4.0, 1));
    session.engine.start(Duration::ZERO);
    session.pump(1_500, 100);
    assert_eq!(session.engine.status(), EngineStatus::Countdown);

    session.engine.close();
    assert_eq!(session.engine.status(), EngineStatus::Idle);
    assert_eq!(session.ticks.cancelled_count(), 1);
    assert_eq!(session.ticks.pending(), None);

    session.engine.tick(Duration::from_secs(5), &mut session.surface);
    session.engine.close();
    session.engine.start(Duration::from_secs(6));

    assert!(session.surface.commands().is_empty());
    assert!(session.phase_entries().is_empty());
    assert_eq!(
        session.events(),
        vec![Event::Countdown(3), Event::Countdown(2), Event::Close]
    );
}

#[test]
fn stop_mid_session_resets_to_idle() {
    let mut session = Session::new(config(4.0, 4.0, 4.0, 4.0, 2));
    session.engine.start_immediately(Duration::ZERO);
    session.pump(5_000, 100);
    assert_eq!(session.engine.phase(), BreathPhase::HoldFull);

    session.engine.stop();
    assert_eq!(session.engine.status(), EngineStatus::Idle);
    assert_eq!(session.engine.snapshot().cycle, 0);
    assert!(session.completions().is_empty());
    assert!(!session.events().contains(&Event::Close));
}

// ── Surface handling ──────────────────────────────────────────────────

#[test]
fn not_ready_surface_draws_nothing_and_defers_rollover() {
    let mut session = Session::new(config(4.0, 4.0, 4.0, 4.0, 1));
    session.surface.set_ready(false);
    session.engine.start_immediately(Duration::ZERO);
    session.pump(6_000, 100);

    assert!(session.surface.commands().is_empty());
    assert_eq!(session.engine.phase(), BreathPhase::Inhale);
    assert!(session.ticks.pending().is_some(), "keeps requesting frames");

    session.surface.set_ready(true);
    session.pump(6_100, 100);
    assert_eq!(session.engine.phase(), BreathPhase::HoldFull);
}

#[test]
fn resize_mid_session_rebuilds_state() {
    let mut session = Session::new(config(2.0, 2.0, 2.0, 2.0, 2));
    session.engine.start_immediately(Duration::ZERO);
    session.pump(3_000, 100);
    assert_eq!(session.engine.logical_size(), Some(glam::Vec2::new(400.0, 300.0)));

    session.surface.resize(1600, 1200);
    session.engine.resize(1600, 1200, 2.0, &mut session.surface);
    assert_eq!(session.surface.scale(), 2.0);
    assert_eq!(session.engine.logical_size(), Some(glam::Vec2::new(800.0, 600.0)));
    let state = session.engine.visualization().expect("state survives resize");
    assert!(!state.is_empty());

    session.pump(20_000, 100);
    assert_eq!(session.completions(), vec![16]);
}

// ── Modes and overrides ───────────────────────────────────────────────

#[test]
fn every_mode_initializes_at_every_complexity() {
    let mut session = Session::new(BreathConfig::default());
    session.engine.start_immediately(Duration::ZERO);
    session.pump(100, 100);
    session.engine.stop();

    for complexity in [10, 50, 100] {
        session.engine.set_complexity(complexity).expect("in range");
        for mode in VisualMode::ALL {
            session.engine.set_visual_mode(mode);
            let state = session.engine.visualization().expect("rebuilt while stopped");
            assert!(state.matches(mode), "{mode} at {complexity}");
            assert!(!state.is_empty(), "{mode} at {complexity}");
        }
    }
}

#[test]
fn every_mode_renders_a_full_cycle() {
    for mode in VisualMode::ALL {
        let mut session = Session::new(BreathConfig {
            visual_mode: mode,
            complexity: 10,
            ..config(1.0, 1.0, 1.0, 1.0, 1)
        });
        session.engine.start_immediately(Duration::ZERO);
        let mut drew = 0;
        while session.engine.status().is_active() && session.now < Duration::from_secs(6) {
            session.now += Duration::from_millis(50);
            if session.ticks.take_pending().is_some() {
                session.engine.tick(session.now, &mut session.surface);
                drew += session.surface.draw_count();
                session.surface.take_commands();
            }
        }
        assert!(drew > 0, "{mode} drew nothing");
        assert_eq!(session.completions(), vec![4], "{mode}");
    }
}

#[test]
fn style_overrides_apply_mid_session() {
    let mut session = Session::new(config(4.0, 4.0, 4.0, 4.0, 1));
    session.engine.start_immediately(Duration::ZERO);
    session.pump(1_000, 100);

    session
        .engine
        .apply_overrides(&BreathConfigOverrides {
            visual_mode: Some(VisualMode::Crystal),
            complexity: Some(80),
            ..Default::default()
        })
        .expect("style changes allowed");
    assert!(session
        .engine
        .visualization()
        .is_some_and(|state| state.matches(VisualMode::Crystal)));
    assert!(session
        .engine
        .apply_overrides(&BreathConfigOverrides {
            cycles: Some(3),
            ..Default::default()
        })
        .is_err());

    session.pump(20_000, 100);
    assert_eq!(session.completions(), vec![16]);
}

#[test]
fn snapshot_tracks_the_active_phase() {
    let mut session = Session::new(config(4.0, 4.0, 4.0, 4.0, 1));
    session.engine.start_immediately(Duration::ZERO);
    session.pump(2_000, 100);

    let snapshot = session.engine.snapshot();
    assert_eq!(snapshot.status, EngineStatus::Running);
    assert_eq!(snapshot.phase, BreathPhase::Inhale);
    assert_eq!(snapshot.cycle, 1);
    assert!((snapshot.progress - 0.5).abs() < 1e-6);
    assert!((snapshot.intensity - 0.5).abs() < 1e-4);
}
