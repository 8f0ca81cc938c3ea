use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

/// Identifies one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Host frame scheduling (the equivalent of a display's per-frame callback).
pub trait TickScheduler {
    fn schedule_next_tick(&mut self) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    pending: Option<TickHandle>,
    scheduled: u64,
    cancelled: u64,
}

/// Scheduler whose ticks are pumped by the host itself. Clones share state, so
/// the host keeps one clone while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualTickScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<TickHandle> {
        self.state.borrow().pending
    }

    /// Consumes the pending request, returning it if one existed.
    pub fn take_pending(&self) -> Option<TickHandle> {
        self.state.borrow_mut().pending.take()
    }

    pub fn scheduled_count(&self) -> u64 {
        self.state.borrow().scheduled
    }

    pub fn cancelled_count(&self) -> u64 {
        self.state.borrow().cancelled
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule_next_tick(&mut self) -> TickHandle {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let handle = TickHandle(state.next_id);
        state.pending = Some(handle);
        state.scheduled += 1;
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        let mut state = self.state.borrow_mut();
        if state.pending == Some(handle) {
            state.pending = None;
            state.cancelled += 1;
        } else {
            trace!("ignoring cancel of stale tick {}", handle.0);
        }
    }
}
