//! Cancellable periodic tick schedules.
//!
//! The session controller owns exactly one schedule. Arming it starts a new
//! period, cancelling drops any ticks that were pending, and the event loop
//! calls [`TickSchedule::take_due`] to learn how many ticks have elapsed since
//! it last asked. No schedule spawns threads.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub const ONE_SECOND: Duration = Duration::from_secs(1);

pub trait TickSchedule {
    /// Start (or restart) the periodic schedule. Pending ticks are discarded.
    fn arm(&mut self);

    /// Stop the schedule. Pending ticks are discarded.
    fn cancel(&mut self);

    fn is_armed(&self) -> bool;

    /// Number of ticks that fell due since the previous call.
    fn take_due(&mut self) -> u32;
}

/// Wall-clock schedule driven by `Instant`.
#[derive(Debug, Clone)]
pub struct IntervalSchedule {
    period: Duration,
    next_due: Option<Instant>,
}

impl IntervalSchedule {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn every_second() -> Self {
        Self::new(ONE_SECOND)
    }

    pub fn arm_at(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    /// Deadlines advance by whole periods so late polls do not drift.
    pub fn take_due_at(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next_due else {
            return 0;
        };

        let mut due = 0;
        while next <= now {
            due += 1;
            next += self.period;
        }
        self.next_due = Some(next);
        due
    }
}

impl Default for IntervalSchedule {
    fn default() -> Self {
        Self::every_second()
    }
}

impl TickSchedule for IntervalSchedule {
    fn arm(&mut self) {
        self.arm_at(Instant::now());
    }

    fn cancel(&mut self) {
        self.next_due = None;
    }

    fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    fn take_due(&mut self) -> u32 {
        self.take_due_at(Instant::now())
    }
}

#[derive(Debug, Default)]
struct ManualState {
    armed: bool,
    pending: u32,
    arm_count: u32,
}

/// Schedule advanced by hand; clones share state so a test can keep a handle
/// after giving one to the controller.
#[derive(Debug, Clone, Default)]
pub struct ManualSchedule {
    state: Rc<RefCell<ManualState>>,
}

impl ManualSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `ticks` seconds pass. Has no effect while the schedule is not armed.
    pub fn advance(&self, ticks: u32) {
        let mut state = self.state.borrow_mut();
        if state.armed {
            state.pending += ticks;
        }
    }

    /// How many times the schedule has been armed.
    pub fn arm_count(&self) -> u32 {
        self.state.borrow().arm_count
    }
}

impl TickSchedule for ManualSchedule {
    fn arm(&mut self) {
        let mut state = self.state.borrow_mut();
        state.armed = true;
        state.pending = 0;
        state.arm_count += 1;
    }

    fn cancel(&mut self) {
        let mut state = self.state.borrow_mut();
        state.armed = false;
        state.pending = 0;
    }

    fn is_armed(&self) -> bool {
        self.state.borrow().armed
    }

    fn take_due(&mut self) -> u32 {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }
}
