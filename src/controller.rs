//! Session controller: the Idle -> Running -> Ended state machine.
//!
//! ```text
//! Idle --start--> Running --tick x duration--> Ended --start--> Running
//!   ^                |                           |
//!   +-----reset------+-----------reset-----------+
//! ```
//!
//! Every command returns the events it produced. Commands that are not valid
//! in the current state are ignored and return no events.

use crate::events::GameEvent;
use crate::schedule::{IntervalSchedule, TickSchedule};
use crate::session::{
    is_allowed_duration, Session, SessionResult, SessionStatus, DEFAULT_DURATION_SECS,
};
use crate::settings::IdleClickPolicy;

pub struct SessionController {
    session: Session,
    selected_duration: u32,
    idle_policy: IdleClickPolicy,
    schedule: Box<dyn TickSchedule>,
    last_result: Option<SessionResult>,
}

impl SessionController {
    pub fn new(schedule: Box<dyn TickSchedule>) -> Self {
        Self {
            session: Session::idle(DEFAULT_DURATION_SECS),
            selected_duration: DEFAULT_DURATION_SECS,
            idle_policy: IdleClickPolicy::default(),
            schedule,
            last_result: None,
        }
    }

    /// Unsupported durations fall back to the default.
    pub fn with_duration(mut self, secs: u32) -> Self {
        let secs = if is_allowed_duration(secs) {
            secs
        } else {
            tracing::warn!(secs, "unsupported duration, using default");
            DEFAULT_DURATION_SECS
        };
        self.selected_duration = secs;
        self.session = Session::idle(secs);
        self
    }

    pub fn with_idle_policy(mut self, policy: IdleClickPolicy) -> Self {
        self.idle_policy = policy;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn click_count(&self) -> u32 {
        self.session.click_count
    }

    pub fn remaining_secs(&self) -> u32 {
        self.session.remaining_secs
    }

    /// Duration the next `start` will use.
    pub fn selected_duration(&self) -> u32 {
        self.selected_duration
    }

    pub fn progress(&self) -> f64 {
        self.session.progress()
    }

    pub fn idle_policy(&self) -> IdleClickPolicy {
        self.idle_policy
    }

    pub fn last_result(&self) -> Option<SessionResult> {
        self.last_result
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<GameEvent> {
        if self.is_running() {
            tracing::debug!("start ignored, session already running");
            return vec![];
        }

        let duration = self.selected_duration;
        self.session = Session {
            click_count: 0,
            duration_secs: duration,
            remaining_secs: duration,
            status: SessionStatus::Running,
        };
        self.last_result = None;
        self.schedule.arm();
        tracing::info!(duration_secs = duration, "session started");

        vec![
            GameEvent::SessionStarted {
                duration_secs: duration,
            },
            GameEvent::TickUpdated {
                remaining_secs: duration,
                total_secs: duration,
            },
        ]
    }

    /// Count a click. Ticks already due are applied first, so a click that
    /// arrives after the deadline never lands in the expired run. Outside a
    /// run the idle policy decides whether the click starts a new session;
    /// the starting click itself is not counted.
    pub fn register_click(&mut self) -> Vec<GameEvent> {
        let mut events = self.pump();
        match (self.session.status, self.idle_policy) {
            (SessionStatus::Running, _) => {
                self.session.click_count += 1;
                events.push(GameEvent::ClickRegistered {
                    count: self.session.click_count,
                });
            }
            (_, IdleClickPolicy::Start) => events.extend(self.start()),
            (status, IdleClickPolicy::Ignore) => {
                tracing::debug!(%status, "click ignored outside a session");
            }
        }
        events
    }

    pub fn tick(&mut self) -> Vec<GameEvent> {
        if !self.is_running() {
            return vec![];
        }

        self.session.remaining_secs = self.session.remaining_secs.saturating_sub(1);
        let mut events = vec![GameEvent::TickUpdated {
            remaining_secs: self.session.remaining_secs,
            total_secs: self.session.duration_secs,
        }];

        if self.session.remaining_secs == 0 {
            events.push(self.finish());
        }
        events
    }

    /// Run every tick that fell due on the schedule since the last call.
    pub fn pump(&mut self) -> Vec<GameEvent> {
        let due = self.schedule.take_due();
        let mut events = Vec::new();
        for _ in 0..due {
            if !self.is_running() {
                break;
            }
            events.extend(self.tick());
        }
        events
    }

    /// Select the duration for the next run. Rejected while running or for
    /// durations outside the supported set.
    pub fn set_duration(&mut self, secs: u32) -> bool {
        if self.is_running() {
            tracing::debug!(secs, "duration change rejected while running");
            return false;
        }
        if !is_allowed_duration(secs) {
            tracing::debug!(secs, "unsupported duration rejected");
            return false;
        }

        self.selected_duration = secs;
        self.session.duration_secs = secs;
        self.session.remaining_secs = secs;
        true
    }

    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.schedule.cancel();
        self.session = Session::idle(self.selected_duration);
        self.last_result = None;
        tracing::debug!("session reset");
        vec![GameEvent::SessionReset {
            duration_secs: self.selected_duration,
        }]
    }

    fn finish(&mut self) -> GameEvent {
        self.schedule.cancel();
        self.session.status = SessionStatus::Ended;

        let result = SessionResult::new(self.session.click_count, self.session.duration_secs);
        self.last_result = Some(result);
        tracing::info!(clicks = result.clicks, cps = result.cps, "session ended");

        GameEvent::SessionEnded {
            clicks: result.clicks,
            cps: result.cps,
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(Box::new(IntervalSchedule::every_second()))
    }
}
