use serde::{Deserialize, Serialize};

use crate::util::round2;

/// Durations a session can be configured with, in seconds.
pub const ALLOWED_DURATIONS: [u32; 4] = [5, 10, 15, 30];

pub const DEFAULT_DURATION_SECS: u32 = 10;

pub fn is_allowed_duration(secs: u32) -> bool {
    ALLOWED_DURATIONS.contains(&secs)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
    Ended,
}

/// Live counters of the current run.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub click_count: u32,
    pub duration_secs: u32,
    pub remaining_secs: u32,
    pub status: SessionStatus,
}

impl Session {
    pub fn idle(duration_secs: u32) -> Self {
        Self {
            click_count: 0,
            duration_secs,
            remaining_secs: duration_secs,
            status: SessionStatus::Idle,
        }
    }

    /// Fraction of the run that has elapsed, 0.0 ..= 1.0.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / self.duration_secs as f64)
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::idle(DEFAULT_DURATION_SECS)
    }
}

/// Outcome of a session that ran to expiry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionResult {
    pub clicks: u32,
    pub duration_secs: u32,
    pub cps: f64,
}

impl SessionResult {
    pub fn new(clicks: u32, duration_secs: u32) -> Self {
        Self {
            clicks,
            duration_secs,
            cps: cps(clicks, duration_secs),
        }
    }
}

/// Clicks per second over the full duration, rounded to two decimals.
pub fn cps(clicks: u32, duration_secs: u32) -> f64 {
    if duration_secs == 0 {
        return 0.0;
    }
    round2(clicks as f64 / duration_secs as f64)
}
