//! Cosmetic collaborators: click ripples, the achievement banner, and the
//! terminal bell. They only react to events; nothing here can change the
//! session or the ledger.

use std::collections::VecDeque;
use std::io::Write;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::FeedbackError;
use crate::events::{EventSink, GameEvent};

const RIPPLE_PARTICLES: usize = 10;
const RIPPLE_SPEED: f64 = 14.0;
const BANNER_DURATION: Duration = Duration::from_secs(3);

/// One expanding dot of a click ripple.
#[derive(Debug, Clone)]
pub struct RippleParticle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
}

impl RippleParticle {
    fn new(x: f64, y: f64, angle: f64, rng: &mut impl Rng) -> Self {
        let speed = RIPPLE_SPEED * rng.gen_range(0.8..1.2);
        Self {
            x,
            y,
            // Terminal cells are roughly twice as tall as wide.
            vel_x: angle.cos() * speed,
            vel_y: angle.sin() * speed * 0.5,
            symbol: *['·', '•', '∘', '○', '*'].choose(rng).unwrap_or(&'·'),
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(0.35..0.5),
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_x *= 0.85;
        self.vel_y *= 0.85;
        self.age += dt;
        self.age < self.max_age
    }
}

/// Visual ripple spawned on every counted click.
#[derive(Debug, Default)]
pub struct ClickRipples {
    pub particles: Vec<RippleParticle>,
    enabled: bool,
    origin: (f64, f64),
}

impl ClickRipples {
    pub fn new(enabled: bool) -> Self {
        Self {
            particles: Vec::new(),
            enabled,
            origin: (0.0, 0.0),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.particles.clear();
        }
    }

    /// Where the next ripple appears, relative to the click area.
    pub fn set_origin(&mut self, x: f64, y: f64) {
        self.origin = (x, y);
    }

    pub fn spawn(&mut self) {
        let mut rng = rand::thread_rng();
        let (x, y) = self.origin;
        let step = std::f64::consts::TAU / RIPPLE_PARTICLES as f64;
        for i in 0..RIPPLE_PARTICLES {
            let angle = step * i as f64 + rng.gen_range(-0.2..0.2);
            self.particles.push(RippleParticle::new(x, y, angle, &mut rng));
        }
    }

    pub fn update(&mut self, dt: f64) {
        self.particles.retain_mut(|p| p.update(dt));
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty()
    }
}

impl EventSink for ClickRipples {
    fn name(&self) -> &'static str {
        "click-ripples"
    }

    fn handle(&mut self, event: &GameEvent) -> Result<(), FeedbackError> {
        match event {
            GameEvent::ClickRegistered { .. } if self.enabled => self.spawn(),
            GameEvent::SessionReset { .. } => self.particles.clear(),
            _ => {}
        }
        Ok(())
    }
}

/// Queue of achievement titles, each shown for a few seconds.
#[derive(Debug)]
pub struct AchievementBanner {
    enabled: bool,
    queue: VecDeque<&'static str>,
    shown_since: Option<Instant>,
    duration: Duration,
}

impl AchievementBanner {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            queue: VecDeque::new(),
            shown_since: None,
            duration: BANNER_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.queue.clear();
            self.shown_since = None;
        }
    }

    pub fn current(&self) -> Option<&'static str> {
        self.queue.front().copied()
    }

    /// Expire the front banner once it has been visible long enough.
    pub fn update(&mut self, now: Instant) {
        if self.queue.is_empty() {
            return;
        }
        let since = *self.shown_since.get_or_insert(now);
        if now.duration_since(since) >= self.duration {
            self.queue.pop_front();
            self.shown_since = if self.queue.is_empty() { None } else { Some(now) };
        }
    }
}

impl EventSink for AchievementBanner {
    fn name(&self) -> &'static str {
        "achievement-banner"
    }

    fn handle(&mut self, event: &GameEvent) -> Result<(), FeedbackError> {
        if let GameEvent::AchievementUnlocked { id } = event {
            if self.enabled {
                self.queue.push_back(id.title());
            }
        }
        Ok(())
    }
}

/// Audible click feedback via the terminal bell.
pub struct Bell {
    enabled: bool,
    out: Box<dyn Write>,
}

impl Bell {
    pub fn new(enabled: bool, out: Box<dyn Write>) -> Self {
        Self { enabled, out }
    }

    pub fn stdout(enabled: bool) -> Self {
        Self::new(enabled, Box::new(std::io::stdout()))
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl EventSink for Bell {
    fn name(&self) -> &'static str {
        "bell"
    }

    fn handle(&mut self, event: &GameEvent) -> Result<(), FeedbackError> {
        if let GameEvent::ClickRegistered { .. } = event {
            if self.enabled {
                self.out.write_all(b"\x07")?;
                self.out.flush()?;
            }
        }
        Ok(())
    }
}
