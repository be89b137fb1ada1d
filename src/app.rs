use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};

use crate::context::AppContext;
use crate::controller::SessionController;
use crate::events::{dispatch, EventSink, GameEvent};
use crate::feedback::{AchievementBanner, Bell, ClickRipples};
use crate::runtime::AppEvent;
use crate::schedule::TickSchedule;
use crate::session::{SessionStatus, ALLOWED_DURATIONS};
use crate::settings::{IdleClickPolicy, Toggle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Menu,
}

/// What the event loop should do after handling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Presentation-side state: the controller, the shared context, and the
/// cosmetic collaborators fed from their events.
pub struct App {
    pub controller: SessionController,
    pub context: AppContext,
    pub state: AppState,
    pub ripples: ClickRipples,
    pub banner: AchievementBanner,
    bell: Bell,
    last_frame: Option<Instant>,
}

impl App {
    pub fn new(
        context: AppContext,
        schedule: Box<dyn TickSchedule>,
        duration_secs: u32,
        bell: Bell,
    ) -> Self {
        let settings = context.settings().clone();
        let controller = SessionController::new(schedule)
            .with_duration(duration_secs)
            .with_idle_policy(settings.idle_click_policy);
        let mut bell = bell;
        bell.set_enabled(settings.sound_enabled);

        Self {
            controller,
            context,
            state: AppState::Playing,
            ripples: ClickRipples::new(settings.click_effects_enabled),
            banner: AchievementBanner::new(settings.achievements_enabled),
            bell,
            last_frame: None,
        }
    }

    /// Route controller events through the context (recording finished runs)
    /// and then out to the cosmetic collaborators.
    fn emit(&mut self, events: Vec<GameEvent>) -> Vec<GameEvent> {
        if events.is_empty() {
            return events;
        }
        let events = self.context.apply(events);
        let mut sinks: [&mut dyn EventSink; 3] =
            [&mut self.ripples, &mut self.banner, &mut self.bell];
        dispatch(&events, &mut sinks);
        events
    }

    pub fn start(&mut self) -> Vec<GameEvent> {
        let events = self.controller.start();
        self.emit(events)
    }

    pub fn click(&mut self) -> Vec<GameEvent> {
        let events = self.controller.register_click();
        self.emit(events)
    }

    /// Click at a position relative to the click area.
    pub fn click_at(&mut self, x: u16, y: u16) -> Vec<GameEvent> {
        self.ripples.set_origin(x as f64, y as f64);
        self.click()
    }

    /// Space starts a run when none is active and counts the press as the
    /// first click, unless idle clicks are configured to be ignored.
    pub fn press_space(&mut self) -> Vec<GameEvent> {
        if !self.context.settings().spacebar_enabled {
            return vec![];
        }

        // an expired run must end before deciding whether this press starts one
        let mut events = self.settle();
        if !self.controller.is_running() {
            if self.controller.idle_policy() == IdleClickPolicy::Ignore {
                return events;
            }
            events.extend(self.start());
        }
        events.extend(self.click());
        events
    }

    pub fn reset(&mut self) -> Vec<GameEvent> {
        let events = self.controller.reset();
        self.emit(events)
    }

    pub fn select_duration(&mut self, secs: u32) -> bool {
        self.controller.set_duration(secs)
    }

    /// Apply session ticks that fell due.
    fn settle(&mut self) -> Vec<GameEvent> {
        let events = self.controller.pump();
        self.emit(events)
    }

    /// Advance timers: due session ticks first, then cosmetic animation.
    pub fn on_tick(&mut self, now: Instant) -> Vec<GameEvent> {
        let events = self.settle();

        let dt = self
            .last_frame
            .map(|prev| now.saturating_duration_since(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        self.ripples.update(dt);
        self.banner.update(now);
        events
    }

    pub fn toggle(&mut self, toggle: Toggle) {
        let enabled = self.context.toggle(toggle);
        match toggle {
            Toggle::Sound => self.bell.set_enabled(enabled),
            Toggle::ClickEffects => self.ripples.set_enabled(enabled),
            Toggle::Achievements => self.banner.set_enabled(enabled),
            Toggle::Spacebar => {}
        }
    }

    pub fn cycle_theme(&mut self) {
        let next = self.context.settings().theme.next();
        self.context.set_theme(next);
    }

    pub fn toggle_menu(&mut self) {
        self.state = match self.state {
            AppState::Playing => AppState::Menu,
            AppState::Menu => AppState::Playing,
        };
    }

    pub fn status_text(&self) -> &'static str {
        match self.controller.status() {
            SessionStatus::Idle => "CLICK TO START",
            SessionStatus::Running => "CLICK!",
            SessionStatus::Ended => "TIME'S UP!",
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Playing => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                KeyCode::Char(' ') => {
                    self.press_space();
                }
                KeyCode::Enter => {
                    self.start();
                }
                KeyCode::Char('r') => {
                    self.reset();
                }
                KeyCode::Char('m') => self.toggle_menu(),
                KeyCode::Char(c @ '1'..='4') => {
                    let idx = c as usize - '1' as usize;
                    self.select_duration(ALLOWED_DURATIONS[idx]);
                }
                _ => {}
            },
            AppState::Menu => match key.code {
                KeyCode::Esc | KeyCode::Char('m') => self.toggle_menu(),
                KeyCode::Char('s') => self.toggle(Toggle::Sound),
                KeyCode::Char('k') => self.toggle(Toggle::Spacebar),
                KeyCode::Char('e') => self.toggle(Toggle::ClickEffects),
                KeyCode::Char('a') => self.toggle(Toggle::Achievements),
                KeyCode::Char('t') => self.cycle_theme(),
                _ => {}
            },
        }
        Flow::Continue
    }

    /// One pass of the event loop. The clock is settled before any input is
    /// routed, whatever the event is.
    pub fn handle_event(&mut self, event: AppEvent, click_area: Rect, now: Instant) -> Flow {
        self.on_tick(now);
        match event {
            AppEvent::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            AppEvent::Mouse(mouse) => self.handle_mouse(mouse, click_area),
            AppEvent::Key(_) | AppEvent::Resize | AppEvent::Tick => Flow::Continue,
        }
    }

    /// `click_area` is where the click target was last drawn.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, click_area: Rect) -> Flow {
        if self.state != AppState::Playing {
            return Flow::Continue;
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            if click_area.contains(Position::new(mouse.column, mouse.row)) {
                self.click_at(mouse.column - click_area.x, mouse.row - click_area.y);
            }
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::Achievement;
    use crate::schedule::ManualSchedule;
    use crate::store::MemoryStore;
    use assert_matches::assert_matches;

    fn app_with(duration: u32) -> (App, ManualSchedule) {
        let schedule = ManualSchedule::new();
        let context = AppContext::load(Box::new(MemoryStore::new()));
        let bell = Bell::new(false, Box::new(std::io::sink()));
        let app = App::new(context, Box::new(schedule.clone()), duration, bell);
        (app, schedule)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn space_starts_and_counts() {
        let (mut app, _) = app_with(10);
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.controller.status(), SessionStatus::Running);
        assert_eq!(app.controller.click_count(), 1);

        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.controller.click_count(), 2);
    }

    #[test]
    fn space_ignored_when_disabled() {
        let (mut app, _) = app_with(10);
        app.toggle(Toggle::Spacebar);
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.controller.status(), SessionStatus::Idle);
    }

    #[test]
    fn mouse_click_inside_area_counts() {
        let (mut app, _) = app_with(10);
        let area = Rect::new(10, 5, 20, 6);

        app.handle_mouse(left_click(12, 6), area);
        assert_eq!(app.controller.status(), SessionStatus::Running);
        assert_eq!(app.controller.click_count(), 0, "starting click is not counted");

        app.handle_mouse(left_click(12, 6), area);
        app.handle_mouse(left_click(0, 0), area);
        assert_eq!(app.controller.click_count(), 1);
        assert!(app.ripples.is_active());
    }

    #[test]
    fn full_run_records_score() {
        let (mut app, schedule) = app_with(5);
        app.start();
        for _ in 0..60 {
            app.click();
        }

        schedule.advance(5);
        let events = app.on_tick(Instant::now());

        assert_matches!(
            events.iter().find(|e| matches!(e, GameEvent::SessionEnded { .. })),
            Some(GameEvent::SessionEnded { clicks: 60, .. })
        );
        assert_eq!(app.context.ledger().best_score(), Some(12.0));
        assert!(app.context.achievements().contains(Achievement::SpeedDemon));
        assert_eq!(app.banner.current(), Some(Achievement::SpeedDemon.title()));
        assert_eq!(app.status_text(), "TIME'S UP!");
    }

    #[test]
    fn reset_mid_run_records_nothing() {
        let (mut app, schedule) = app_with(5);
        app.start();
        app.click();
        schedule.advance(2);
        app.on_tick(Instant::now());
        app.handle_key(key(KeyCode::Char('r')));

        schedule.advance(10);
        app.on_tick(Instant::now());
        assert!(app.context.ledger().is_empty());
        assert_eq!(app.controller.status(), SessionStatus::Idle);
    }

    #[test]
    fn number_keys_select_duration_only_when_not_running() {
        let (mut app, _) = app_with(10);
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.controller.selected_duration(), 5);

        app.start();
        app.handle_key(key(KeyCode::Char('4')));
        assert_eq!(app.controller.selected_duration(), 5);
    }

    #[test]
    fn menu_toggles_settings() {
        let (mut app, _) = app_with(10);
        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.state, AppState::Menu);

        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Char('t')));
        assert!(app.context.settings().sound_enabled);
        assert_ne!(app.context.settings().theme, crate::settings::Theme::Dark);

        // clicks are not counted while the menu is open
        app.handle_mouse(left_click(1, 1), Rect::new(0, 0, 10, 10));
        assert_eq!(app.controller.status(), SessionStatus::Idle);

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Playing);
    }

    #[test]
    fn quit_keys() {
        let (mut app, _) = app_with(10);
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Flow::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Flow::Quit
        );
    }

    #[test]
    fn late_space_press_does_not_count_in_expired_run() {
        let (mut app, schedule) = app_with(5);
        app.start();
        for _ in 0..4 {
            app.press_space();
        }

        schedule.advance(5);
        let events = app.press_space();

        assert_matches!(
            events.iter().find(|e| matches!(e, GameEvent::SessionEnded { .. })),
            Some(GameEvent::SessionEnded { clicks: 4, .. })
        );
        assert_eq!(app.context.ledger().best_score(), Some(0.8));
        // the late press opened the next run instead
        assert_eq!(app.controller.status(), SessionStatus::Running);
        assert_eq!(app.controller.click_count(), 1);
    }

    #[test]
    fn handle_event_settles_clock_before_input() {
        let (mut app, schedule) = app_with(5);
        let area = Rect::new(0, 0, 20, 10);
        app.start();
        app.handle_event(AppEvent::Key(key(KeyCode::Char(' '))), area, Instant::now());
        assert_eq!(app.controller.click_count(), 1);

        schedule.advance(5);
        // mouse input alone, no Tick: the run still ends before the click is routed
        app.handle_event(AppEvent::Mouse(left_click(1, 1)), area, Instant::now());

        assert_eq!(app.context.ledger().scores().collect::<Vec<f64>>(), vec![0.2]);
        assert_eq!(app.controller.status(), SessionStatus::Running);
        assert_eq!(app.controller.click_count(), 0);
    }

    #[test]
    fn key_release_is_ignored() {
        let (mut app, _) = app_with(5);
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert_eq!(
            app.handle_event(AppEvent::Key(release), Rect::default(), Instant::now()),
            Flow::Continue
        );
    }

    #[test]
    fn hidden_achievements_are_still_unlocked() {
        let (mut app, schedule) = app_with(5);
        app.toggle(Toggle::Achievements);
        app.start();
        for _ in 0..80 {
            app.click();
        }
        schedule.advance(5);
        app.on_tick(Instant::now());

        assert!(app.context.achievements().contains(Achievement::ClickMaster));
        assert_eq!(app.banner.current(), None);
    }
}
