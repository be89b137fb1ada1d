use ratatui::Frame;

use crate::app::{App, AppState};
use crate::ui::render_menu;

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Game screen - renders the main App widget
pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Settings menu drawn over the game screen
pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        f.render_widget(app, area);
        render_menu(app, area, f.buffer_mut());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Playing => Box::new(PlayingScreen),
        AppState::Menu => Box::new(MenuScreen),
    }
}

/// Draw whatever the current state calls for.
pub fn draw(app: &App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}
