// Library surface for the binary and the integration tests.
pub mod achievements;
pub mod app;
pub mod app_dirs;
pub mod context;
pub mod controller;
pub mod error;
pub mod events;
pub mod feedback;
pub mod ledger;
pub mod runtime;
pub mod schedule;
pub mod session;
pub mod settings;
pub mod store;
pub mod ui;
pub mod util;

pub use app::{App, AppState, Flow};
pub use context::AppContext;
pub use controller::SessionController;
pub use events::GameEvent;
