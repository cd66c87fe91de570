pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{ControllerConfig, ScreenEvent, SessionController, SessionSnapshot};
pub use state::{SessionState, SessionStatus, TickOutcome, Transition, DEFAULT_SESSION_SECS};
