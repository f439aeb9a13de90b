//! State management module
//!
//! This module contains the countdown value types, the state machine and the
//! shared application state.

pub mod time_span;
pub mod remaining;
pub mod countdown;
pub mod app_state;

// Re-export main types
pub use time_span::TimeSpan;
pub use remaining::remaining_duration;
pub use countdown::{
    ControlAvailability, CountdownController, CountdownError, CountdownPhase, CountdownStatus,
    TickOutcome,
};
pub use app_state::{AppError, AppState, SettingsUpdate};
