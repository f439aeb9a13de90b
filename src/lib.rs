//! Countdown Writer - A countdown timer that publishes the remaining time to a file
//!
//! This library provides the countdown state machine, the templated file
//! output and the HTTP control surface used to drive it.

pub mod config;
pub mod state;
pub mod settings;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, TimeSpan};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
