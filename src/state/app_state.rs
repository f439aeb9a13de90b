//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::settings::SettingsStore;
use super::{
    CountdownController, CountdownError, CountdownPhase, CountdownStatus, TickOutcome, TimeSpan,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Countdown(#[from] CountdownError),
    #[error("failed to lock countdown state: {0}")]
    Lock(String),
}

/// Partial update of the user inputs; absent fields are left unchanged
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SettingsUpdate {
    pub destination: Option<String>,
    pub duration: Option<TimeSpan>,
    pub finish_message: Option<String>,
    pub finish_message_enabled: Option<bool>,
    pub format: Option<String>,
}

/// Main application state shared by the HTTP handlers and the tick task
#[derive(Debug)]
pub struct AppState {
    /// The countdown itself; every transition goes through this lock
    pub countdown: Mutex<CountdownController>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Whether the tick task should be polling
    pub polling_tx: watch::Sender<bool>,
    /// Keep the receiver alive to prevent channel closure
    pub _polling_rx: watch::Receiver<bool>,
}

impl AppState {
    /// Create a new AppState with inputs restored from `store`
    pub fn new(port: u16, host: String, store: Box<dyn SettingsStore>) -> Self {
        let (polling_tx, polling_rx) = watch::channel(false);

        Self {
            countdown: Mutex::new(CountdownController::new(store)),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            polling_tx,
            _polling_rx: polling_rx,
        }
    }

    pub fn shared(port: u16, host: String, store: Box<dyn SettingsStore>) -> Arc<Self> {
        Arc::new(Self::new(port, host, store))
    }

    fn lock(&self) -> Result<MutexGuard<'_, CountdownController>, AppError> {
        self.countdown
            .lock()
            .map_err(|e| AppError::Lock(e.to_string()))
    }

    /// Apply a transition, record it as the last action and sync the polling flag
    fn transition<T, F>(&self, action: &str, apply: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut CountdownController) -> Result<T, CountdownError>,
    {
        let mut countdown = self.lock()?;
        let result = apply(&mut *countdown)?;
        let polling = countdown.is_polling();
        drop(countdown); // Release the lock early

        self.record_action(action);
        self.set_polling(polling);
        Ok(result)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn set_polling(&self, polling: bool) {
        // send_if_modified keeps watchers quiet when nothing changed
        self.polling_tx.send_if_modified(|current| {
            if *current == polling {
                false
            } else {
                *current = polling;
                true
            }
        });
    }

    pub fn start(&self) -> Result<TimeSpan, AppError> {
        self.transition("start", |countdown| countdown.start(Instant::now()))
    }

    pub fn toggle_pause(&self) -> Result<CountdownPhase, AppError> {
        self.transition("pause", |countdown| countdown.toggle_pause(Instant::now()))
    }

    pub fn reset(&self) -> Result<TimeSpan, AppError> {
        self.transition("reset", |countdown| countdown.reset())
    }

    /// Apply every field present in `update`, stopping at the first rejected one
    pub fn update_settings(&self, update: SettingsUpdate) -> Result<CountdownStatus, AppError> {
        self.transition("settings", |countdown| {
            if let Some(destination) = update.destination {
                countdown.set_destination(destination)?;
            }
            if let Some(duration) = update.duration {
                countdown.set_duration(duration)?;
            }
            if update.finish_message.is_some() || update.finish_message_enabled.is_some() {
                countdown.set_finish_message(update.finish_message, update.finish_message_enabled);
            }
            if let Some(format) = update.format {
                countdown.set_format(format);
            }
            Ok(countdown.status())
        })
    }

    /// Poll the countdown once; called by the tick task
    pub fn tick(&self) -> Result<TickOutcome, AppError> {
        let mut countdown = self.lock()?;
        let outcome = countdown.tick(Instant::now());
        let polling = countdown.is_polling();
        drop(countdown);

        if outcome == TickOutcome::Finished {
            info!("Countdown reached zero");
            self.record_action("finished");
        }
        self.set_polling(polling);
        Ok(outcome)
    }

    pub fn status(&self) -> Result<CountdownStatus, AppError> {
        Ok(self.lock()?.status())
    }

    pub fn is_polling(&self) -> bool {
        *self.polling_tx.borrow()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Stop polling, used during shutdown
    pub fn stop_polling(&self) {
        if self.is_polling() {
            warn!("Stopping countdown polling while a countdown is running");
        }
        self.set_polling(false);
    }
}
