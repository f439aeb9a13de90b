//! Countdown state machine
//!
//! Every transition takes the current instant explicitly so the controller
//! stays independent of whatever drives it (HTTP handlers, the tick task,
//! tests).

use std::time::Instant;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    services::{write_literal, write_time_span},
    settings::{CountdownSettings, SettingsStore, DESTINATION_KEY, FORMAT_KEY},
};
use super::{remaining_duration, TimeSpan};

/// Rejected user actions. These correspond to controls that would be disabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountdownError {
    #[error("no destination file has been chosen")]
    MissingDestination,
    #[error("the countdown duration must be greater than zero")]
    EmptyDuration,
    #[error("invalid countdown duration {0}: components must be non-negative and the total at most 10000 hours")]
    InvalidDuration(TimeSpan),
    #[error("a countdown is already in progress")]
    AlreadyStarted,
    #[error("no countdown has been started")]
    NoSession,
    #[error("inputs cannot be changed while a countdown is in progress")]
    InputsLocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownPhase {
    Idle,
    Running,
    Paused,
}

/// Result of a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is running; the tick was ignored
    Inactive,
    Running(TimeSpan),
    /// The countdown reached zero and the controller is idle again
    Finished,
}

/// A single countdown run
#[derive(Debug, Clone, Copy)]
struct CountdownSession {
    total: TimeSpan,
    started_at: Instant,
    paused_at: Option<Instant>,
}

/// Which actions are currently allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlAvailability {
    pub can_start: bool,
    pub can_toggle_pause: bool,
    pub can_reset: bool,
    pub inputs_enabled: bool,
    pub pause_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownStatus {
    pub phase: CountdownPhase,
    pub display: TimeSpan,
    pub total: Option<TimeSpan>,
    pub settings: CountdownSettings,
    pub controls: ControlAvailability,
}

pub struct CountdownController {
    settings: CountdownSettings,
    store: Box<dyn SettingsStore>,
    session: Option<CountdownSession>,
    display: TimeSpan,
}

impl std::fmt::Debug for CountdownController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownController")
            .field("settings", &self.settings)
            .field("session", &self.session)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

impl CountdownController {
    /// Create an idle controller with inputs restored from `store`
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        let settings = CountdownSettings::load(store.as_ref());
        let display = settings.duration;
        Self {
            settings,
            store,
            session: None,
            display,
        }
    }

    pub fn phase(&self) -> CountdownPhase {
        match self.session {
            None => CountdownPhase::Idle,
            Some(CountdownSession { paused_at: None, .. }) => CountdownPhase::Running,
            Some(CountdownSession { paused_at: Some(_), .. }) => CountdownPhase::Paused,
        }
    }

    /// True while the tick source should be polling
    pub fn is_polling(&self) -> bool {
        self.phase() == CountdownPhase::Running
    }

    pub fn display(&self) -> TimeSpan {
        self.display
    }

    pub fn settings(&self) -> &CountdownSettings {
        &self.settings
    }

    pub fn controls(&self) -> ControlAvailability {
        let started = self.session.is_some();
        ControlAvailability {
            can_start: !started
                && self.settings.destination_path().is_some()
                && is_startable(&self.settings.duration),
            can_toggle_pause: started,
            can_reset: started,
            inputs_enabled: !started,
            pause_label: if self.phase() == CountdownPhase::Paused { "Resume" } else { "Pause" }.to_string(),
        }
    }

    pub fn status(&self) -> CountdownStatus {
        CountdownStatus {
            phase: self.phase(),
            display: self.display,
            total: self.session.map(|s| s.total),
            settings: self.settings.clone(),
            controls: self.controls(),
        }
    }

    /// Begin a countdown of the configured duration and write it out immediately
    pub fn start(&mut self, now: Instant) -> Result<TimeSpan, CountdownError> {
        if self.session.is_some() {
            return Err(CountdownError::AlreadyStarted);
        }
        if self.settings.destination_path().is_none() {
            return Err(CountdownError::MissingDestination);
        }
        if !self.settings.duration.is_valid_duration() {
            return Err(CountdownError::InvalidDuration(self.settings.duration));
        }
        if !is_startable(&self.settings.duration) {
            return Err(CountdownError::EmptyDuration);
        }

        let total = self.settings.duration;
        self.settings.save_duration(self.store.as_mut());
        self.settings.save_finish_message(self.store.as_mut());
        self.store.set_string(FORMAT_KEY, &self.settings.format);

        self.write_span(&total);
        self.display = total;
        self.session = Some(CountdownSession {
            total,
            started_at: now,
            paused_at: None,
        });

        info!("Countdown started for {}", total);
        Ok(total)
    }

    /// Recompute the remaining time and publish it; finishes the countdown at zero
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let session = match self.session {
            Some(session) if session.paused_at.is_none() => session,
            _ => return TickOutcome::Inactive,
        };

        let remaining = remaining_duration(session.started_at, session.total, now);
        if remaining <= TimeSpan::zero() {
            self.finish(session.total);
            return TickOutcome::Finished;
        }

        debug!("Countdown tick: {} remaining", remaining);
        self.display = remaining;
        self.write_span(&remaining);
        TickOutcome::Running(remaining)
    }

    /// Pause a running countdown or resume a paused one
    pub fn toggle_pause(&mut self, now: Instant) -> Result<CountdownPhase, CountdownError> {
        let session = self.session.as_mut().ok_or(CountdownError::NoSession)?;

        match session.paused_at.take() {
            None => {
                session.paused_at = Some(now);
                info!("Countdown paused at {}", self.display);
                Ok(CountdownPhase::Paused)
            }
            Some(paused_at) => {
                let paused_for = now.saturating_duration_since(paused_at);
                session.started_at += paused_for;
                let remaining = remaining_duration(session.started_at, session.total, now);

                info!("Countdown resumed after {:?} pause, {} remaining", paused_for, remaining);
                self.display = remaining;
                self.write_span(&remaining);
                Ok(CountdownPhase::Running)
            }
        }
    }

    /// Abandon the current countdown and publish the full duration again
    pub fn reset(&mut self) -> Result<TimeSpan, CountdownError> {
        let session = self.session.take().ok_or(CountdownError::NoSession)?;

        self.display = session.total;
        self.write_span(&session.total);
        info!("Countdown reset to {}", session.total);
        Ok(session.total)
    }

    pub fn set_destination(&mut self, destination: String) -> Result<(), CountdownError> {
        self.ensure_inputs_unlocked()?;
        self.store.set_string(DESTINATION_KEY, &destination);
        info!("Destination set to {:?}", destination);
        self.settings.destination = destination;
        Ok(())
    }

    pub fn set_duration(&mut self, duration: TimeSpan) -> Result<(), CountdownError> {
        self.ensure_inputs_unlocked()?;
        if !duration.is_valid_duration() {
            return Err(CountdownError::InvalidDuration(duration));
        }
        self.settings.duration = duration;
        self.settings.save_duration(self.store.as_mut());
        self.display = duration;
        Ok(())
    }

    /// Update the finish message text and/or whether it is used
    pub fn set_finish_message(&mut self, message: Option<String>, enabled: Option<bool>) {
        if let Some(message) = message {
            self.settings.finish_message = message;
        }
        if let Some(enabled) = enabled {
            self.settings.finish_message_enabled = enabled;
        }
        self.settings.save_finish_message(self.store.as_mut());
    }

    /// Change the output template; takes effect on the next write
    pub fn set_format(&mut self, format: String) {
        self.store.set_string(FORMAT_KEY, &format);
        self.settings.format = format;
    }

    fn finish(&mut self, total: TimeSpan) {
        self.session = None;
        self.display = total;

        if self.settings.finish_message_enabled {
            info!("Countdown finished, writing finish message");
            let message = self.settings.finish_message.clone();
            self.write_message(&message);
        } else {
            info!("Countdown finished");
            self.write_span(&TimeSpan::zero());
        }
    }

    fn ensure_inputs_unlocked(&self) -> Result<(), CountdownError> {
        if self.session.is_some() {
            Err(CountdownError::InputsLocked)
        } else {
            Ok(())
        }
    }

    fn write_span(&self, span: &TimeSpan) {
        if let Some(path) = self.settings.destination_path() {
            if let Err(e) = write_time_span(&path, &self.settings.format, span) {
                warn!("{}", e);
            }
        }
    }

    fn write_message(&self, message: &str) {
        if let Some(path) = self.settings.destination_path() {
            if let Err(e) = write_literal(&path, message) {
                warn!("{}", e);
            }
        }
    }
}

fn is_startable(duration: &TimeSpan) -> bool {
    duration.is_valid_duration() && duration.total_seconds() > 0
}
