//! Countdown polling background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::{AppState, TickOutcome};

/// Coarse enough to limit file I/O, fine enough for a sub-second display
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Background task that polls the countdown while it is running.
///
/// Returns once the polling channel closes or the countdown lock is poisoned.
pub async fn countdown_ticker_task(state: Arc<AppState>, period: Duration) {
    info!("Starting countdown ticker task ({:?} interval)", period);

    let mut polling_rx = state.polling_tx.subscribe();

    loop {
        // Wait until a countdown is started or resumed
        if polling_rx.wait_for(|polling| *polling).await.is_err() {
            debug!("Polling channel closed, stopping ticker");
            return;
        }
        debug!("Countdown polling started");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; the start action already wrote the total
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match state.tick() {
                        Ok(TickOutcome::Running(remaining)) => {
                            debug!("{} remaining", remaining);
                        }
                        Ok(TickOutcome::Finished) | Ok(TickOutcome::Inactive) => break,
                        Err(e) => {
                            // A poisoned lock never recovers
                            error!("Failed to tick countdown, stopping ticker: {}", e);
                            return;
                        }
                    }
                }

                changed = polling_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if !*polling_rx.borrow_and_update() {
                        debug!("Countdown polling stopped");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{settings::MemorySettings, state::{CountdownPhase, SettingsUpdate, TimeSpan}};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_ticker_finishes_countdown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let state = AppState::shared(0, "127.0.0.1".to_string(), Box::new(MemorySettings::new()));
        state
            .update_settings(SettingsUpdate {
                destination: Some(path.to_string_lossy().into_owned()),
                duration: Some(TimeSpan::new(0, 0, 1)),
                finish_message: Some("Done".to_string()),
                finish_message_enabled: Some(true),
                ..SettingsUpdate::default()
            })
            .unwrap();

        let task = tokio::spawn(countdown_ticker_task(Arc::clone(&state), Duration::from_millis(20)));
        state.start().unwrap();

        let mut finished = false;
        for _ in 0..200 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if state.status().unwrap().phase == CountdownPhase::Idle {
                finished = true;
                break;
            }
        }
        task.abort();

        assert!(finished, "countdown never finished");
        assert!(!state.is_polling());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Done");
    }

    #[tokio::test]
    async fn test_ticker_stops_on_poisoned_lock() {
        let state = AppState::shared(0, "127.0.0.1".to_string(), Box::new(MemorySettings::new()));
        let poisoner = Arc::clone(&state);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.countdown.lock().unwrap();
            panic!("poison the countdown lock");
        })
        .join();
        assert!(state.countdown.is_poisoned());

        state.polling_tx.send_replace(true);
        let task = tokio::spawn(countdown_ticker_task(Arc::clone(&state), Duration::from_millis(10)));

        let finished = tokio::time::timeout(Duration::from_secs(2), task).await;
        assert!(matches!(finished, Ok(Ok(()))), "ticker kept running on a poisoned lock");
    }
}
