//! End-to-end countdown scenarios driven through the public library API.
use std::{
    fs,
    time::{Duration, Instant},
};

use countdown_writer::{
    settings::{JsonFileSettings, SettingsStore, FORMAT_KEY, HOURS_KEY, MINUTES_KEY, SECONDS_KEY},
    state::{CountdownController, CountdownPhase, TickOutcome},
    TimeSpan,
};
use tempfile::tempdir;

#[test]
fn five_second_countdown_with_and_without_finish_message() {
    for finish_message_enabled in [false, true] {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let mut controller =
            CountdownController::new(Box::new(JsonFileSettings::load(dir.path().join("settings.json"))));
        controller
            .set_destination(out.to_string_lossy().into_owned())
            .unwrap();
        controller.set_duration(TimeSpan::new(0, 0, 5)).unwrap();
        controller.set_finish_message(Some("Starting now".to_string()), Some(finish_message_enabled));

        let start = Instant::now();
        controller.start(start).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "00:00:05");

        controller.tick(start + Duration::from_secs(1));
        assert_eq!(fs::read_to_string(&out).unwrap(), "00:00:04");

        assert_eq!(controller.tick(start + Duration::from_secs(5)), TickOutcome::Finished);
        let expected = if finish_message_enabled { "Starting now" } else { "00:00:00" };
        assert_eq!(fs::read_to_string(&out).unwrap(), expected);
        assert_eq!(controller.phase(), CountdownPhase::Idle);
    }
}

#[test]
fn pause_does_not_consume_remaining_time() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.txt");
    let mut controller =
        CountdownController::new(Box::new(JsonFileSettings::load(dir.path().join("settings.json"))));
    controller
        .set_destination(out.to_string_lossy().into_owned())
        .unwrap();
    controller.set_duration(TimeSpan::new(0, 0, 10)).unwrap();

    let start = Instant::now();
    controller.start(start).unwrap();
    let pause = start + Duration::from_secs(2);
    controller.tick(pause);
    controller.toggle_pause(pause).unwrap();
    controller.toggle_pause(pause + Duration::from_secs(3)).unwrap();

    assert_eq!(controller.display(), TimeSpan::new(0, 0, 8));
    assert_eq!(fs::read_to_string(&out).unwrap(), "00:00:08");
}

#[test]
fn settings_survive_restart() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    let out = dir.path().join("out.txt");

    {
        let mut controller = CountdownController::new(Box::new(JsonFileSettings::load(&settings_path)));
        controller
            .set_destination(out.to_string_lossy().into_owned())
            .unwrap();
        controller.set_duration(TimeSpan::new(1, 15, 0)).unwrap();
        controller.set_format("{hh}h{mm}".to_string());
        controller.start(Instant::now()).unwrap();
    }
    assert_eq!(fs::read_to_string(&out).unwrap(), "01h15");

    let store = JsonFileSettings::load(&settings_path);
    assert_eq!(store.get_i64(HOURS_KEY), Some(1));
    assert_eq!(store.get_i64(MINUTES_KEY), Some(15));
    assert_eq!(store.get_i64(SECONDS_KEY), Some(0));
    assert_eq!(store.get_string(FORMAT_KEY).as_deref(), Some("{hh}h{mm}"));

    let controller = CountdownController::new(Box::new(store));
    assert_eq!(controller.phase(), CountdownPhase::Idle);
    assert_eq!(controller.settings().destination, out.to_string_lossy());
    assert_eq!(controller.display(), TimeSpan::new(1, 15, 0));
    assert!(controller.controls().can_start);
}
