// tests/playback_controller.rs

use std::time::Duration;

use paddock::playback::{
    Frame, PlaybackCommand, PlaybackController, PlaybackEffect, PlaybackState, render_frame,
};
use paddock::types::PlaybackSpeed;
use paddock_test_utils::builders::RaceReportBuilder;

const BASE: Duration = Duration::from_millis(2000);

fn loaded(laps: u32) -> PlaybackController {
    let mut controller = PlaybackController::new(BASE);
    let step = controller.load(&RaceReportBuilder::new("Monza").laps(laps).build());
    assert!(step.accepted);
    controller
}

#[test]
fn test_new_controller_is_stopped() {
    let controller = PlaybackController::new(BASE);
    assert_eq!(controller.state(), PlaybackState::Stopped);
    assert_eq!(controller.cursor(), 0);
    assert!(controller.current_frame().is_none());
}

#[test]
fn test_load_starts_playing_from_first_lap() {
    let mut controller = PlaybackController::new(BASE);
    let step = controller.load(&RaceReportBuilder::new("Monza").laps(50).build());

    assert_eq!(
        step.effects,
        vec![
            PlaybackEffect::StopTicking,
            PlaybackEffect::Present,
            PlaybackEffect::StartTicking
        ]
    );
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(controller.cursor(), 0);
    assert_eq!(controller.log_len(), 50);
    assert_eq!(controller.track_name(), Some("Monza"));
    assert_eq!(controller.current_frame().and_then(|f| f.lap()), Some(1));
}

#[test]
fn test_fifty_laps_finish_after_forty_nine_ticks() {
    let mut controller = loaded(50);

    for i in 1..49 {
        let step = controller.tick();
        assert_eq!(step.effects, vec![PlaybackEffect::Present]);
        assert_eq!(controller.cursor(), i);
        assert_eq!(controller.state(), PlaybackState::Playing);
    }

    let step = controller.tick();
    assert_eq!(
        step.effects,
        vec![PlaybackEffect::Present, PlaybackEffect::StopTicking]
    );
    assert_eq!(controller.state(), PlaybackState::Finished);
    assert_eq!(controller.cursor(), 49);
    assert_eq!(controller.current_frame().and_then(|f| f.lap()), Some(50));

    // Nothing moves after the last lap.
    let step = controller.tick();
    assert!(!step.accepted);
    assert!(step.effects.is_empty());
    assert_eq!(controller.cursor(), 49);
}

#[test]
fn test_one_lap_log_finishes_on_first_tick() {
    let mut controller = loaded(1);
    assert_eq!(controller.state(), PlaybackState::Playing);

    let step = controller.tick();
    assert_eq!(step.effects, vec![PlaybackEffect::StopTicking]);
    assert_eq!(controller.state(), PlaybackState::Finished);
    assert_eq!(controller.cursor(), 0);
}

#[test]
fn test_pause_and_resume_keep_the_cursor() {
    let mut controller = loaded(50);
    for _ in 0..10 {
        controller.tick();
    }
    assert_eq!(controller.cursor(), 10);

    let step = controller.pause();
    assert_eq!(step.effects, vec![PlaybackEffect::StopTicking]);
    assert_eq!(controller.state(), PlaybackState::Paused);

    // A stray tick while paused changes nothing.
    assert!(!controller.tick().accepted);
    assert_eq!(controller.cursor(), 10);

    let step = controller.resume();
    assert_eq!(step.effects, vec![PlaybackEffect::StartTicking]);
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(controller.cursor(), 10);

    controller.tick();
    assert_eq!(controller.cursor(), 11);
}

#[test]
fn test_invalid_transitions_are_ignored() {
    let mut controller = PlaybackController::new(BASE);
    assert!(!controller.pause().accepted);
    assert!(!controller.resume().accepted);
    assert!(!controller.toggle().accepted);
    assert_eq!(controller.state(), PlaybackState::Stopped);

    let mut controller = loaded(5);
    assert!(!controller.resume().accepted);
    assert_eq!(controller.state(), PlaybackState::Playing);
}

#[test]
fn test_toggle_switches_between_playing_and_paused() {
    let mut controller = loaded(5);

    controller.apply(PlaybackCommand::Toggle);
    assert_eq!(controller.state(), PlaybackState::Paused);
    controller.apply(PlaybackCommand::Toggle);
    assert_eq!(controller.state(), PlaybackState::Playing);
}

#[test]
fn test_set_speed_only_retimes() {
    let mut controller = loaded(50);
    controller.tick();

    let fast = PlaybackSpeed::Fast.interval(BASE);
    let step = controller.set_speed(fast);
    assert_eq!(step.effects, vec![PlaybackEffect::Retime(Duration::from_millis(500))]);
    assert_eq!(controller.interval(), fast);
    assert_eq!(controller.cursor(), 1);
    assert_eq!(controller.state(), PlaybackState::Playing);

    // Valid in every state, including stopped.
    let mut idle = PlaybackController::new(BASE);
    assert!(idle.set_speed(Duration::from_millis(50)).accepted);
    assert_eq!(idle.state(), PlaybackState::Stopped);
}

#[test]
fn test_speed_presets() {
    assert_eq!(PlaybackSpeed::Normal.interval(BASE), Duration::from_millis(2000));
    assert_eq!(PlaybackSpeed::Fast.interval(BASE), Duration::from_millis(500));
    assert_eq!(PlaybackSpeed::Max.interval(BASE), Duration::from_millis(50));
    assert_eq!(
        PlaybackSpeed::Max.interval(Duration::from_millis(10)),
        Duration::from_millis(1)
    );
    assert_eq!("4x".parse::<PlaybackSpeed>(), Ok(PlaybackSpeed::Fast));
    assert!("8x".parse::<PlaybackSpeed>().is_err());
}

#[test]
fn test_speed_changes_do_not_change_the_end_state() {
    let mut plain = loaded(30);
    while plain.state() == PlaybackState::Playing {
        plain.tick();
    }

    let mut varied = loaded(30);
    let mut ticks = 0;
    while varied.state() == PlaybackState::Playing {
        if ticks % 7 == 0 {
            let speed = [PlaybackSpeed::Max, PlaybackSpeed::Normal, PlaybackSpeed::Fast][ticks % 3];
            varied.set_speed(speed.interval(BASE));
        }
        varied.tick();
        ticks += 1;
    }

    assert_eq!(varied.cursor(), plain.cursor());
    assert_eq!(varied.cursor(), 29);
    assert_eq!(ticks, 29);
}

#[test]
fn test_reload_discards_previous_race() {
    let mut controller = loaded(10);
    for _ in 0..5 {
        controller.tick();
    }
    controller.pause();

    controller.load(&RaceReportBuilder::new("Spa").laps(3).build());
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(controller.cursor(), 0);
    assert_eq!(controller.log_len(), 3);
    assert_eq!(controller.track_name(), Some("Spa"));
}

#[test]
fn test_missing_log_shows_final_classification() {
    let mut controller = PlaybackController::new(BASE);
    let step = controller.load(&RaceReportBuilder::new("Monaco").without_log(78).build());

    assert_eq!(
        step.effects,
        vec![PlaybackEffect::StopTicking, PlaybackEffect::Present]
    );
    assert_eq!(controller.state(), PlaybackState::Finished);

    match controller.current_frame() {
        Some(Frame::Final { standings, lap }) => {
            assert_eq!(lap, Some(78));
            assert_eq!(standings.len(), 3);
            assert_eq!(standings[0].driver, "VER");
        }
        other => panic!("Expected final frame, got: {other:?}"),
    }

    assert!(!controller.tick().accepted);
}

#[test]
fn test_unload_stops_everything() {
    let mut controller = loaded(10);
    controller.tick();

    let step = controller.unload();
    assert_eq!(step.effects, vec![PlaybackEffect::StopTicking]);
    assert_eq!(controller.state(), PlaybackState::Stopped);
    assert_eq!(controller.cursor(), 0);
    assert!(controller.current_frame().is_none());
    assert!(!controller.tick().accepted);
}

#[test]
fn test_frame_table_shows_gaps_and_tires() {
    let mut controller = loaded(3);
    controller.tick();

    let frame = controller.current_frame().unwrap();
    assert_eq!(frame.gap_label(0).as_deref(), Some("Leader"));
    assert_eq!(frame.gap_label(1).as_deref(), Some("+1.500s"));
    assert_eq!(frame.gap_label(2).as_deref(), Some("+4.250s"));
    assert_eq!(frame.gap_label(3), None);

    let table = render_frame(&frame, controller.state());
    assert!(table.starts_with("Lap 2 / 3"));
    assert!(table.contains("VER"));
    assert!(table.contains("M  98%"));
    assert!(table.contains("+1.500s"));
}
