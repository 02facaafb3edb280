//! Engine lifecycle integration tests
//!
//! Start/stop, restart, drop while running, and output selection.

use crate::helpers::tolerances::STOP_DEADLINE;
use crate::helpers::*;
use metrum::prelude::*;
use metrum::{Error, WorkerPhase};
use std::sync::Arc;
use std::time::Instant;

/// Test basic start/stop.
#[test]
fn test_engine_start_stop() {
    let (mut engine, _recorder) = test_engine(2);
    assert!(!engine.is_running());

    engine.start().unwrap();
    assert!(engine.is_running());
    assert_eq!(engine.tempo(), TEST_BPM);

    engine.stop();
    assert!(!engine.is_running());
    assert!(engine
        .worker_states()
        .iter()
        .all(|&s| s == WorkerPhase::Stopped));
}

/// Stop before start and double stop are harmless.
#[test]
fn test_engine_stop_idempotent() {
    let (mut engine, _recorder) = test_engine(1);
    engine.stop();
    engine.start().unwrap();
    engine.stop();
    engine.stop();
    assert!(!engine.is_running());
}

/// A second start while running keeps the current session.
#[test]
fn test_engine_double_start_is_noop() {
    let (mut engine, _recorder) = running_engine(1);
    engine.set_tempo(300.0).unwrap();
    engine.start().unwrap();
    assert_eq!(engine.tempo(), 300.0);
    engine.stop();
}

/// Start resets voices, tempo and controllers.
#[test]
fn test_engine_restart_resets_state() {
    let (mut engine, mut recorder) = running_engine(2);
    engine.play(1, chord(&[60], &[4])).unwrap();
    engine.ctrl(2, vec![Controller::constant(7, 100)]).unwrap();
    engine.mute(2).unwrap();
    engine.set_tempo(200.0).unwrap();
    assert!(recorder.wait_for(|r| !r.note_ons(0, 60).is_empty()));
    engine.stop();

    engine.start().unwrap();
    assert_eq!(engine.tempo(), TEST_BPM);
    assert!(!engine.instrument(2).unwrap().is_muted());
    assert!(engine.instrument(2).unwrap().controllers().is_empty());
    assert!(engine.instrument(1).unwrap().program().render().pitches.is_empty());
    engine.stop();
}

/// Stop returns promptly even when every voice is mid-note.
#[test]
fn test_engine_stop_is_prompt_and_releases_notes() {
    let (mut engine, mut recorder) = running_engine(3);
    engine.play(1, chord(&[48, 52, 55], &[1])).unwrap();
    engine.play(2, chord(&[60], &[1])).unwrap();
    engine.play(3, chord(&[72], &[2])).unwrap();
    assert!(recorder.wait_for(|r| {
        !r.note_ons(0, 48).is_empty() && !r.note_ons(1, 60).is_empty()
    }));

    let stop_at = Instant::now();
    engine.stop();
    assert!(
        stop_at.elapsed() < STOP_DEADLINE,
        "stop took {:?}",
        stop_at.elapsed()
    );

    recorder.poll();
    assert_notes_released(&recorder);
}

/// Dropping a running engine joins its threads and releases notes.
#[test]
fn test_engine_drop_while_running() {
    let (engine, mut recorder) = running_engine(1);
    engine.play(1, chord(&[64], &[1])).unwrap();
    assert!(recorder.wait_for(|r| !r.note_ons(0, 64).is_empty()));

    drop(engine);
    recorder.poll();
    assert_notes_released(&recorder);
}

/// A failing sink does not stop playback.
#[test]
fn test_engine_survives_sink_errors() {
    let (sink, consumer) = capture_sink();
    drop(consumer);
    let mut engine = Metrum::builder()
        .voices(1)
        .bpm(TEST_BPM)
        .realtime_priority(false)
        .sink(Arc::new(sink))
        .build()
        .unwrap();

    engine.start().unwrap();
    engine.play(1, chord(&[60], &[16])).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(400));
    assert!(engine.is_running());
    assert!(engine.instrument(1).unwrap().step() > 0);
    engine.stop();
}

/// Invalid configuration is rejected at build time.
#[test]
fn test_engine_invalid_config() {
    assert!(matches!(
        Metrum::builder().voices(0).build(),
        Err(Error::Core(_))
    ));
    assert!(matches!(
        Metrum::builder().controller_rate(0).build(),
        Err(Error::Core(_))
    ));
    assert!(matches!(
        Metrum::builder().queue_capacity(0).build(),
        Err(Error::Core(_))
    ));
}

/// A port name that matches nothing fails start and leaves the engine stopped.
#[cfg(feature = "midi-hardware")]
#[test]
fn test_engine_missing_port_fails_start() {
    let mut engine = Metrum::builder()
        .port_name("no-such-port-metrum-test")
        .build()
        .unwrap();
    assert!(matches!(engine.start(), Err(Error::Midi(_))));
    assert!(!engine.is_running());
}
