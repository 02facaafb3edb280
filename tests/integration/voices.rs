//! Voice control integration tests
//!
//! Program assignment, mute/solo and controller lists through the engine surface.

use crate::helpers::*;
use metrum::prelude::*;
use metrum::{Error, REST_NOTE};

/// Two whole-bar steps of one pitch: two on/off pairs per job.
#[test]
fn test_voice_plays_program() {
    let (mut engine, mut recorder) = running_engine(1);
    assert!(engine.play(1, chord(&[60], &[1, 1])).unwrap());

    assert!(recorder.wait_for(|r| r.note_ons(0, 60).len() >= 2 && r.note_offs(0, 60) >= 2));
    assert!(recorder.note_ons(0, 60).iter().all(|m| m.message.data2() == 100));
    assert!(engine.instrument(1).unwrap().step() >= 2);
    engine.stop();
}

/// Octave shifts every pitch by twelve semitones per step.
#[test]
fn test_voice_octave_transposition() {
    let (mut engine, mut recorder) = running_engine(1);
    engine
        .play(
            1,
            Program::constant(Notes::new(vec![60], 100.0, vec![8]).with_octave(2)),
        )
        .unwrap();

    assert!(recorder.wait_for(|r| !r.note_ons(0, 72).is_empty()));
    assert!(recorder.note_ons(0, 60).is_empty());
    engine.stop();
}

/// Muted voices keep their timing but sound at velocity 0.
#[test]
fn test_voice_mute_unmute() {
    let (mut engine, mut recorder) = running_engine(1);
    engine.mute(1).unwrap();
    engine.play(1, chord(&[62], &[8])).unwrap();

    assert!(recorder.wait_for(|r| r.note_ons(0, 62).len() >= 2));
    assert!(recorder.note_ons(0, 62).iter().all(|m| m.message.data2() == 0));

    engine.unmute(1).unwrap();
    assert!(recorder.wait_for(|r| r
        .note_ons(0, 62)
        .iter()
        .any(|m| m.message.data2() == 100)));
    engine.stop();
}

/// Solo among three voices.
#[test]
fn test_voice_solo() {
    let (mut engine, mut recorder) = running_engine(3);
    engine.solo(2).unwrap();
    engine.play(1, chord(&[60], &[8])).unwrap();
    engine.play(2, chord(&[64], &[8])).unwrap();
    engine.play(3, chord(&[67], &[8])).unwrap();

    assert!(engine.instrument(1).unwrap().is_muted());
    assert!(!engine.instrument(2).unwrap().is_muted());
    assert!(engine.instrument(3).unwrap().is_muted());

    assert!(recorder.wait_for(|r| {
        r.note_ons(0, 60).len() >= 2
            && r.note_ons(1, 64).len() >= 2
            && r.note_ons(2, 67).len() >= 2
    }));
    assert!(recorder.note_ons(0, 60).iter().all(|m| m.message.data2() == 0));
    assert!(recorder.note_ons(1, 64).iter().all(|m| m.message.data2() == 100));
    assert!(recorder.note_ons(2, 67).iter().all(|m| m.message.data2() == 0));

    engine.unmute_all();
    assert!((1..=3).all(|id| !engine.instrument(id).unwrap().is_muted()));
    engine.mute_all();
    assert!((1..=3).all(|id| engine.instrument(id).unwrap().is_muted()));
    engine.stop();
}

/// Rests are sent silent and released like any other pitch.
#[test]
fn test_voice_rest() {
    let (mut engine, mut recorder) = running_engine(1);
    engine.play(1, chord(&[REST_NOTE as i32], &[8])).unwrap();

    assert!(recorder.wait_for(|r| r.note_ons(0, REST_NOTE).len() >= 2));
    assert!(recorder
        .note_ons(0, REST_NOTE)
        .iter()
        .all(|m| m.message.data2() == 0));
    engine.stop();
    recorder.poll();
    assert_notes_released(&recorder);
}

/// An empty duration pattern is rejected and the old program keeps playing.
#[test]
fn test_voice_rejects_empty_durations() {
    let (mut engine, mut recorder) = running_engine(1);
    assert!(engine.play(1, chord(&[65], &[8])).unwrap());
    assert!(!engine.play(1, chord(&[90], &[])).unwrap());
    assert!(!engine.play(1, chord(&[91], &[])).unwrap());

    assert!(recorder.wait_for(|r| r.note_ons(0, 65).len() >= 4));
    assert!(recorder.note_ons(0, 90).is_empty());
    assert!(recorder.note_ons(0, 91).is_empty());
    engine.stop();
}

/// Unknown ids are errors, never panics.
#[test]
fn test_voice_unknown_id() {
    let (engine, _recorder) = test_engine(2);
    assert!(matches!(engine.play(0, chord(&[60], &[4])), Err(Error::Core(_))));
    assert!(engine.play(3, chord(&[60], &[4])).is_err());
    assert!(engine.mute(3).is_err());
    assert!(engine.unmute(3).is_err());
    assert!(engine.solo(3).is_err());
    assert!(engine.ctrl(3, Vec::new()).is_err());
    assert!(engine.append_ctrl(3, Vec::new()).is_err());
    assert!(engine.noctrl(3).is_err());
    assert!(engine.instrument(3).is_err());
}

/// Controllers are emitted on the voice channel in list order.
#[test]
fn test_voice_controllers() {
    let (mut engine, mut recorder) = running_engine(2);
    engine
        .ctrl(2, vec![Controller::constant(74, 64), Controller::constant(1, 300)])
        .unwrap();

    assert!(recorder.wait_for(|r| r.control_changes(1, 74).len() >= 2));
    assert!(recorder.control_changes(1, 74).iter().all(|&v| v == 64));
    assert!(recorder.control_changes(1, 1).iter().all(|&v| v == 127));
    assert!(engine.instrument(2).unwrap().cc_step() > 0);
    engine.stop();
}

/// ctrl() replaces after a clear and appends otherwise.
#[test]
fn test_voice_controller_assignment() {
    let (engine, _recorder) = test_engine(1);
    let ccs = |engine: &Metrum| -> Vec<Cc> {
        engine
            .instrument(1)
            .unwrap()
            .controllers()
            .iter()
            .map(Controller::render)
            .collect()
    };

    engine.ctrl(1, vec![Controller::constant(1, 1)]).unwrap();
    engine.ctrl(1, vec![Controller::constant(2, 2)]).unwrap();
    assert_eq!(ccs(&engine), vec![Cc::new(1, 1), Cc::new(2, 2)]);

    engine.append_ctrl(1, vec![Controller::constant(3, 3)]).unwrap();
    assert_eq!(ccs(&engine).len(), 3);

    engine.noctrl(1).unwrap();
    assert!(ccs(&engine).is_empty());
    engine.ctrl(1, vec![Controller::constant(4, 4)]).unwrap();
    assert_eq!(ccs(&engine), vec![Cc::new(4, 4)]);

    engine.noctrl_all();
    assert!(ccs(&engine).is_empty());
}

/// Programs are rendered live: state changes show up on later steps.
#[test]
fn test_voice_program_reads_live_state() {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    let (mut engine, mut recorder) = running_engine(1);
    let pitch = Arc::new(AtomicI32::new(50));
    let program = {
        let pitch = Arc::clone(&pitch);
        Program::new(move || Notes::new(vec![pitch.load(Ordering::Relaxed)], 100.0, vec![8]))
    };
    engine.play(1, program).unwrap();

    assert!(recorder.wait_for(|r| !r.note_ons(0, 50).is_empty()));
    pitch.store(53, Ordering::Relaxed);
    assert!(recorder.wait_for(|r| !r.note_ons(0, 53).is_empty()));
    engine.stop();
}
