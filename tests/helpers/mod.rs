//! Test helpers and fixtures for metrum integration tests
//!
//! Engines run against the in-memory capture sink, never hardware. Tempo is
//! pushed to [`TEST_BPM`] so a bar lasts 250ms.

pub mod tolerances;

use metrum::prelude::*;
use metrum::{CaptureConsumer, TimedMessage};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tolerances::WAIT_TIMEOUT;

/// Test tempo (bar = 250ms)
pub const TEST_BPM: f64 = 960.0;

/// Bar length at [`TEST_BPM`] in microseconds
pub const TEST_BAR_US: f64 = 250_000.0;

/// Build a stopped engine wired to a capture sink.
pub fn test_engine(voices: usize) -> (Metrum, Recorder) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let (sink, consumer) = capture_sink();
    let engine = Metrum::builder()
        .voices(voices)
        .bpm(TEST_BPM)
        .queue_capacity(2)
        .controller_rate(50)
        .realtime_priority(false)
        .sink(Arc::new(sink))
        .build()
        .expect("Failed to create test engine");
    (engine, Recorder::new(consumer))
}

/// Build and start an engine.
pub fn running_engine(voices: usize) -> (Metrum, Recorder) {
    let (mut engine, recorder) = test_engine(voices);
    engine.start().expect("Failed to start test engine");
    (engine, recorder)
}

pub fn chord(pitches: &[i32], durations: &[u32]) -> Program {
    Program::constant(Notes::new(pitches.to_vec(), 100.0, durations.to_vec()))
}

/// Accumulates everything the capture sink received.
pub struct Recorder {
    consumer: CaptureConsumer,
    seen: Vec<TimedMessage>,
}

impl Recorder {
    pub fn new(consumer: CaptureConsumer) -> Self {
        Self {
            consumer,
            seen: Vec::new(),
        }
    }

    /// Pull pending messages and return the full history.
    pub fn poll(&mut self) -> &[TimedMessage] {
        self.seen.extend(self.consumer.drain());
        &self.seen
    }

    /// Poll until `done` holds or [`WAIT_TIMEOUT`] elapses.
    pub fn wait_for(&mut self, done: impl Fn(&Recorder) -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < WAIT_TIMEOUT {
            self.poll();
            if done(self) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    pub fn note_ons(&self, channel: u8, pitch: u8) -> Vec<&TimedMessage> {
        self.seen
            .iter()
            .filter(|m| {
                m.message.is_note_on()
                    && m.message.channel() == channel
                    && m.message.data1() == pitch
            })
            .collect()
    }

    pub fn note_offs(&self, channel: u8, pitch: u8) -> usize {
        self.seen
            .iter()
            .filter(|m| {
                m.message.is_note_off()
                    && m.message.channel() == channel
                    && m.message.data1() == pitch
            })
            .count()
    }

    pub fn control_changes(&self, channel: u8, controller: u8) -> Vec<u8> {
        self.seen
            .iter()
            .filter(|m| {
                m.message.is_control_change()
                    && m.message.channel() == channel
                    && m.message.data1() == controller
            })
            .map(|m| m.message.data2())
            .collect()
    }

    pub fn on_channel(&self, channel: u8) -> usize {
        self.seen
            .iter()
            .filter(|m| m.message.channel() == channel)
            .count()
    }

    /// Note-ons minus note-offs per (channel, pitch). Empty when every note was released.
    pub fn unreleased(&self) -> HashMap<(u8, u8), i64> {
        let mut balance: HashMap<(u8, u8), i64> = HashMap::new();
        for m in self.seen.iter().map(|m| m.message) {
            let key = (m.channel(), m.data1());
            if m.is_note_on() {
                *balance.entry(key).or_default() += 1;
            } else if m.is_note_off() {
                *balance.entry(key).or_default() -= 1;
            }
        }
        balance.retain(|_, b| *b != 0);
        balance
    }
}

/// Assert every note-on has a matching note-off.
pub fn assert_notes_released(recorder: &Recorder) {
    let unreleased = recorder.unreleased();
    assert!(
        unreleased.is_empty(),
        "Expected every note released, but found {:?}",
        unreleased
    );
}
