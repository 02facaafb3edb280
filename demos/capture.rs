//! # Capture
//!
//! Run the sequencer into the in-memory capture sink and print what it sent.
//!
//! **Concepts:** Custom sinks, no hardware required
//!
//! ```bash
//! cargo run --example capture --no-default-features
//! ```

use metrum::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn main() -> metrum::Result<()> {
    let (sink, consumer) = capture_sink();
    let mut engine = Metrum::builder()
        .voices(2)
        .bpm(240.0)
        .sink(Arc::new(sink))
        .build()?;

    engine.start()?;
    engine.play(1, Program::constant(Notes::new(vec![60, 67], 100.0, vec![4, 4, 2])))?;
    engine.ctrl(2, vec![Controller::constant(7, 100)])?;

    std::thread::sleep(Duration::from_secs(2));
    engine.stop();

    let messages = consumer.drain();
    let Some(first) = messages.first() else {
        println!("Nothing was sent.");
        return Ok(());
    };
    for timed in &messages {
        let [status, data1, data2] = *timed.message.as_bytes();
        println!(
            "{:>8.1}ms  {:02X} {:3} {:3}",
            timed.at.duration_since(first.at).as_secs_f64() * 1000.0,
            status,
            data1,
            data2
        );
    }

    Ok(())
}
