//! # Live Pattern
//!
//! Play three voices on a hardware MIDI port and change them while they run.
//!
//! **Concepts:** Device enumeration, live program swaps, controllers, solo
//!
//! ```bash
//! cargo run --example live_pattern -- fluid
//! ```

use metrum::prelude::*;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() -> metrum::Result<()> {
    let devices = Metrum::list_output_devices();
    println!("MIDI output devices:");
    if devices.is_empty() {
        println!("  (none found - start a software synth and try again)");
        return Ok(());
    }
    for dev in &devices {
        println!("  [{}] {}", dev.index, dev.name);
    }

    let mut builder = Metrum::builder().voices(3).bpm(100.0);
    if let Some(name) = std::env::args().nth(1) {
        builder = builder.port_name(name);
    }
    let mut engine = builder.build()?;
    engine.start()?;

    // Bass walks up a fifth every time it is rendered
    let root = Arc::new(AtomicI32::new(36));
    let bass = {
        let root = Arc::clone(&root);
        Program::new(move || {
            let pitch = root.load(Ordering::Relaxed);
            Notes::new(vec![pitch], 110.0, vec![4, 4, 4, 4])
        })
    };
    engine.play(1, bass)?;
    engine.play(2, Program::constant(Notes::new(vec![60, 64, 67], 80.0, vec![2, 2])))?;
    engine.play(
        3,
        Program::constant(Notes::new(vec![79], 90.0, vec![8, 8, 16, 16, 16, 16, 4])),
    )?;
    engine.ctrl(2, vec![Controller::constant(74, 40)])?;

    std::thread::sleep(Duration::from_secs(4));
    root.store(43, Ordering::Relaxed);
    engine.set_tempo(120.0)?;

    std::thread::sleep(Duration::from_secs(4));
    engine.solo(1)?;
    println!("Solo bass at playhead {}", engine.playhead());

    std::thread::sleep(Duration::from_secs(4));
    engine.stop();
    println!("Stopped.");

    Ok(())
}
