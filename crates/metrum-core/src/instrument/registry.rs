//! Fixed-size instrument registry.
//!
//! Slots `0..voices` are user voices, addressed from the outside by 1-based id.
//! The last slot is reserved for the metronome: it plays a silent 1/64 pulse and
//! its step counter is the clock's tick count.

use super::Instrument;
use crate::config::TICKS_PER_BAR;
use crate::notes::{Notes, Program};
use crate::{Error, Result};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

#[derive(Debug)]
pub struct InstrumentRegistry {
    slots: Vec<Instrument>,
    voices: usize,
}

impl InstrumentRegistry {
    pub fn new(voices: usize) -> Self {
        let mut slots: Vec<Instrument> = (0..voices)
            .map(|index| Instrument::new(index, Program::silence()))
            .collect();
        slots.push(Instrument::new(voices, metronome_program()));
        Self { slots, voices }
    }

    /// Number of user voices.
    pub fn voices(&self) -> usize {
        self.voices
    }

    /// Number of slots, metronome included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn metronome_slot(&self) -> usize {
        self.voices
    }

    pub fn metronome(&self) -> &Instrument {
        &self.slots[self.voices]
    }

    /// Tick counter shared with [`crate::Metro`].
    pub(crate) fn tick_counter(&self) -> Arc<AtomicU64> {
        self.metronome().step_counter()
    }

    /// Look up a user voice by 1-based id.
    pub fn voice(&self, id: usize) -> Result<&Instrument> {
        if id == 0 || id > self.voices {
            return Err(Error::UnknownInstrument(id));
        }
        Ok(&self.slots[id - 1])
    }

    /// Look up any slot by 0-based index.
    pub fn slot(&self, index: usize) -> Option<&Instrument> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Instrument> {
        self.slots.iter()
    }

    pub fn user_voices(&self) -> impl Iterator<Item = &Instrument> {
        self.slots[..self.voices].iter()
    }

    pub fn mute_all(&self) {
        self.user_voices().for_each(Instrument::mute);
    }

    pub fn unmute_all(&self) {
        self.user_voices().for_each(Instrument::unmute);
    }

    /// Mute every user voice except `id`, which is unmuted.
    pub fn solo(&self, id: usize) -> Result<()> {
        let soloed = self.voice(id)?.index();
        for inst in self.user_voices() {
            if inst.index() == soloed {
                inst.unmute();
            } else {
                inst.mute();
            }
        }
        Ok(())
    }

    pub fn clear_all_controllers(&self) {
        self.user_voices().for_each(Instrument::clear_controllers);
    }

    /// Return every slot to its initial state.
    pub fn reset(&self) {
        for inst in self.user_voices() {
            inst.reset(Program::silence());
        }
        self.metronome().reset(metronome_program());
    }
}

fn metronome_program() -> Program {
    Program::constant(Notes::new(Vec::new(), 0.0, vec![TICKS_PER_BAR as u32]))
}
