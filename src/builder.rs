//! Builder for configuring and constructing a `Metrum` engine.

use crate::core::{Generator, MidiGenerator, MidiSink, Sequencer, SequencerConfig};
use crate::engine::Output;
use crate::{Metrum, Result};
use std::sync::Arc;
use std::time::Duration;

/// The MIDI output is not opened here. `Metrum::start()` opens it, so a missing
/// device surfaces as a start error.
///
/// Without an explicit output the first hardware port is used (feature
/// `midi-hardware`).
///
/// # Example
///
/// ```ignore
/// use metrum::prelude::*;
///
/// let mut engine = Metrum::builder()
///     .voices(4)
///     .bpm(96.0)
///     .port_name("fluid")
///     .build()?;
///
/// engine.start()?;
/// ```
pub struct MetrumBuilder {
    config: SequencerConfig,
    output: Output,
    generator: Option<Arc<dyn Generator>>,
}

impl Default for MetrumBuilder {
    fn default() -> Self {
        Self {
            config: SequencerConfig::default(),
            output: Output::FirstPort,
            generator: None,
        }
    }
}

impl MetrumBuilder {
    /// Default: 5
    pub fn voices(mut self, count: usize) -> Self {
        self.config.voices = count;
        self
    }

    /// Tempo applied on every start. Default: 60
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.config.default_bpm = bpm;
        self
    }

    /// Default: 64
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Default: 10 Hz
    pub fn controller_rate(mut self, hz: u32) -> Self {
        self.config.controller_rate_hz = hz;
        self
    }

    /// Default: 5ms
    pub fn producer_backoff(mut self, backoff: Duration) -> Self {
        self.config.producer_backoff = backoff;
        self
    }

    /// Default: true
    pub fn realtime_priority(mut self, enabled: bool) -> Self {
        self.config.realtime_priority = enabled;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SequencerConfig) -> Self {
        self.config = config;
        self
    }

    /// Hardware output port by index.
    #[cfg(feature = "midi-hardware")]
    pub fn port(mut self, index: usize) -> Self {
        self.output = Output::Port(index);
        self
    }

    /// Hardware output port by case-insensitive name fragment.
    #[cfg(feature = "midi-hardware")]
    pub fn port_name(mut self, name: impl Into<String>) -> Self {
        self.output = Output::PortName(name.into());
        self
    }

    /// Custom sink instead of a hardware port.
    pub fn sink(mut self, sink: Arc<dyn MidiSink>) -> Self {
        self.output = Output::Sink(sink);
        self
    }

    /// Custom frame generator. Default: [`MidiGenerator`].
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn build(self) -> Result<Metrum> {
        let generator = self
            .generator
            .unwrap_or_else(|| Arc::new(MidiGenerator::new(self.config.rest_note)));
        let sequencer = Sequencer::with_generator(self.config, generator)?;
        Ok(Metrum::from_parts(sequencer, self.output))
    }
}
