//! Playback collaborator interface.
//!
//! The scheduler core never touches audio; it hands a path to something
//! implementing [`Player`]. The rodio-backed implementation lives here too,
//! but nothing in the core depends on it.

use anyhow::{anyhow, Context, Result};
use log::debug;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Coarse playback state as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    /// The loaded track ran to completion.
    Ended,
    /// Nothing is loaded.
    Stopped,
}

/// What the scheduler needs from a playback engine.
///
/// `total_duration_ms` may be unknown right after `load` (container metadata
/// not parsed yet); callers poll until it turns `Some`.
pub trait Player {
    fn load(&mut self, path: &Path) -> Result<()>;
    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    fn elapsed_ms(&self) -> u64;
    fn total_duration_ms(&self) -> Option<u64>;
    fn seek(&mut self, position_ms: u64) -> Result<()>;
    fn state(&self) -> PlaybackState;
    fn volume(&self) -> u8;
    fn set_volume(&mut self, percent: u8);
}

/// Rodio-backed [`Player`]. A fresh `Sink` is connected per track; dropping
/// the sink is our hard stop.
pub struct RodioPlayer {
    stream: OutputStream,
    sink: Option<Sink>,
    total_ms: Option<u64>,
    volume_percent: u8,
}

impl RodioPlayer {
    pub fn new() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .context("Failed to open an audio output device")?;
        // rodio logs to stderr when the stream drops; noisy for a CLI.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            total_ms: None,
            volume_percent: 100,
        })
    }

    fn sink_volume(&self) -> f32 {
        f32::from(self.volume_percent) / 100.0
    }
}

impl Player for RodioPlayer {
    fn load(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open audio file {}", path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to decode audio file {}", path.display()))?;

        self.total_ms = source
            .total_duration()
            .map(|duration| duration.as_millis() as u64);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.sink_volume());
        sink.append(source);
        sink.pause();
        self.sink = Some(sink);
        debug!("Loaded {}", path.display());
        Ok(())
    }

    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        self.play();
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.total_ms = None;
    }

    fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    fn elapsed_ms(&self) -> u64 {
        self.sink
            .as_ref()
            .map(|sink| sink.get_pos().as_millis() as u64)
            .unwrap_or(0)
    }

    fn total_duration_ms(&self) -> Option<u64> {
        self.total_ms
    }

    fn seek(&mut self, position_ms: u64) -> Result<()> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };
        sink.try_seek(Duration::from_millis(position_ms))
            .map_err(|err| anyhow!("Seek to {position_ms}ms failed: {err}"))
    }

    fn state(&self) -> PlaybackState {
        match &self.sink {
            None => PlaybackState::Stopped,
            Some(sink) if sink.empty() => PlaybackState::Ended,
            Some(sink) if sink.is_paused() => PlaybackState::Paused,
            Some(_) => PlaybackState::Playing,
        }
    }

    fn volume(&self) -> u8 {
        self.volume_percent
    }

    fn set_volume(&mut self, percent: u8) {
        self.volume_percent = percent.min(100);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.sink_volume());
        }
    }
}
