//! Audio clips and playback sinks
//!
//! Synthesizers hand back either a complete encoded clip or a stream of raw
//! PCM frames. A sink plays either kind and blocks until the last sample has
//! been rendered, so two utterances never overlap.

pub mod command_sink;
pub mod rodio_sink;
pub mod wav;

use crate::state::config::Config;
use crate::{Result, TalkboardError};
use log::{info, warn};

/// Layout of raw PCM samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmFormat {
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
        }
    }
}

/// Encoded container detected from the first bytes of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Wav,
    Mp3,
    Unknown,
}

impl Container {
    /// Identify a clip by its magic bytes
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
            Container::Wav
        } else if bytes.starts_with(b"ID3")
            || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
        {
            Container::Mp3
        } else {
            Container::Unknown
        }
    }
}

/// A synthesized utterance, ready to play or to cache
#[derive(Debug, Clone, PartialEq)]
pub enum Audio {
    /// A complete encoded clip (WAV or MP3)
    Encoded(Vec<u8>),
    /// Interleaved signed 16-bit samples
    Pcm {
        format: PcmFormat,
        samples: Vec<i16>,
    },
}

impl Audio {
    /// Bytes suitable for persisting; PCM is wrapped in a WAV container
    pub fn to_encoded(&self) -> Result<Vec<u8>> {
        match self {
            Audio::Encoded(bytes) => Ok(bytes.clone()),
            Audio::Pcm { format, samples } => wav::encode(*format, samples),
        }
    }

    /// Container of the clip as it would be persisted
    pub fn container(&self) -> Container {
        match self {
            Audio::Encoded(bytes) => Container::sniff(bytes),
            Audio::Pcm { .. } => Container::Wav,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Audio::Encoded(bytes) => bytes.is_empty(),
            Audio::Pcm { samples, .. } => samples.is_empty(),
        }
    }
}

/// Plays audio to completion
///
/// Every call blocks until playback is over. Implementations are used from
/// the engine thread only.
pub trait AudioSink {
    /// Decode and play a complete clip
    fn play(&mut self, audio: &Audio) -> Result<()>;

    /// Play PCM frames as they are produced
    fn play_stream(
        &mut self,
        format: PcmFormat,
        frames: &mut dyn Iterator<Item = Vec<i16>>,
    ) -> Result<()>;

    /// Set output volume (0-100)
    fn set_volume(&mut self, _volume: u8) -> Result<()> {
        Ok(())
    }
}

/// Convert 16-bit samples to the -1.0..1.0 range
pub fn samples_to_f32(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&s| s as f32 / i16::MAX as f32)
        .collect()
}

/// Create the audio sink named in the configuration
///
/// Failing to open the audio device is fatal: there is nothing to do without it.
pub fn create_sink(config: &Config) -> Result<Box<dyn AudioSink>> {
    let backend = config.audio();
    info!("Creating audio sink: {}", backend);

    let mut sink: Box<dyn AudioSink> = match backend.as_str() {
        "rodio" => Box::new(rodio_sink::RodioSink::new()?),
        "command" | "aplay" => Box::new(command_sink::CommandSink::new()?),
        other => {
            return Err(TalkboardError::Config(format!(
                "Unknown audio backend '{}' (expected rodio or command)",
                other
            )))
        }
    };

    if let Err(e) = sink.set_volume(config.volume()) {
        warn!("Could not apply initial volume: {}", e);
    }
    Ok(sink)
}
