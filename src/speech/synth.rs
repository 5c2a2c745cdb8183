//! Speech synthesizer abstraction
//!
//! Every backend turns a piece of text into audio. Offline engines return a
//! complete clip; the neural engine streams PCM frames so playback can start
//! before synthesis finishes.

use super::backends::{espeak::EspeakSynth, google::GoogleSynth, pico::PicoSynth, piper::PiperSynth};
use super::retry::{Retry, RetryPolicy};
use crate::audio::{Audio, PcmFormat};
use crate::platform::{internet_available, PROBE_HOST};
use crate::state::config::Config;
use crate::{Result, TalkboardError};
use log::info;
use std::fmt;
use std::time::Duration;

/// A lazily produced sequence of PCM frames
pub struct PcmStream {
    pub format: PcmFormat,
    frames: Box<dyn Iterator<Item = Result<Vec<i16>>> + Send>,
}

impl PcmStream {
    pub fn new(
        format: PcmFormat,
        frames: impl Iterator<Item = Result<Vec<i16>>> + Send + 'static,
    ) -> Self {
        Self {
            format,
            frames: Box::new(frames),
        }
    }
}

impl Iterator for PcmStream {
    type Item = Result<Vec<i16>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.frames.next()
    }
}

impl fmt::Debug for PcmStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcmStream")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Output of a synthesis request
#[derive(Debug)]
pub enum Utterance {
    /// A complete clip
    Clip(Audio),
    /// PCM frames produced while the engine is still running
    Stream(PcmStream),
}

/// Speech synthesizer trait
///
/// An `Err` means "no audio for this text": callers skip playback and carry on.
pub trait Synthesizer: Send {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Convert text to audio
    fn synthesize(&mut self, text: &str) -> Result<Utterance>;
}

/// Create the synthesizer named in the configuration
///
/// `auto` picks the cloud voice when the internet is reachable and espeak-ng
/// otherwise. Backend construction failures are fatal.
pub fn create_synthesizer(config: &Config) -> Result<Box<dyn Synthesizer>> {
    let mut backend = config.synthesizer();

    if backend == "auto" {
        backend = if internet_available(PROBE_HOST, Duration::from_secs(2)) {
            info!("Internet reachable, using the cloud voice");
            "google".to_string()
        } else {
            info!("Offline, using espeak-ng");
            "espeak".to_string()
        };
    }

    let language = config.language();
    info!("Creating synthesizer '{}' for {}", backend, language);

    match backend.as_str() {
        "espeak" => Ok(Box::new(EspeakSynth::new(&config.espeak_voice())?)),
        "pico" => Ok(Box::new(PicoSynth::new(&language)?)),
        "google" => {
            let policy = RetryPolicy {
                max_attempts: config.cloud_retries(),
                base_delay: config.cloud_retry_delay(),
                ..RetryPolicy::default()
            };
            let google = GoogleSynth::new(&language, config.cloud_timeout())?;
            Ok(Box::new(Retry::new(google, policy)))
        }
        "piper" => {
            let model = config.piper_model().ok_or_else(|| {
                TalkboardError::Config("synthesizer = piper needs voice.piper_model".to_string())
            })?;
            Ok(Box::new(PiperSynth::new(&config.piper_binary(), &model)?))
        }
        other => Err(TalkboardError::Config(format!(
            "Unknown synthesizer '{}' (expected auto, espeak, pico, google or piper)",
            other
        ))),
    }
}
