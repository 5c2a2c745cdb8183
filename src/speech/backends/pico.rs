//! Offline voice using SVOX Pico
//!
//! pico2wave can only write to a file, so each request goes through a
//! temporary WAV file that is read back and removed.
//!
//! Dependencies:
//! - pico2wave (install with: sudo apt install libttspico-utils)

use crate::audio::Audio;
use crate::speech::{Synthesizer, Utterance};
use crate::{Result, TalkboardError};
use log::debug;
use std::process::{Command, Stdio};

/// Languages shipped with Pico
const PICO_LANGUAGES: [&str; 6] = ["en-US", "en-GB", "de-DE", "es-ES", "fr-FR", "it-IT"];

/// SVOX Pico synthesizer
pub struct PicoSynth {
    /// Pico language, one of [`PICO_LANGUAGES`]
    language: &'static str,
}

impl PicoSynth {
    pub fn new(language: &str) -> Result<Self> {
        let available = Command::new("pico2wave")
            .arg("--usage")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok();
        if !available {
            return Err(TalkboardError::Synthesis(
                "pico2wave not found. Install with: sudo apt install libttspico-utils".to_string(),
            ));
        }

        let language = Self::language_for(language);
        debug!("Pico language: {}", language);
        Ok(Self { language })
    }

    /// Closest Pico language for a tag; regional French maps to fr-FR
    fn language_for(tag: &str) -> &'static str {
        let tag = tag.trim().replace('_', "-").to_lowercase();
        if let Some(exact) = PICO_LANGUAGES
            .iter()
            .copied()
            .find(|l| l.to_lowercase() == tag)
        {
            return exact;
        }
        let language = tag.split('-').next().unwrap_or_default();
        PICO_LANGUAGES
            .iter()
            .copied()
            .find(|l| !language.is_empty() && l.starts_with(language))
            .unwrap_or("fr-FR")
    }
}

impl Synthesizer for PicoSynth {
    fn name(&self) -> &'static str {
        "pico"
    }

    fn synthesize(&mut self, text: &str) -> Result<Utterance> {
        let file = tempfile::Builder::new()
            .prefix("talkboard-")
            .suffix(".wav")
            .tempfile()?;

        let output = Command::new("pico2wave")
            .arg("-l")
            .arg(self.language)
            .arg("-w")
            .arg(file.path())
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| TalkboardError::Synthesis(format!("Failed to run pico2wave: {}", e)))?;

        if !output.status.success() {
            return Err(TalkboardError::Synthesis(format!(
                "pico2wave error: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let bytes = std::fs::read(file.path())?;
        Ok(Utterance::Clip(Audio::Encoded(bytes)))
    }
}
