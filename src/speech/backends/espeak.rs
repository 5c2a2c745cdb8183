//! Offline formant voice using espeak-ng
//!
//! espeak-ng writes a WAV clip to stdout with `--stdout`, which is kept as
//! an encoded clip and cached like any other.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::audio::Audio;
use crate::speech::{Synthesizer, Utterance};
use crate::{Result, TalkboardError};
use log::debug;
use std::process::{Command, Stdio};

/// Default speaking rate in words per minute
const DEFAULT_SPEED: u16 = 150;

/// espeak-ng synthesizer
pub struct EspeakSynth {
    /// Path to espeak-ng
    espeak_path: String,

    /// espeak-ng voice, e.g. "fr" or "fr-ch"
    voice: String,

    /// Words per minute
    speed: u16,
}

impl EspeakSynth {
    /// Create a synthesizer for a language tag such as "fr-CH"
    pub fn new(language: &str) -> Result<Self> {
        let espeak_path = Self::find_espeak()?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self {
            espeak_path,
            voice: Self::voice_for(language),
            speed: DEFAULT_SPEED,
        })
    }

    /// Find espeak-ng executable
    fn find_espeak() -> Result<String> {
        let paths = ["espeak-ng", "/usr/bin/espeak-ng", "espeak"];

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(TalkboardError::Synthesis(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// espeak-ng voice names are lowercase with a hyphen ("fr-fr", "en-us")
    fn voice_for(language: &str) -> String {
        language.trim().to_lowercase().replace('_', "-")
    }
}

impl Synthesizer for EspeakSynth {
    fn name(&self) -> &'static str {
        "espeak-ng"
    }

    fn synthesize(&mut self, text: &str) -> Result<Utterance> {
        debug!("espeak-ng synthesizing '{}'", text);

        let output = Command::new(&self.espeak_path)
            .arg("--stdout")
            .arg("-v")
            .arg(&self.voice)
            .arg("-s")
            .arg(self.speed.to_string())
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| TalkboardError::Synthesis(format!("Failed to run espeak-ng: {}", e)))?;

        if !output.status.success() {
            return Err(TalkboardError::Synthesis(format!(
                "espeak-ng error: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(Utterance::Clip(Audio::Encoded(output.stdout)))
    }
}
