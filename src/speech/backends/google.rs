//! Cloud voice using the Google Translate TTS endpoint
//!
//! Returns MP3 clips. Network failures are reported as errors; wrap this
//! backend in [`crate::speech::Retry`] to get bounded retries.

use crate::audio::Audio;
use crate::speech::{Synthesizer, Utterance};
use crate::{Result, TalkboardError};
use log::debug;
use reqwest::blocking::Client;
use std::time::Duration;

const ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Longest text accepted by the endpoint in one request
const MAX_CHARS: usize = 200;

/// Google Translate TTS synthesizer
pub struct GoogleSynth {
    client: Client,

    /// Two-letter language code
    language: String,
}

impl GoogleSynth {
    pub fn new(language: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("talkboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            language: Self::language_code(language),
        })
    }

    /// The endpoint only knows base languages: "fr-CH" becomes "fr"
    fn language_code(tag: &str) -> String {
        tag.trim()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_lowercase()
    }
}

impl Synthesizer for GoogleSynth {
    fn name(&self) -> &'static str {
        "google-tts"
    }

    fn synthesize(&mut self, text: &str) -> Result<Utterance> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TalkboardError::Synthesis("nothing to say".to_string()));
        }
        if text.chars().count() > MAX_CHARS {
            return Err(TalkboardError::Synthesis(format!(
                "text longer than {} characters",
                MAX_CHARS
            )));
        }

        debug!("Requesting cloud speech for '{}' ({})", text, self.language);
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("q", text),
                ("tl", self.language.as_str()),
                ("client", "tw-ob"),
            ])
            .send()?
            .error_for_status()?;

        let bytes = response.bytes()?;
        if bytes.is_empty() {
            return Err(TalkboardError::Synthesis("empty response".to_string()));
        }

        Ok(Utterance::Clip(Audio::Encoded(bytes.to_vec())))
    }
}
