//! Word assembly engine
//!
//! Consumes key events one at a time. Each accepted letter is spoken at once
//! and added to the pending word; a delimiter speaks the whole word. Audio is
//! looked up in the [`SpeechCache`] before the synthesizer is asked, and every
//! playback counts as a cache hit.
//!
//! Events are processed strictly in order on the calling thread: the engine
//! waits for each playback to finish before reading the next key.

pub mod word;

pub use word::PendingWord;

use crate::audio::{Audio, AudioSink};
use crate::cache::SpeechCache;
use crate::feedback::Feedback;
use crate::input::{KeyEvent, KeySource};
use crate::speech::{Synthesizer, Utterance};
use crate::state::VoiceConfig;
use crate::text::normalize_word;
use crate::Result;
use log::{debug, error, info, warn};

/// What the caller should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The talking keyboard state machine
pub struct Engine {
    voice: VoiceConfig,
    synth: Box<dyn Synthesizer>,
    sink: Box<dyn AudioSink>,
    cache: SpeechCache,
    feedback: Box<dyn Feedback>,
    word: PendingWord,
}

impl Engine {
    pub fn new(
        voice: VoiceConfig,
        synth: Box<dyn Synthesizer>,
        sink: Box<dyn AudioSink>,
        cache: SpeechCache,
        feedback: Box<dyn Feedback>,
    ) -> Self {
        Self {
            voice,
            synth,
            sink,
            cache,
            feedback,
            word: PendingWord::new(),
        }
    }

    /// Letters typed since the last delimiter
    pub fn pending(&self) -> &str {
        self.word.as_str()
    }

    pub fn voice(&self) -> &VoiceConfig {
        &self.voice
    }

    pub fn cache(&self) -> &SpeechCache {
        &self.cache
    }

    /// Speak the configured greeting, if any
    pub fn greet(&mut self) {
        let Some(greeting) = self.voice.greeting.clone() else {
            return;
        };
        if let Err(e) = self.speak(&greeting) {
            warn!("Could not play greeting: {}", e);
        }
    }

    /// Read and handle events until the exit command
    ///
    /// Errors while handling an event are logged and reported to the
    /// feedback devices; only a failing key source ends the loop early.
    pub fn run(&mut self, source: &mut dyn KeySource) -> Result<()> {
        info!("Waiting for keys");
        loop {
            let event = source.next_event()?;
            match self.handle(event) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(e) => {
                    error!("Error processing {:?}: {}", event, e);
                    self.feedback.on_error();
                }
            }
        }
    }

    /// Handle one key event
    pub fn handle(&mut self, event: KeyEvent) -> Result<Flow> {
        match event {
            KeyEvent::Char(' ' | '\n' | '\r') | KeyEvent::Delimiter => self.flush(),
            KeyEvent::Char(c) => self.letter(c),
            KeyEvent::Exit => Ok(self.exit()),
            KeyEvent::VolumeUp => {
                let level = self.voice.volume_up();
                self.apply_volume(level)
            }
            KeyEvent::VolumeDown => {
                let level = self.voice.volume_down();
                self.apply_volume(level)
            }
            KeyEvent::Mute => {
                let level = self.voice.toggle_mute();
                self.apply_volume(level)
            }
            KeyEvent::Unmapped => Ok(Flow::Continue),
        }
    }

    fn letter(&mut self, c: char) -> Result<Flow> {
        if !self.word.push(c) {
            debug!("Ignoring '{}'", c);
            return Ok(Flow::Continue);
        }

        let lower: String = c.to_lowercase().collect();
        debug!("Got letter: {}", lower);
        for l in lower.chars() {
            self.feedback.on_letter(l);
        }

        let key = if self.voice.pad_letters {
            format!(" {} ", lower)
        } else {
            lower
        };
        self.speak(&key)?;
        Ok(Flow::Continue)
    }

    fn flush(&mut self) -> Result<Flow> {
        if self.word.is_empty() {
            return Ok(Flow::Continue);
        }

        let word = self.word.take();
        if word == self.voice.exit_word {
            return Ok(self.exit());
        }

        let text = normalize_word(&word, self.voice.locale);
        info!("Playing word: {}", text);
        self.feedback.on_word_flushed(&text);
        self.speak(&text)?;
        Ok(Flow::Continue)
    }

    fn exit(&mut self) -> Flow {
        info!("Exit requested");
        self.word.clear();
        self.feedback.on_clear();
        if let Some(farewell) = self.voice.farewell.clone() {
            if let Err(e) = self.speak(&farewell) {
                warn!("Could not play farewell: {}", e);
            }
        }
        Flow::Exit
    }

    fn apply_volume(&mut self, level: u8) -> Result<Flow> {
        info!("Volume: {}", level);
        self.feedback.on_volume_changed(level);
        self.sink.set_volume(level)?;
        Ok(Flow::Continue)
    }

    /// Play `text`, from the cache when possible
    ///
    /// A synthesis failure is not an error: the utterance is skipped.
    pub fn speak(&mut self, text: &str) -> Result<()> {
        if let Some(audio) = self.cache.lookup(text) {
            debug!("Cache hit for '{}'", text);
            match self.sink.play(&audio) {
                Ok(()) => {
                    self.cache.record_hit(text);
                    return Ok(());
                }
                // Unplayable audio is evicted and synthesized again
                Err(e) => {
                    warn!("Dropping cached audio for '{}': {}", text, e);
                    self.cache.remove(text);
                }
            }
        }

        let utterance = match self.synth.synthesize(text) {
            Ok(utterance) => utterance,
            Err(e) => {
                warn!("No audio from {} for '{}': {}", self.synth.name(), text, e);
                return Ok(());
            }
        };

        match utterance {
            Utterance::Clip(audio) => {
                if audio.is_empty() {
                    warn!("{} returned no audio for '{}'", self.synth.name(), text);
                    return Ok(());
                }
                let audio = self.cache.store(text, audio);
                self.sink.play(&audio)?;
            }
            Utterance::Stream(mut stream) => {
                let format = stream.format;
                let mut samples = Vec::new();
                let mut complete = true;

                let mut frames = stream.by_ref().map_while(|frame| match frame {
                    Ok(frame) => {
                        samples.extend_from_slice(&frame);
                        Some(frame)
                    }
                    Err(e) => {
                        warn!("Speech stream for '{}' failed: {}", text, e);
                        complete = false;
                        None
                    }
                });
                self.sink.play_stream(format, &mut frames)?;
                drop(frames);

                // A truncated stream is played but never cached
                if !complete || samples.is_empty() {
                    return Ok(());
                }
                self.cache.store(text, Audio::Pcm { format, samples });
            }
        }

        self.cache.record_hit(text);
        Ok(())
    }
}
