//! Process-wide voice settings
//!
//! `VoiceConfig` is read from the configuration file once at startup. Only
//! the engine thread changes it afterwards, through the volume keys.

pub mod config;

use crate::text::Locale;
use config::Config;
use log::info;

/// Voice and volume settings used by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    /// Locale used for spelling numbers
    pub locale: Locale,

    /// Speak letters as " c " rather than "c"
    pub pad_letters: bool,

    /// Word that stops the program when flushed
    pub exit_word: String,

    /// Spoken once at startup
    pub greeting: Option<String>,

    /// Spoken when exiting
    pub farewell: Option<String>,

    volume: u8,
    step: u8,

    /// Volume to restore when unmuting
    muted_from: Option<u8>,
}

impl VoiceConfig {
    pub fn from_config(config: &Config) -> Self {
        let language = config.language();
        let locale = Locale::from_tag(&language);
        info!("Voice language {} (numbers read as {})", language, locale);

        Self {
            locale,
            pad_letters: config.pad_letters(),
            exit_word: config.exit_word(),
            greeting: config.greeting(),
            farewell: config.farewell(),
            volume: config.volume(),
            step: config.volume_step(),
            muted_from: None,
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted_from.is_some()
    }

    /// Raise the volume by one step, returning the new level
    pub fn volume_up(&mut self) -> u8 {
        self.muted_from = None;
        self.volume = self.volume.saturating_add(self.step).min(100);
        self.volume
    }

    /// Lower the volume by one step, returning the new level
    pub fn volume_down(&mut self) -> u8 {
        self.muted_from = None;
        self.volume = self.volume.saturating_sub(self.step);
        self.volume
    }

    /// Mute, or restore the level in use before muting
    pub fn toggle_mute(&mut self) -> u8 {
        match self.muted_from.take() {
            Some(previous) => self.volume = previous,
            None => {
                self.muted_from = Some(self.volume);
                self.volume = 0;
            }
        }
        self.volume
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self::from_config(&Config::defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice_with(volume: &str, step: &str) -> VoiceConfig {
        let mut config = Config::defaults();
        config.set("voice", "volume", volume);
        config.set("voice", "volume_step", step);
        VoiceConfig::from_config(&config)
    }

    #[test]
    fn test_defaults() {
        let voice = VoiceConfig::default();
        assert_eq!(voice.locale, Locale::SwissFrench);
        assert_eq!(voice.exit_word, "exitnowarn");
        assert!(voice.pad_letters);
        assert_eq!(voice.volume(), 100);
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut voice = voice_with("98", "5");
        assert_eq!(voice.volume_up(), 100);
        assert_eq!(voice.volume_up(), 100);

        let mut voice = voice_with("3", "5");
        assert_eq!(voice.volume_down(), 0);
    }

    #[test]
    fn test_mute_restores_level() {
        let mut voice = voice_with("60", "5");
        assert_eq!(voice.toggle_mute(), 0);
        assert!(voice.is_muted());
        assert_eq!(voice.toggle_mute(), 60);
        assert!(!voice.is_muted());
    }

    #[test]
    fn test_volume_key_while_muted_unmutes() {
        let mut voice = voice_with("60", "5");
        voice.toggle_mute();
        assert_eq!(voice.volume_up(), 5);
        assert!(!voice.is_muted());
    }
}
