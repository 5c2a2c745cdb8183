//! Configuration management

use crate::{Result, TalkboardError};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "TALKBOARD_CONFIG";

/// Application configuration for the talking keyboard
///
/// Holds the voice, cache, keyboard and feedback settings. Values are read
/// lazily from the INI document so a hand-edited file only needs the keys
/// it wants to change.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.talkboard.cfg unless overridden)
    path: PathBuf,
}

impl Config {
    /// Load configuration from disk or create default
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from an explicit path, writing defaults if missing
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| TalkboardError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| TalkboardError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Build a configuration from an in-memory INI document
    pub fn from_ini(ini: Ini) -> Self {
        Self {
            ini,
            path: PathBuf::from("<memory>"),
        }
    }

    /// Configuration with every value at its default
    pub fn defaults() -> Self {
        Self::from_ini(Self::default_config())
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| TalkboardError::Config(format!("Failed to save config: {}", e)))
    }

    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".talkboard.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("general"))
            .set("log_file", "talkboard.log");

        ini.with_section(Some("voice"))
            .set("language", "fr-CH")
            .set("synthesizer", "auto")
            .set("audio", "rodio")
            .set("pad_letters", "true")
            .set("greeting", "Bonjour, bienvenue sur le clavier parlant.")
            .set("farewell", "Au revoir")
            .set("volume", "100")
            .set("volume_step", "5")
            .set("piper_binary", "piper");

        ini.with_section(Some("cloud"))
            .set("retries", "3")
            .set("retry_delay_ms", "500")
            .set("timeout_secs", "10");

        ini.with_section(Some("cache"))
            .set("file", "common_words.json")
            .set("promotion_threshold", "2")
            .set("save_interval_secs", "300");

        ini.with_section(Some("keyboard"))
            .set("source", "auto")
            .set("device", "auto")
            .set("layout", "azerty")
            .set("exit_word", "exitnowarn");

        ini.with_section(Some("feedback"))
            .set("lcd", "log")
            .set("led", "log")
            .set("led_count", "10");

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .trim()
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get an optional, non-empty string value
    fn get_optional(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get_from(Some(section), key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Log destination while the terminal is in raw mode
    pub fn log_file(&self) -> PathBuf {
        PathBuf::from(self.get_string("general", "log_file", "talkboard.log"))
    }

    // Voice settings

    /// Locale tag used for synthesis and number spelling (e.g. "fr-CH")
    pub fn language(&self) -> String {
        self.get_string("voice", "language", "fr-CH")
    }

    /// Synthesizer backend name
    pub fn synthesizer(&self) -> String {
        self.get_string("voice", "synthesizer", "auto").to_lowercase()
    }

    /// Audio backend name
    pub fn audio(&self) -> String {
        self.get_string("voice", "audio", "rodio").to_lowercase()
    }

    /// Should single letters be wrapped in spaces before synthesis?
    pub fn pad_letters(&self) -> bool {
        self.get_bool("voice", "pad_letters", true)
    }

    /// Sentence spoken once at startup
    pub fn greeting(&self) -> Option<String> {
        self.get_optional("voice", "greeting")
    }

    /// Sentence spoken when the exit command is typed
    pub fn farewell(&self) -> Option<String> {
        self.get_optional("voice", "farewell")
    }

    /// Initial playback volume (0-100)
    pub fn volume(&self) -> u8 {
        self.get_int("voice", "volume", 100).clamp(0, 100) as u8
    }

    /// Volume change per volume key press
    pub fn volume_step(&self) -> u8 {
        self.get_int("voice", "volume_step", 5).clamp(1, 100) as u8
    }

    /// espeak-ng voice; falls back to the language tag
    pub fn espeak_voice(&self) -> String {
        self.get_optional("voice", "espeak_voice")
            .unwrap_or_else(|| self.language())
    }

    /// Path to the Piper .onnx model
    pub fn piper_model(&self) -> Option<PathBuf> {
        self.get_optional("voice", "piper_model").map(PathBuf::from)
    }

    /// Piper executable
    pub fn piper_binary(&self) -> String {
        self.get_string("voice", "piper_binary", "piper")
    }

    // Cloud settings

    /// Attempts made against the cloud voice before giving up
    pub fn cloud_retries(&self) -> u32 {
        self.get_int("cloud", "retries", 3).max(1) as u32
    }

    /// Base delay between cloud attempts
    pub fn cloud_retry_delay(&self) -> Duration {
        Duration::from_millis(self.get_int("cloud", "retry_delay_ms", 500).max(0) as u64)
    }

    /// Per-request timeout for the cloud voice
    pub fn cloud_timeout(&self) -> Duration {
        Duration::from_secs(self.get_int("cloud", "timeout_secs", 10).max(1) as u64)
    }

    // Cache settings

    /// Snapshot file, relative to the working directory unless absolute
    pub fn cache_file(&self) -> PathBuf {
        PathBuf::from(self.get_string("cache", "file", "common_words.json"))
    }

    /// Recorded hits after which an entry is persisted
    pub fn promotion_threshold(&self) -> u32 {
        self.get_int("cache", "promotion_threshold", 2).max(1) as u32
    }

    /// Period of the background snapshot
    pub fn save_interval(&self) -> Duration {
        Duration::from_secs(self.get_int("cache", "save_interval_secs", 300).max(1) as u64)
    }

    // Keyboard settings

    /// Keystroke source name
    pub fn key_source(&self) -> String {
        self.get_string("keyboard", "source", "auto").to_lowercase()
    }

    /// Explicit input device path, `None` for discovery
    pub fn key_device(&self) -> Option<PathBuf> {
        self.get_optional("keyboard", "device")
            .filter(|d| !d.eq_ignore_ascii_case("auto"))
            .map(PathBuf::from)
    }

    /// Physical keyboard layout name
    pub fn layout(&self) -> String {
        self.get_string("keyboard", "layout", "azerty").to_lowercase()
    }

    /// Word that terminates the program when flushed
    pub fn exit_word(&self) -> String {
        self.get_string("keyboard", "exit_word", "exitnowarn").to_lowercase()
    }

    // Feedback settings

    /// LCD driver name
    pub fn lcd(&self) -> String {
        self.get_string("feedback", "lcd", "log").to_lowercase()
    }

    /// LED driver name
    pub fn led(&self) -> String {
        self.get_string("feedback", "led", "log").to_lowercase()
    }

    /// Number of pixels on the LED strip
    pub fn led_count(&self) -> usize {
        self.get_int("feedback", "led_count", 10).clamp(1, 1024) as usize
    }
}
