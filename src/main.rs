//! Talkboard main entry point
//!
//! Acquires the synthesizer, the audio sink and the keyboard, then hands
//! them to the engine until the exit word is typed. Failing to acquire any
//! of them stops the program before the first key is read.

use log::{debug, error, info, warn, LevelFilter};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use talkboard::audio::create_sink;
use talkboard::cache::{PeriodicSaver, SpeechCache};
use talkboard::engine::Engine;
use talkboard::feedback::create_feedback;
use talkboard::input::{open_source, resolve_source, SourceKind};
use talkboard::platform::is_raspberry_pi;
use talkboard::speech::create_synthesizer;
use talkboard::state::config::Config;
use talkboard::state::VoiceConfig;
use talkboard::Result;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("talkboard: {}", e);
            process::exit(1);
        }
    };
    let source = resolve_source(&config);
    let log_file = source
        .as_ref()
        .ok()
        .and_then(|kind| log_file_for(kind, &config));
    init_logging(log_level(&args), log_file.as_deref());

    info!(
        "{} version {} starting",
        talkboard::APP_NAME,
        talkboard::VERSION
    );
    info!("Config loaded from {}", config.path().display());

    if let Err(e) = source.and_then(|kind| run(&config, &kind)) {
        error!("Fatal error: {}", e);
        eprintln!("talkboard: {}", e);
        process::exit(1);
    }
}

/// Raw mode drops the carriage return from newlines, so logs written to
/// the terminal would staircase. Log to a file instead.
fn log_file_for(kind: &SourceKind, config: &Config) -> Option<PathBuf> {
    match kind {
        SourceKind::Terminal => Some(config.log_file()),
        SourceKind::Evdev(_) => None,
    }
}

fn init_logging(level: Option<LevelFilter>, log_file: Option<&Path>) {
    let mut builder = match level {
        Some(level) => {
            let mut builder = env_logger::Builder::new();
            builder.filter_level(level);
            builder
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")),
    };

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!(
                    "Warning: Failed to open {} for logging: {}",
                    path.display(),
                    e
                );
                eprintln!("Continuing with logging to stderr...");
            }
        }
    }

    builder.init();
}

/// Level requested with `--loglevel LEVEL` or `-d`/`--debug`
fn log_level(args: &[String]) -> Option<LevelFilter> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let value = match arg.as_str() {
            "-d" | "--debug" => return Some(LevelFilter::Debug),
            "--loglevel" => iter.next().map(String::as_str),
            other => other.strip_prefix("--loglevel="),
        };
        if let Some(value) = value {
            return Some(value.parse().unwrap_or_else(|_| {
                eprintln!("Unknown log level '{}', using warn", value);
                LevelFilter::Warn
            }));
        }
    }
    None
}

fn run(config: &Config, source: &SourceKind) -> Result<()> {
    if is_raspberry_pi() {
        info!("Running on a Raspberry Pi");
    }

    let voice = VoiceConfig::from_config(config);

    // Hardware and backends: any failure here is fatal
    let synth = create_synthesizer(config)?;
    info!("Synthesizer: {}", synth.name());
    let sink = create_sink(config)?;
    let mut keys = open_source(source, config)?;
    let feedback = create_feedback(config);

    let cache_path = config.cache_file();
    let cache = SpeechCache::load_snapshot(&cache_path, config.promotion_threshold());
    info!(
        "{} cached utterances, saved after {} plays",
        cache.len(),
        cache.threshold()
    );
    let saver = PeriodicSaver::start(cache.clone(), cache_path.clone(), config.save_interval())?;

    let mut engine = Engine::new(voice, synth, sink, cache.clone(), Box::new(feedback));
    engine.greet();
    let result = engine.run(keys.as_mut());

    saver.stop();
    match cache.save_snapshot(&cache_path) {
        Ok(count) => info!("Saved {} cached utterances", count),
        Err(e) => warn!("Could not save the cache: {}", e),
    }

    debug!("Shutting down");
    result
}
