//! Talkboard - a talking keyboard
//!
//! Every key typed on an attached keyboard is spoken aloud, and each word is
//! spoken again when it is completed. Built for a Raspberry Pi with a USB
//! keyboard, a speaker, and optionally an LCD and an LED strip.

pub mod audio;
pub mod cache;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod input;
pub mod platform;
pub mod speech;
pub mod state;
pub mod text;

pub use error::{Result, TalkboardError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "talkboard";
