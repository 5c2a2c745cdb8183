//! Speech synthesis backends

// Offline formant voice (espeak-ng)
pub mod espeak;

// Offline voice (SVOX Pico)
pub mod pico;

// Cloud voice (Google Translate TTS)
pub mod google;

// Neural offline voice (Piper)
pub mod piper;
