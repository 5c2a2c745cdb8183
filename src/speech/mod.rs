//! Speech synthesis system

pub mod backends;
pub mod retry;
pub mod synth;

pub use retry::{Retry, RetryPolicy};
pub use synth::{create_synthesizer, PcmStream, Synthesizer, Utterance};
