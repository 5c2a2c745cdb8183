//! Playback through rodio
//!
//! Opens the default output device once and creates a short-lived `Sink`
//! per utterance. WAV and MP3 clips are decoded by rodio; PCM frames are
//! queued as they arrive and playback starts with the first one.

use super::{samples_to_f32, Audio, AudioSink, PcmFormat};
use crate::{Result, TalkboardError};
use log::{debug, info};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::io::Cursor;

/// Audio sink on the default output device
pub struct RodioSink {
    /// Output stream; must outlive every sink connected to its mixer
    stream: OutputStream,

    /// Linear gain applied to each utterance (0.0-1.0)
    gain: f32,
}

impl RodioSink {
    /// Open the default output device
    pub fn new() -> Result<Self> {
        debug!("Opening default audio output");
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| TalkboardError::Device(format!("No audio output device: {}", e)))?;
        info!("Audio output opened");

        Ok(Self { stream, gain: 1.0 })
    }

    fn new_sink(&self) -> Sink {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.gain);
        sink
    }
}

impl AudioSink for RodioSink {
    fn play(&mut self, audio: &Audio) -> Result<()> {
        debug!("Playing {:?} clip", audio.container());
        let sink = self.new_sink();

        match audio {
            Audio::Encoded(bytes) => {
                let source = Decoder::new(Cursor::new(bytes.clone()))
                    .map_err(|e| TalkboardError::Audio(format!("Failed to decode clip: {}", e)))?;
                sink.append(source);
            }
            Audio::Pcm { format, samples } => {
                sink.append(SamplesBuffer::new(
                    format.channels,
                    format.sample_rate,
                    samples_to_f32(samples),
                ));
            }
        }

        sink.sleep_until_end();
        Ok(())
    }

    fn play_stream(
        &mut self,
        format: PcmFormat,
        frames: &mut dyn Iterator<Item = Vec<i16>>,
    ) -> Result<()> {
        let sink = self.new_sink();

        let mut count = 0usize;
        for frame in frames {
            if frame.is_empty() {
                continue;
            }
            count += 1;
            sink.append(SamplesBuffer::new(
                format.channels,
                format.sample_rate,
                samples_to_f32(&frame),
            ));
        }
        debug!("Queued {} PCM frames", count);

        sink.sleep_until_end();
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<()> {
        self.gain = volume.min(100) as f32 / 100.0;
        debug!("Playback gain set to {:.2}", self.gain);
        Ok(())
    }
}
