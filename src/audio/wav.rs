//! WAV encoding for PCM clips

use super::PcmFormat;
use crate::{Result, TalkboardError};
use std::io::Cursor;

/// Wrap 16-bit PCM samples in a WAV container
pub fn encode(format: PcmFormat, samples: &[i16]) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| TalkboardError::Audio(format!("Failed to start WAV: {}", e)))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| TalkboardError::Audio(format!("Failed to write WAV: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| TalkboardError::Audio(format!("Failed to finish WAV: {}", e)))?;
    }

    Ok(cursor.into_inner())
}
