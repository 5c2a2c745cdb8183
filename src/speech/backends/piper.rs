//! Neural offline voice using Piper
//!
//! Piper reads text on stdin and, with `--output-raw`, writes 16-bit mono
//! PCM to stdout while it synthesizes. The frames are streamed to the sink
//! as they arrive.
//!
//! Dependencies:
//! - piper (https://github.com/rhasspy/piper) and a voice model
//!   (`<voice>.onnx` plus `<voice>.onnx.json`)

use crate::audio::PcmFormat;
use crate::speech::{PcmStream, Synthesizer, Utterance};
use crate::{Result, TalkboardError};
use log::{debug, warn};
use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

/// Sample rate used by most Piper voices
const DEFAULT_SAMPLE_RATE: u32 = 22_050;

/// Bytes read from piper per frame
const FRAME_BYTES: usize = 4096;

/// Piper synthesizer
pub struct PiperSynth {
    binary: String,
    model: PathBuf,
    format: PcmFormat,
}

impl PiperSynth {
    pub fn new(binary: &str, model: &Path) -> Result<Self> {
        if !model.exists() {
            return Err(TalkboardError::Synthesis(format!(
                "Piper model not found: {}",
                model.display()
            )));
        }

        let sample_rate = Self::read_sample_rate(model).unwrap_or_else(|| {
            warn!(
                "No sample rate in model config, assuming {} Hz",
                DEFAULT_SAMPLE_RATE
            );
            DEFAULT_SAMPLE_RATE
        });
        debug!("Piper model {} at {} Hz", model.display(), sample_rate);

        Ok(Self {
            binary: binary.to_string(),
            model: model.to_path_buf(),
            format: PcmFormat::mono(sample_rate),
        })
    }

    /// Read `audio.sample_rate` from the `<model>.onnx.json` next to the model
    fn read_sample_rate(model: &Path) -> Option<u32> {
        let mut config = model.as_os_str().to_owned();
        config.push(".json");
        let content = std::fs::read_to_string(PathBuf::from(config)).ok()?;
        let json: Value = serde_json::from_str(&content).ok()?;
        json.get("audio")?
            .get("sample_rate")?
            .as_u64()
            .and_then(|rate| u32::try_from(rate).ok())
    }
}

impl Synthesizer for PiperSynth {
    fn name(&self) -> &'static str {
        "piper"
    }

    fn synthesize(&mut self, text: &str) -> Result<Utterance> {
        debug!("piper synthesizing '{}'", text);

        let mut child = Command::new(&self.binary)
            .arg("--model")
            .arg(&self.model)
            .arg("--output-raw")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| TalkboardError::Synthesis(format!("Failed to start piper: {}", e)))?;

        // Closing stdin tells piper the utterance is complete
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin
                .write_all(text.trim().as_bytes())
                .and_then(|()| stdin.write_all(b"\n")),
            None => Ok(()),
        };
        if let Err(e) = sent {
            let _ = child.kill();
            let _ = child.wait();
            return Err(TalkboardError::Synthesis(format!(
                "Could not send text to piper: {}",
                e
            )));
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TalkboardError::Synthesis("piper has no stdout".to_string()))?;

        Ok(Utterance::Stream(PcmStream::new(
            self.format,
            PiperFrames {
                child,
                stdout,
                carry: None,
                done: false,
            },
        )))
    }
}

/// Iterator over PCM frames read from a running piper process
struct PiperFrames {
    child: Child,
    stdout: ChildStdout,
    /// Odd byte left over from the previous read
    carry: Option<u8>,
    done: bool,
}

impl PiperFrames {
    fn finish(&mut self) -> Option<Result<Vec<i16>>> {
        self.done = true;
        match self.child.wait() {
            Ok(status) if status.success() => None,
            Ok(status) => Some(Err(TalkboardError::Synthesis(format!(
                "piper exited with {}",
                status
            )))),
            Err(e) => Some(Err(e.into())),
        }
    }
}

impl Iterator for PiperFrames {
    type Item = Result<Vec<i16>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = vec![0u8; FRAME_BYTES];
        let n = match self.stdout.read(&mut buf) {
            Ok(0) => return self.finish(),
            Ok(n) => n,
            Err(e) => {
                self.done = true;
                let _ = self.child.kill();
                let _ = self.child.wait();
                return Some(Err(e.into()));
            }
        };

        let mut bytes = Vec::with_capacity(n + 1);
        bytes.extend(self.carry.take());
        bytes.extend_from_slice(&buf[..n]);
        if bytes.len() % 2 == 1 {
            self.carry = bytes.pop();
        }

        Some(Ok(bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()))
    }
}

impl Drop for PiperFrames {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
