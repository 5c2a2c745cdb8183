//! Playback through the ALSA command-line tools
//!
//! WAV and raw PCM go to `aplay`, MP3 to `mpg123`. Volume is set on the
//! ALSA mixer with `amixer`, like a physical volume knob.
//!
//! Dependencies:
//! - alsa-utils (aplay, amixer)
//! - mpg123, only needed for MP3 clips from the cloud voice

use super::{Audio, AudioSink, Container, PcmFormat};
use crate::{Result, TalkboardError};
use log::{debug, warn};
use std::io::Write;
use std::process::{Child, Command, Stdio};

/// Mixer control adjusted by volume keys
const MIXER_CONTROL: &str = "PCM";

/// Audio sink spawning one player process per utterance
pub struct CommandSink {
    /// Whether mpg123 was found at startup
    has_mpg123: bool,
}

impl CommandSink {
    /// Verify aplay is available
    pub fn new() -> Result<Self> {
        if !Self::available("aplay") {
            return Err(TalkboardError::Device(
                "aplay not found. Install with: sudo apt install alsa-utils".to_string(),
            ));
        }

        let has_mpg123 = Self::available("mpg123");
        if !has_mpg123 {
            warn!("mpg123 not found, MP3 clips cannot be played");
        }

        Ok(Self { has_mpg123 })
    }

    fn available(program: &str) -> bool {
        Command::new(program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn spawn(program: &str, args: &[String]) -> Result<Child> {
        debug!("Spawning {} {:?}", program, args);
        Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TalkboardError::Audio(format!("Failed to start {}: {}", program, e)))
    }

    fn raw_args(format: PcmFormat) -> Vec<String> {
        vec![
            "-q".to_string(),
            "-t".to_string(),
            "raw".to_string(),
            "-f".to_string(),
            "S16_LE".to_string(),
            "-r".to_string(),
            format.sample_rate.to_string(),
            "-c".to_string(),
            format.channels.to_string(),
            "-".to_string(),
        ]
    }

    /// Close stdin and wait for the player to drain its buffer
    fn finish(mut child: Child, program: &str) -> Result<()> {
        drop(child.stdin.take());
        let output = child.wait_with_output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(TalkboardError::Audio(format!(
                "{} failed: {}",
                program,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    /// Kill and reap a player whose stdin could not be written
    fn abort(mut child: Child, program: &str, err: std::io::Error) -> TalkboardError {
        let _ = child.kill();
        if let Err(e) = child.wait() {
            warn!("Could not reap {}: {}", program, e);
        }
        TalkboardError::Audio(format!("Writing to {} failed: {}", program, err))
    }

    /// Write `bytes` to a spawned player and wait for it
    fn feed(mut child: Child, program: &str, bytes: &[u8]) -> Result<()> {
        let written = match child.stdin.as_mut() {
            Some(stdin) => stdin.write_all(bytes),
            None => Ok(()),
        };
        match written {
            Ok(()) => Self::finish(child, program),
            Err(e) => Err(Self::abort(child, program, e)),
        }
    }

    fn pipe(program: &str, args: &[String], bytes: &[u8]) -> Result<()> {
        let child = Self::spawn(program, args)?;
        Self::feed(child, program, bytes)
    }
}

impl AudioSink for CommandSink {
    fn play(&mut self, audio: &Audio) -> Result<()> {
        match audio {
            Audio::Encoded(bytes) => match Container::sniff(bytes) {
                Container::Mp3 if self.has_mpg123 => {
                    Self::pipe("mpg123", &["-q".to_string(), "-".to_string()], bytes)
                }
                Container::Mp3 => Err(TalkboardError::Audio(
                    "MP3 clip but mpg123 is not installed".to_string(),
                )),
                _ => Self::pipe("aplay", &["-q".to_string(), "-".to_string()], bytes),
            },
            Audio::Pcm { format, samples } => {
                let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
                Self::pipe("aplay", &Self::raw_args(*format), &bytes)
            }
        }
    }

    fn play_stream(
        &mut self,
        format: PcmFormat,
        frames: &mut dyn Iterator<Item = Vec<i16>>,
    ) -> Result<()> {
        let mut child = Self::spawn("aplay", &Self::raw_args(format))?;

        let written = match child.stdin.as_mut() {
            Some(stdin) => (&mut &mut *frames).try_for_each(|frame| {
                let bytes: Vec<u8> = frame.iter().flat_map(|s| s.to_le_bytes()).collect();
                stdin.write_all(&bytes)
            }),
            None => Ok(()),
        };

        match written {
            Ok(()) => Self::finish(child, "aplay"),
            Err(e) => Err(Self::abort(child, "aplay", e)),
        }
    }

    fn set_volume(&mut self, volume: u8) -> Result<()> {
        let level = format!("{}%", volume.min(100));
        let status = Command::new("amixer")
            .args(["-q", "sset", MIXER_CONTROL, &level])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| TalkboardError::Audio(format!("Failed to run amixer: {}", e)))?;

        if status.success() {
            debug!("Mixer {} set to {}", MIXER_CONTROL, level);
            Ok(())
        } else {
            Err(TalkboardError::Audio(format!(
                "amixer could not set {} to {}",
                MIXER_CONTROL, level
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_args() {
        let args = CommandSink::raw_args(PcmFormat::mono(22_050));
        assert!(args.windows(2).any(|w| w[0] == "-r" && w[1] == "22050"));
        assert!(args.windows(2).any(|w| w[0] == "-c" && w[1] == "1"));
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }

    #[test]
    fn test_player_exiting_early_is_reaped() {
        // `true` exits without reading, so the write hits a closed pipe
        let child = CommandSink::spawn("true", &[]).unwrap();
        let pid = child.id();
        let clip = vec![0u8; 8 * 1024 * 1024];

        assert!(matches!(
            CommandSink::feed(child, "true", &clip),
            Err(TalkboardError::Audio(_))
        ));
        assert!(!std::path::Path::new(&format!("/proc/{}", pid)).exists());
    }
}
