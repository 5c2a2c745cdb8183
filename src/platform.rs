//! Host detection utilities

use log::debug;
use std::fs;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

/// Host probed to decide whether the cloud voice is usable
pub const PROBE_HOST: &str = "translate.google.com:443";

/// Device-tree model string, always exposed by the Pi firmware
pub const MODEL_PATH: &str = "/proc/device-tree/model";

/// Detect if running on a Raspberry Pi
pub fn is_raspberry_pi() -> bool {
    model_is_raspberry_pi(Path::new(MODEL_PATH))
}

/// Does the model file at `path` name a Raspberry Pi?
pub fn model_is_raspberry_pi(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|model| model.to_lowercase().contains("raspberry pi"))
        .unwrap_or(false)
}

/// Check whether there is a working internet connection
///
/// Resolves `host` and opens a TCP connection with the given timeout.
/// Any failure along the way means "offline".
pub fn internet_available(host: &str, timeout: Duration) -> bool {
    let addrs = match host.to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            debug!("Could not resolve {}: {}", host, e);
            return false;
        }
    };

    for addr in addrs {
        if TcpStream::connect_timeout(&addr, timeout).is_ok() {
            return true;
        }
    }

    debug!("No route to {}", host);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raspberry_pi_model() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model");

        // The firmware string ends with a NUL byte
        fs::write(&model, b"Raspberry Pi 4 Model B Rev 1.4\0").unwrap();
        assert!(model_is_raspberry_pi(&model));

        fs::write(&model, b"Pine64 RockPro64\0").unwrap();
        assert!(!model_is_raspberry_pi(&model));

        assert!(!model_is_raspberry_pi(&dir.path().join("absent")));
    }

    #[test]
    fn test_unresolvable_host_is_offline() {
        assert!(!internet_available(
            "no-such-host.invalid:80",
            Duration::from_millis(200)
        ));
    }
}
