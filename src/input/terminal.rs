//! Raw terminal keystroke source
//!
//! Puts stdin in raw mode so every key arrives immediately, and decodes the
//! byte stream into key events. The terminal is restored when the source is
//! dropped.

use super::{KeyEvent, KeySource};
use crate::{Result, TalkboardError};
use log::debug;
use nix::libc;
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const ESC: u8 = 0x1b;

/// How long to wait for the rest of an escape sequence
const ESCAPE_TIMEOUT_MS: libc::c_int = 20;

/// Set raw mode on a terminal file descriptor, returning the previous attributes
pub fn set_raw_mode(fd: RawFd) -> Result<libc::termios> {
    let mut original: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
        return Err(TalkboardError::Device(format!(
            "stdin is not a terminal: {}",
            io::Error::last_os_error()
        )));
    }

    let mut raw = original;
    unsafe {
        libc::cfmakeraw(&mut raw);
        libc::tcsetattr(fd, libc::TCSANOW, &raw);
    }

    Ok(original)
}

/// Restore terminal attributes
pub fn restore_termios(fd: RawFd, termios: &libc::termios) {
    unsafe {
        libc::tcsetattr(fd, libc::TCSANOW, termios);
    }
}

/// Restores the terminal attributes when dropped
pub struct TermiosGuard {
    fd: RawFd,
    termios: libc::termios,
}

impl TermiosGuard {
    pub fn new(fd: RawFd) -> Result<Self> {
        let termios = set_raw_mode(fd)?;
        Ok(Self { fd, termios })
    }
}

impl Drop for TermiosGuard {
    fn drop(&mut self) {
        restore_termios(self.fd, &self.termios);
        debug!("Terminal attributes restored");
    }
}

/// Is another byte ready on `fd` within `timeout_ms`?
fn byte_pending(fd: RawFd, timeout_ms: libc::c_int) -> bool {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let ready = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
    ready > 0 && pfd.revents & libc::POLLIN != 0
}

/// Key events decoded from a terminal byte stream
pub struct TerminalSource {
    reader: Box<dyn Read + Send>,
    /// Set when reading a real terminal; used to swallow escape sequences
    fd: Option<RawFd>,
    _guard: Option<TermiosGuard>,
}

impl TerminalSource {
    /// Read keys from stdin in raw mode
    pub fn stdin() -> Result<Self> {
        let fd = io::stdin().as_raw_fd();
        let guard = TermiosGuard::new(fd)?;
        debug!("Reading keys from the terminal");
        Ok(Self {
            reader: Box::new(io::stdin()),
            fd: Some(fd),
            _guard: Some(guard),
        })
    }

    /// Decode keys from any byte stream
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            fd: None,
            _guard: None,
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Drop the remainder of an escape sequence (arrow keys, function keys)
    fn skip_escape_sequence(&mut self) -> Result<()> {
        let Some(fd) = self.fd else {
            return Ok(());
        };
        while byte_pending(fd, ESCAPE_TIMEOUT_MS) {
            if self.read_byte()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Decode a multi-byte UTF-8 character starting with `first`
    fn read_utf8(&mut self, first: u8) -> Result<KeyEvent> {
        let len = match first {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Ok(KeyEvent::Unmapped),
        };

        let mut bytes = vec![first];
        for _ in 1..len {
            match self.read_byte()? {
                Some(b) => bytes.push(b),
                None => return Ok(KeyEvent::Exit),
            }
        }

        Ok(std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .map_or(KeyEvent::Unmapped, KeyEvent::Char))
    }
}

impl KeySource for TerminalSource {
    fn next_event(&mut self) -> Result<KeyEvent> {
        let Some(byte) = self.read_byte()? else {
            debug!("End of input");
            return Ok(KeyEvent::Exit);
        };

        let event = match byte {
            b'\r' | b'\n' | b' ' => KeyEvent::Delimiter,
            CTRL_C | CTRL_D => KeyEvent::Exit,
            ESC => {
                self.skip_escape_sequence()?;
                KeyEvent::Unmapped
            }
            0x00..=0x1f | 0x7f => KeyEvent::Unmapped,
            0x20..=0x7e => KeyEvent::Char(byte as char),
            _ => self.read_utf8(byte)?,
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn events(input: &[u8]) -> Vec<KeyEvent> {
        let mut source = TerminalSource::from_reader(Cursor::new(input.to_vec()));
        let mut out = Vec::new();
        loop {
            let event = source.next_event().unwrap();
            out.push(event);
            if event == KeyEvent::Exit {
                return out;
            }
        }
    }

    #[test]
    fn test_delimiters_and_chars() {
        assert_eq!(
            events(b"ab \r\n"),
            vec![
                KeyEvent::Char('a'),
                KeyEvent::Char('b'),
                KeyEvent::Delimiter,
                KeyEvent::Delimiter,
                KeyEvent::Delimiter,
                KeyEvent::Exit,
            ]
        );
    }

    #[test]
    fn test_ctrl_c_exits() {
        assert_eq!(events(b"x\x03"), vec![KeyEvent::Char('x'), KeyEvent::Exit]);
    }

    #[test]
    fn test_utf8_characters() {
        assert_eq!(
            events("é".as_bytes()),
            vec![KeyEvent::Char('é'), KeyEvent::Exit]
        );
    }

    #[test]
    fn test_control_bytes_are_unmapped() {
        assert_eq!(
            events(b"\x08\x7f"),
            vec![KeyEvent::Unmapped, KeyEvent::Unmapped, KeyEvent::Exit]
        );
    }
}
