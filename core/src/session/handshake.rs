//! Login automation for the ssh client.
//!
//! [`Handshake`] only looks at text. [`authenticate`] drives it over a
//! [`PtyChannel`] so the same logic runs against a real PTY or a script.

use std::io::{self, Write};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::SessionError;

const HOST_KEY_PROMPT: &str = "Are you sure";
const PASSWORD_PROMPT: &str = "password:";
/// Prompts are short. Older output only has to survive long enough for a
/// prompt split across two reads to be seen whole.
const BUFFER_LIMIT: usize = 4096;

/// What the client should send in reply to the output seen so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Accept an unknown host key.
    ConfirmHostKey,
    SendPassword,
}

#[derive(Debug, Default)]
pub struct Handshake {
    buffer: String,
    password_sent: bool,
}

impl Handshake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.password_sent
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Option<Reply> {
        if self.password_sent {
            return None;
        }
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        self.trim_buffer();

        if self.buffer.contains(HOST_KEY_PROMPT) {
            self.buffer.clear();
            return Some(Reply::ConfirmHostKey);
        }
        if self.buffer.to_lowercase().contains(PASSWORD_PROMPT) {
            self.buffer.clear();
            self.password_sent = true;
            return Some(Reply::SendPassword);
        }
        None
    }

    fn trim_buffer(&mut self) {
        if self.buffer.len() <= BUFFER_LIMIT {
            return;
        }
        let mut cut: usize = self.buffer.len() - BUFFER_LIMIT;
        while !self.buffer.is_char_boundary(cut) {
            cut += 1;
        }
        self.buffer.drain(..cut);
    }
}

/// The client side of a PTY as the handshake needs it.
pub trait PtyChannel {
    /// Waits until output is available. `false` when `limit` passed first.
    fn wait_readable(&mut self, limit: Duration) -> io::Result<bool>;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
}

/// Reads client output until the password has been sent. Every chunk is
/// echoed to `echo` as it arrives.
pub fn authenticate(
    channel: &mut dyn PtyChannel,
    password: &SecretString,
    echo: &mut dyn Write,
    limit: Duration,
) -> Result<(), SessionError> {
    let mut handshake: Handshake = Handshake::new();
    let mut buf: [u8; 4096] = [0; 4096];

    while !handshake.is_complete() {
        if !channel.wait_readable(limit)? {
            return Err(SessionError::Timeout(limit));
        }
        let n: usize = match channel.read(&mut buf) {
            Ok(0) => return Err(SessionError::ChildExited),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.raw_os_error() == Some(libc::EIO) => return Err(SessionError::ChildExited),
            Err(e) => return Err(e.into()),
        };

        echo.write_all(&buf[..n])?;
        echo.flush()?;

        match handshake.feed(&buf[..n]) {
            Some(Reply::ConfirmHostKey) => {
                debug!("accepting host key");
                channel.write_all(b"yes\n")?;
            }
            Some(Reply::SendPassword) => {
                debug!("sending password");
                channel.write_all(password.expose_secret().as_bytes())?;
                channel.write_all(b"\n")?;
            }
            None => {}
        }
    }

    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays canned chunks and records what the client wrote back.
    struct ScriptedChannel {
        chunks: VecDeque<&'static [u8]>,
        written: Vec<u8>,
    }

    impl ScriptedChannel {
        fn new(chunks: &[&'static [u8]]) -> Self {
            Self {
                chunks: chunks.iter().copied().collect(),
                written: Vec::new(),
            }
        }
    }

    impl PtyChannel for ScriptedChannel {
        fn wait_readable(&mut self, _limit: Duration) -> io::Result<bool> {
            Ok(!self.chunks.is_empty())
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let chunk: &[u8] = self.chunks.pop_front().unwrap_or_default();
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }

        fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            self.written.extend_from_slice(data);
            Ok(())
        }
    }

    fn secret() -> SecretString {
        SecretString::from("hunter2".to_string())
    }

    #[test]
    fn password_prompt_should_trigger_exactly_one_write() {
        let mut handshake: Handshake = Handshake::new();

        assert_eq!(handshake.feed(b"admin@10.0.0.94's Password: "), Some(Reply::SendPassword));
        assert!(handshake.is_complete());
        assert_eq!(handshake.feed(b"password: "), None);
    }

    #[test]
    fn prompt_split_across_reads_should_be_seen() {
        let mut handshake: Handshake = Handshake::new();

        assert_eq!(handshake.feed(b"Are you "), None);
        assert_eq!(handshake.feed(b"sure you want to continue? "), Some(Reply::ConfirmHostKey));
        assert_eq!(handshake.feed(b"pass"), None);
        assert_eq!(handshake.feed(b"word: "), Some(Reply::SendPassword));
    }

    #[test]
    fn authenticate_should_answer_host_key_then_password() {
        let mut channel = ScriptedChannel::new(&[
            b"The authenticity of host can't be established.\r\nAre you sure (yes/no)? ",
            b"Warning: added to known hosts.\r\n",
            b"admin@10.0.0.94's password: ",
            b"Welcome\r\n",
        ]);
        let mut echo: Vec<u8> = Vec::new();

        authenticate(&mut channel, &secret(), &mut echo, Duration::from_secs(1)).unwrap();

        assert_eq!(channel.written, b"yes\nhunter2\n");
        assert_eq!(channel.chunks.len(), 1);
        assert!(String::from_utf8_lossy(&echo).contains("password:"));
    }

    #[test]
    fn silent_client_should_time_out() {
        let mut channel = ScriptedChannel::new(&[b"connecting...\r\n"]);
        let result = authenticate(&mut channel, &secret(), &mut Vec::new(), Duration::from_millis(5));

        assert!(matches!(result, Err(SessionError::Timeout(_))));
        assert!(channel.written.is_empty());
    }

    #[test]
    fn closed_client_should_fail() {
        let mut channel = ScriptedChannel::new(&[b"Connection refused\r\n", b""]);
        let result = authenticate(&mut channel, &secret(), &mut Vec::new(), Duration::from_secs(1));

        assert!(matches!(result, Err(SessionError::ChildExited)));
    }

    #[test]
    fn buffer_should_stay_bounded() {
        let mut handshake: Handshake = Handshake::new();
        let banner: Vec<u8> = "ş".repeat(BUFFER_LIMIT).into_bytes();

        assert_eq!(handshake.feed(&banner), None);
        assert!(handshake.buffer.len() <= BUFFER_LIMIT);
    }
}
