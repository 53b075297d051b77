//! # Remote Session
//!
//! Interactive ssh login to a TM's switch or virtualization host. The ssh
//! client runs on a PTY so that it prompts exactly as it would for a person;
//! the automaton answers the host-key and password prompts and then hands the
//! terminal over to the operator.
//!
//! ```text
//! Resolving -> Spawned -> AuthWait -> Interactive -> Closed
//!      \__________\___________\____________\______-> Failed
//! ```

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

pub mod handshake;
pub mod pty;
pub mod relay;
pub mod signals;
pub mod target;
pub mod terminal;

pub use handshake::{Handshake, PtyChannel, Reply, authenticate};
pub use pty::PtyProcess;
pub use target::{Credentials, DeviceClass, SessionTarget, literal_address, resolve_address};
pub use terminal::{CrosstermTerminal, RawModeGuard, TerminalMode};

pub const SSH_PROGRAM: &str = "ssh";
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown device class '{0}', expected kyland or ulak")]
    UnknownDeviceClass(String),

    #[error("{0} is not set")]
    MissingPassword(&'static str),

    #[error("failed to start the ssh client: {0}")]
    Spawn(#[source] io::Error),

    #[error("no output from the ssh client for {0:?}")]
    Timeout(Duration),

    #[error("ssh client exited before login completed")]
    ChildExited,

    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Resolving,
    Spawned,
    AuthWait,
    Interactive,
    Closed,
    Failed,
}

impl SessionState {
    fn advance(&mut self, next: SessionState) {
        debug!("session: {self} -> {next}");
        *self = next;
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Arguments for the ssh client. Host keys are neither checked nor stored.
pub fn ssh_args(target: &SessionTarget) -> Vec<String> {
    vec![
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        target.destination(),
    ]
}

/// Runs one session to completion. The terminal is back in its original mode
/// when this returns, whatever the outcome.
pub fn run(target: &SessionTarget, terminal: &mut dyn TerminalMode) -> Result<(), SessionError> {
    let mut state: SessionState = SessionState::Resolving;
    debug!("session target {} ({})", target.address, target.class);

    let mut process: PtyProcess = match PtyProcess::spawn(SSH_PROGRAM, &ssh_args(target)) {
        Ok(process) => process,
        Err(e) => {
            state.advance(SessionState::Failed);
            return Err(e);
        }
    };
    state.advance(SessionState::Spawned);

    let mut stdout = io::stdout();
    state.advance(SessionState::AuthWait);
    if let Err(e) = authenticate(&mut process, &target.credentials.password, &mut stdout, AUTH_TIMEOUT) {
        state.advance(SessionState::Failed);
        let _ = process.terminate();
        return Err(e);
    }

    state.advance(SessionState::Interactive);
    signals::install();
    let relayed: Result<(), SessionError> = interact(&mut process, terminal, &mut stdout);

    match &relayed {
        Ok(()) => state.advance(SessionState::Closed),
        Err(_) => state.advance(SessionState::Failed),
    }
    let pid: u32 = process.pid();
    let status = process.close()?;
    debug!("ssh client {pid} exited with {status}");

    relayed
}

fn interact(
    process: &mut PtyProcess,
    terminal: &mut dyn TerminalMode,
    output: &mut dyn Write,
) -> Result<(), SessionError> {
    let mut input = relay::raw_stdin()?;
    let _guard: RawModeGuard<'_> = RawModeGuard::engage(terminal).map_err(SessionError::Terminal)?;
    relay::relay(process.master(), &mut input, output, &signals::STOP)
}
