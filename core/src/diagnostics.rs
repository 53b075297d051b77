//! # Extended Diagnostics
//!
//! Switch-level checks that go beyond reachability. Both facilities talk to
//! the switch through an external helper script that logs in, runs one CLI
//! command and prints the raw session output:
//!
//! * firmware version verification against the fleet baseline;
//! * operator show-commands with cleaned, highlighted output.
//!
//! The helper is a black box behind the [`Helper`] trait. A failing helper is
//! reported as a diagnostic and never retried.

use std::io;
use std::net::Ipv4Addr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tmcheck_common::config::HelperSettings;
use tmcheck_common::filter::RemoteCommand;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::probe::Prober;

mod sanitize;

pub use sanitize::{LineStyle, classify, sanitize};

pub const VERSION_COMMAND: &str = "show version";
pub const VERSION_MARKER: &str = "SICOM";
pub const EXPECTED_VERSION: &str = "SICOM3028GPT-L2GT-T1080";
pub const VERSION_TIMEOUT: Duration = Duration::from_secs(10);
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum HelperError {
    #[error("helper did not finish within {0:?}")]
    Timeout(Duration),

    #[error("helper could not be started: {0}")]
    Spawn(#[source] io::Error),
}

/// Captured helper run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HelperOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait Helper: Send + Sync {
    /// Whether the helper is installed. Version checks are skipped otherwise.
    fn is_available(&self) -> bool;

    async fn query(
        &self,
        address: Ipv4Addr,
        command: &str,
        limit: Duration,
    ) -> Result<HelperOutput, HelperError>;
}

/// Runs `<interpreter> <script> <address> <command>`.
pub struct ScriptHelper {
    settings: HelperSettings,
}

impl ScriptHelper {
    pub fn new(settings: &HelperSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    pub fn script(&self) -> &Path {
        &self.settings.script
    }
}

#[async_trait]
impl Helper for ScriptHelper {
    fn is_available(&self) -> bool {
        self.settings.is_installed()
    }

    async fn query(
        &self,
        address: Ipv4Addr,
        command: &str,
        limit: Duration,
    ) -> Result<HelperOutput, HelperError> {
        debug!("helper: {} '{}' (limit {:?})", address, command, limit);
        let run = Command::new(&self.settings.interpreter)
            .arg(&self.settings.script)
            .arg(address.to_string())
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = timeout(limit, run)
            .await
            .map_err(|_| HelperError::Timeout(limit))?
            .map_err(HelperError::Spawn)?;

        Ok(HelperOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Firmware verification outcome for one switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionCheck {
    Match(String),
    Mismatch(String),
    Unreadable,
    Timeout,
    HelperError,
}

impl VersionCheck {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Match(_))
    }

    /// Observed version, or a sentinel when there is none.
    pub fn describe(&self) -> &str {
        match self {
            Self::Match(v) | Self::Mismatch(v) => v,
            Self::Unreadable => "unreadable",
            Self::Timeout => "timeout",
            Self::HelperError => "helper error",
        }
    }

    /// Judges raw helper output against the baseline.
    pub fn from_output(stdout: &str) -> Self {
        match parse_version(stdout) {
            Some(version) if version == EXPECTED_VERSION => Self::Match(version),
            Some(version) => Self::Mismatch(version),
            None => Self::Unreadable,
        }
    }
}

/// First line starting with the vendor marker, up to its first comma.
pub fn parse_version(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(VERSION_MARKER))
        .and_then(|line| line.split(',').next())
        .map(|version| version.trim().to_string())
}

pub async fn check_version(helper: &dyn Helper, address: Ipv4Addr) -> VersionCheck {
    match helper.query(address, VERSION_COMMAND, VERSION_TIMEOUT).await {
        Ok(output) => VersionCheck::from_output(&output.stdout),
        Err(HelperError::Timeout(_)) => VersionCheck::Timeout,
        Err(e) => {
            debug!("version check on {address} failed: {e}");
            VersionCheck::HelperError
        }
    }
}

/// Result of running a show-command on a switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Unreachable,
    /// Cleaned output with one highlight per line.
    Output(Vec<(LineStyle, String)>),
    /// The command ran but nothing was left after cleanup.
    Empty,
    /// Non-zero exit or no output at all.
    Failed { stderr: String },
    Timeout,
    HelperFailed(String),
}

pub async fn run_command(
    prober: &dyn Prober,
    helper: &dyn Helper,
    address: Ipv4Addr,
    command: RemoteCommand,
    ping_count: u8,
) -> CommandOutcome {
    if !prober.ping(address, ping_count).await.reachable {
        return CommandOutcome::Unreachable;
    }

    let output: HelperOutput = match helper.query(address, command.as_str(), COMMAND_TIMEOUT).await {
        Ok(output) => output,
        Err(HelperError::Timeout(_)) => return CommandOutcome::Timeout,
        Err(e) => return CommandOutcome::HelperFailed(e.to_string()),
    };

    if !output.success || output.stdout.is_empty() {
        return CommandOutcome::Failed {
            stderr: output.stderr,
        };
    }

    let cleaned: String = sanitize(&output.stdout);
    if cleaned.is_empty() {
        return CommandOutcome::Empty;
    }

    CommandOutcome::Output(
        cleaned
            .lines()
            .map(|line| (classify(line), line.to_string()))
            .collect(),
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
