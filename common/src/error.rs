//! Error taxonomy for resolution-time failures.
//!
//! Anything raised from here aborts the run before probing starts. Probe and
//! helper failures are plain values and never travel through these types.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),
}

impl Error {
    /// Operator backed out of a prompt. Not a failure for exit status purposes.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Input(InputError::Cancelled))
    }
}

/// Missing or unusable files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("inventory file not found: {}", .0.display())]
    InventoryMissing(PathBuf),

    #[error("failed to read inventory {}: {source}", path.display())]
    InventoryRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("inventory {} contains no usable records", .0.display())]
    InventoryEmpty(PathBuf),

    #[error("list file not found: {}", .0.display())]
    ListFileMissing(PathBuf),

    #[error("failed to read list file {}: {source}", path.display())]
    ListFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Bad operator input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("region {0} does not exist in the inventory")]
    UnknownRegion(u32),

    #[error("'{0}' is not a valid device type")]
    InvalidDeviceType(String),

    #[error("'{0}' is neither a device type nor a supported command")]
    InvalidSecondary(String),

    #[error("no TM name matches '{0}'")]
    NoMatch(String),

    #[error("'{term}' matches {count} TMs and no selection could be made")]
    Ambiguous { term: String, count: usize },

    #[error("invalid selection '{0}'")]
    InvalidSelection(String),

    #[error("no entry of {} matched the inventory", .0.display())]
    EmptyTargetList(PathBuf),

    #[error("'{0}' is not a valid IPv4 address")]
    InvalidAddress(String),

    #[error("selection cancelled")]
    Cancelled,
}
