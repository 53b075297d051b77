//! Status-line macros shared by every crate in the workspace.
//!
//! They all emit regular `tracing` events. The terminal formatter in the CLI
//! decides how each level and target is rendered.

/// Positive outcome, rendered with the `[+]` symbol.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "tmcheck::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        ::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}
