use std::io;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled};
use tracing::debug;

/// Switches the operator's terminal between cooked and raw mode.
pub trait TerminalMode {
    fn is_raw(&self) -> io::Result<bool>;

    fn enable_raw(&mut self) -> io::Result<()>;

    fn disable_raw(&mut self) -> io::Result<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CrosstermTerminal;

impl TerminalMode for CrosstermTerminal {
    fn is_raw(&self) -> io::Result<bool> {
        is_raw_mode_enabled()
    }

    fn enable_raw(&mut self) -> io::Result<()> {
        enable_raw_mode()
    }

    fn disable_raw(&mut self) -> io::Result<()> {
        disable_raw_mode()
    }
}

/// Raw mode for as long as the guard lives. On drop the terminal goes back to
/// the mode it was in before, also while unwinding.
pub struct RawModeGuard<'a> {
    terminal: &'a mut dyn TerminalMode,
    was_raw: bool,
}

impl<'a> RawModeGuard<'a> {
    pub fn engage(terminal: &'a mut dyn TerminalMode) -> io::Result<Self> {
        let was_raw: bool = terminal.is_raw()?;
        if !was_raw {
            terminal.enable_raw()?;
        }
        Ok(Self { terminal, was_raw })
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        if self.was_raw {
            return;
        }
        if let Err(e) = self.terminal.disable_raw() {
            debug!("failed to restore terminal mode: {e}");
        }
    }
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
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Clone, Default)]
    struct FakeTerminal {
        raw: Arc<AtomicBool>,
    }

    impl TerminalMode for FakeTerminal {
        fn is_raw(&self) -> io::Result<bool> {
            Ok(self.raw.load(Ordering::SeqCst))
        }

        fn enable_raw(&mut self) -> io::Result<()> {
            self.raw.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn disable_raw(&mut self) -> io::Result<()> {
            self.raw.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn guard_should_restore_cooked_mode() {
        let mut terminal: FakeTerminal = FakeTerminal::default();
        let state: Arc<AtomicBool> = terminal.raw.clone();

        {
            let _guard = RawModeGuard::engage(&mut terminal).unwrap();
            assert!(state.load(Ordering::SeqCst));
        }
        assert!(!state.load(Ordering::SeqCst));
    }

    #[test]
    fn guard_should_leave_raw_terminal_raw() {
        let mut terminal: FakeTerminal = FakeTerminal::default();
        terminal.enable_raw().unwrap();

        drop(RawModeGuard::engage(&mut terminal).unwrap());
        assert!(terminal.is_raw().unwrap());
    }

    #[test]
    fn guard_should_restore_while_unwinding() {
        let terminal: FakeTerminal = FakeTerminal::default();
        let state: Arc<AtomicBool> = terminal.raw.clone();

        let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
            let mut terminal: FakeTerminal = terminal;
            let _guard = RawModeGuard::engage(&mut terminal).unwrap();
            panic!("relay blew up");
        }));

        assert!(outcome.is_err());
        assert!(!state.load(Ordering::SeqCst));
    }
}
