use std::io::{self, BufRead, StdinLock};

use colored::*;
use tmcheck_common::error::{InputError, Result};
use tmcheck_common::filter::ResolverPrompt;
use tmcheck_common::inventory::DeviceRecord;
use tracing::debug;

use crate::terminal::colors;
use crate::terminal::print;

/// Numbered menu on the terminal. Blocks until the operator answers.
pub struct ConsolePrompt<R: BufRead> {
    input: R,
}

impl ConsolePrompt<StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> ConsolePrompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> ResolverPrompt for ConsolePrompt<R> {
    fn ask(&mut self, term: &str, candidates: &[&DeviceRecord]) -> Result<String> {
        print::print("");
        tmcheck_common::warn!("'{}' matches {} TMs, pick one:", term, candidates.len());
        for (i, record) in candidates.iter().enumerate() {
            let index: String = format!("[{}]", i + 1);
            print::print(&format!("{} {}", index.color(colors::PRIMARY), record.name));
        }
        print::print(&format!("{}", "[q] quit".color(colors::MUTED)));
        print::print("Selection:");

        let mut answer: String = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) => Err(InputError::Cancelled.into()),
            Ok(_) => Ok(answer.trim().to_string()),
            Err(e) => {
                debug!("failed to read selection: {e}");
                Err(InputError::Cancelled.into())
            }
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
