pub mod check;
pub mod command;
pub mod list;
pub mod session;

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use tmcheck_common::config::Settings;
use tmcheck_common::filter::{
    FailClosedPrompt, Invocation, ResolverPrompt, RunConfig, RunMode, resolve,
};
use tmcheck_common::inventory::Inventory;
use tracing::debug;

use crate::terminal::{colors, print};

const HELP_FLAGS: [&str; 3] = ["-h", "--help", "-help"];

#[derive(Parser, Debug)]
#[command(name = "tmcheck")]
#[command(about = "Health check for TM substation networks.")]
#[command(disable_help_flag = true)]
pub struct CommandLine {
    /// [inventory.csv] target [secondary]
    pub tokens: Vec<String>,

    /// Run version checks on every switch and print them inline
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// A resolved run, ready to be executed.
pub struct Prepared {
    pub config: RunConfig,
    pub inventory: Inventory,
}

/// No arguments at all, or any of the help spellings.
pub fn usage_requested(args: &[String]) -> bool {
    args.is_empty() || args.iter().any(|a| HELP_FLAGS.contains(&a.as_str()))
}

/// Splits an inventory override off the front of the positional tokens. The
/// first token counts as an inventory when `locate` finds it as a file and it
/// is not a `.txt` list.
pub fn split_inventory<F>(tokens: &[String], locate: F) -> (Option<PathBuf>, Vec<String>)
where
    F: Fn(&str) -> Option<PathBuf>,
{
    match tokens.split_first() {
        Some((first, rest)) if !first.to_lowercase().ends_with(".txt") => match locate(first) {
            Some(path) => (Some(path), rest.to_vec()),
            None => (None, tokens.to_vec()),
        },
        _ => (None, tokens.to_vec()),
    }
}

/// Loads the inventory and resolves the command line into a run.
///
/// `Ok(None)` means nothing is left to run once the inventory override is
/// taken off, and the caller should print usage.
pub fn prepare(line: &CommandLine, settings: &Settings) -> anyhow::Result<Option<Prepared>> {
    let (override_path, tokens) =
        split_inventory(&line.tokens, |name| settings.locate_source_file(name));
    let Some(target) = tokens.first() else {
        return Ok(None);
    };

    let path: PathBuf = override_path.unwrap_or_else(|| settings.inventory.clone());
    let inventory: Inventory = Inventory::load(&path)?;
    debug!("{} TMs loaded from {}", inventory.len(), path.display());

    let invocation: Invocation = Invocation {
        target: target.clone(),
        secondary: tokens.get(1).cloned(),
        verbose: line.verbose,
    };

    let mut prompt: Box<dyn ResolverPrompt> = if io::stdin().is_terminal() {
        Box::new(crate::terminal::prompt::ConsolePrompt::stdin())
    } else {
        Box::new(FailClosedPrompt)
    };
    let config: RunConfig = resolve(&invocation, &inventory, settings, prompt.as_mut())?;
    debug!("run config: {config:?}");

    Ok(Some(Prepared { config, inventory }))
}

pub async fn dispatch(prepared: &Prepared, settings: &Settings) -> anyhow::Result<()> {
    let Prepared { config, inventory } = prepared;
    match config.mode {
        RunMode::Listing => list::list(config, inventory),
        RunMode::Command(remote) => command::command(config, inventory, settings, remote).await,
        RunMode::Live | RunMode::Report => check::check(config, inventory, settings).await,
    }
}

pub fn print_usage(settings: &Settings) {
    let rows: [(&str, &str); 10] = [
        ("tmcheck 5", "all TMs in region 5"),
        ("tmcheck Bagcilar", "one TM by name, 4 pings per device"),
        ("tmcheck Bagcilar kyland", "only the Kyland switches of one TM"),
        ("tmcheck 5 sel3530", "only the SEL3530 relays in region 5"),
        ("tmcheck kyland", "Kyland switches of every TM"),
        ("tmcheck list.txt", "TMs named in a list file, one IP or name per line"),
        ("tmcheck all", "inventory table"),
        ("tmcheck 5 all", "inventory table for region 5"),
        ("tmcheck report", "full scan written to a CSV report"),
        ("tmcheck Bagcilar \"show clock\"", "run a show-command on the TM switch"),
    ];

    print::header("tmcheck");
    print::print(&format!(
        "{} tmcheck [inventory.csv] <target> [secondary] [-v]",
        "usage:".color(colors::PRIMARY)
    ));
    print::print("");
    for (example, meaning) in rows {
        print::print(&format!("  {:<32} {}", example.color(colors::ACCENT), meaning));
    }
    print::print("");
    print::aligned_line("types", "Sdwan, SEL3555, SEL3530, Ulak, Kyland");
    print::aligned_line(
        "commands",
        "\"show interface brief\", \"show vlan brief\", \"show clock\"",
    );
    print::aligned_line("-v", "version check on every switch, printed inline");
    print::aligned_line("inventory", settings.inventory.display().to_string());
    print::end_of_program();
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
