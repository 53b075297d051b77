use std::net::Ipv4Addr;

use colored::*;
use tmcheck_common::config::Settings;
use tmcheck_common::filter::{RemoteCommand, RunConfig};
use tmcheck_common::inventory::{DeviceRecord, Inventory};
use tmcheck_common::topology::SWITCH_ANCHOR_OCTET;
use tmcheck_core::diagnostics::{CommandOutcome, Helper, ScriptHelper, run_command};
use tmcheck_core::probe::SystemProber;
use tracing::error;

use crate::terminal::colors;
use crate::terminal::format;
use crate::terminal::print;

const OUTPUT_RULE_WIDTH: usize = 80;

/// Runs a show-command on the primary switch of each selected TM.
pub async fn command(
    config: &RunConfig,
    inventory: &Inventory,
    settings: &Settings,
    remote: RemoteCommand,
) -> anyhow::Result<()> {
    let helper: ScriptHelper = ScriptHelper::new(&settings.helper);
    if !helper.is_available() {
        anyhow::bail!("helper script {} is not installed", helper.script().display());
    }
    let prober: SystemProber = SystemProber::new();

    print::header("switch command");
    for record in config.select(inventory) {
        run_on(record, &prober, &helper, remote, config.ping_count).await;
    }
    print::end_of_program();
    Ok(())
}

async fn run_on(
    record: &DeviceRecord,
    prober: &SystemProber,
    helper: &ScriptHelper,
    remote: RemoteCommand,
    ping_count: u8,
) {
    let address: Ipv4Addr = record.sibling(SWITCH_ANCHOR_OCTET);
    print::print("");
    print::print(&format!(
        "{} {} - KYLAND ({})",
        ">>> connecting:".color(colors::ACCENT),
        record.name.bold(),
        address
    ));
    print::print(&format!("{} {}", ">>> command:".color(colors::ACCENT), remote));

    match run_command(prober, helper, address, remote, ping_count).await {
        CommandOutcome::Unreachable => error!("{address} does not answer ping, skipped"),
        CommandOutcome::Output(lines) => {
            output_rule();
            for (style, line) in lines {
                print::print(&format::command_line(style, &line));
            }
            output_rule();
        }
        CommandOutcome::Empty => {
            tmcheck_common::warn!("command ran but printed nothing besides prompts")
        }
        CommandOutcome::Failed { stderr } => {
            error!("no usable output from {address}");
            let stderr: &str = stderr.trim();
            if !stderr.is_empty() {
                print::print(&format!("{} {}", "STDERR:".color(colors::FAILURE), stderr));
            }
        }
        CommandOutcome::Timeout => error!("{address} did not answer within the command timeout"),
        CommandOutcome::HelperFailed(reason) => error!("helper failed: {reason}"),
    }
}

fn output_rule() {
    print::print(&format!(
        "{}",
        "-".repeat(OUTPUT_RULE_WIDTH).color(colors::SEPARATOR)
    ));
}
