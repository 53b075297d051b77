//! Line layout for probe results, inventory listings and command output.
//!
//! Everything here returns strings; printing is left to the caller.

use colored::*;
use tmcheck_common::inventory::DeviceRecord;
use tmcheck_common::text::fold_accents;
use tmcheck_common::topology::TopologyVariant;
use tmcheck_core::diagnostics::{LineStyle, VersionCheck};
use tmcheck_core::probe::{PortStatus, ProbeResult};

use crate::terminal::colors;

/// Width of `region | name | ` on a result line, where the extra-info arrow
/// is placed.
pub const EXTRA_INDENT: usize = 29;

const REGION_WIDTH: usize = 3;
const NAME_WIDTH: usize = 20;
const DEVICE_WIDTH: usize = 16;
const ADDRESS_WIDTH: usize = 15;
const STATUS_WIDTH: usize = 10;
const LISTING_NAME_WIDTH: usize = 25;

/// First `width` characters of `text`, padded to `width`.
fn column(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    format!("{cut:<width$}")
}

fn meta_color(record: &DeviceRecord) -> Color {
    match TopologyVariant::of(record) {
        TopologyVariant::Automated => colors::META_AUTOMATED,
        _ => colors::META,
    }
}

pub fn result_header() -> String {
    format!(
        "{} | {} | {} {} : {} {}",
        column("BLG", REGION_WIDTH).color(colors::MUTED),
        column("TM ADI", NAME_WIDTH).color(colors::MUTED),
        column("CIHAZ", DEVICE_WIDTH),
        column("IP ADRESI", ADDRESS_WIDTH),
        column("DURUM", STATUS_WIDTH),
        "WEB"
    )
}

/// One result as console lines. The version check goes on the same line with
/// `inline_extra`, otherwise on an indented line below.
pub fn result_lines(record: &DeviceRecord, result: &ProbeResult, inline_extra: bool) -> Vec<String> {
    let meta: Color = meta_color(record);
    let status_color: Color = if result.reachable { colors::SUCCESS } else { colors::FAILURE };
    let status: ColoredString = column(result.ping_status(), STATUS_WIDTH).color(status_color);
    let loss: String = result
        .loss
        .map(|l| format!("{}", format!("(Loss: %{l})").color(colors::LOSS)))
        .unwrap_or_default();

    let mut line: String = format!(
        "{} | {} | {} {} : {} {}",
        column(&record.region.to_string(), REGION_WIDTH).color(meta),
        column(&fold_accents(&record.name), NAME_WIDTH).color(meta),
        column(&fold_accents(&result.endpoint.label), DEVICE_WIDTH).color(meta),
        column(&result.endpoint.address.to_string(), ADDRESS_WIDTH).color(meta),
        status,
        loss
    );

    if !result.endpoint.role.is_infrastructure() {
        line.push(' ');
        line.push_str(&web_message(result));
    }

    let Some(check) = &result.diagnostic else {
        return vec![line];
    };
    let extra: String = version_message(check);
    if inline_extra {
        vec![format!("{line} {extra}")]
    } else {
        let arrow: String = format!("{}", "↳".color(colors::MUTED));
        vec![line, format!("{}{arrow} {extra}", " ".repeat(EXTRA_INDENT))]
    }
}

fn web_message(result: &ProbeResult) -> String {
    match result.port {
        None => String::new(),
        Some(PortStatus::Open) => format!("[Web: {}]", result.web_status()),
        Some(PortStatus::Closed) => {
            format!("{}", format!("[Web: {}]", result.web_status()).color(colors::PORT_CLOSED))
        }
    }
}

fn version_message(check: &VersionCheck) -> String {
    let text: String = format!("[{}]", check.describe());
    let color: Color = if check.passed() { colors::SUCCESS } else { colors::FAILURE };
    format!("{}", text.color(color))
}

pub fn listing_header() -> String {
    format!(
        "{} | {} | {} | {} | {} | {}",
        column("BLG", REGION_WIDTH).color(colors::MUTED),
        column("TM ADI", LISTING_NAME_WIDTH).color(colors::MUTED),
        column("ANA IP", ADDRESS_WIDTH),
        column("3530", 5),
        column("KYLAND", 6),
        "MGMT VLAN"
    )
}

pub fn listing_line(record: &DeviceRecord) -> String {
    let meta: Color = meta_color(record);
    format!(
        "{} | {} | {} | {} | {} | {}",
        column(&record.region.to_string(), REGION_WIDTH).color(meta),
        column(&fold_accents(&record.name), LISTING_NAME_WIDTH).color(meta),
        column(&record.address.to_string(), ADDRESS_WIDTH).color(meta),
        column(&record.relay_count.to_string(), 5).color(meta),
        column(&record.switch_count.to_string(), 6).color(meta),
        record.vlan.to_string().color(meta)
    )
}

pub fn command_line(style: LineStyle, text: &str) -> String {
    match style {
        LineStyle::Header => format!("{}", text.color(colors::LINE_HEADER)),
        LineStyle::Down => format!("{}", text.color(colors::LINE_DOWN)),
        LineStyle::Up => format!("{}", text.color(colors::LINE_UP)),
        LineStyle::Plain => text.to_string(),
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
