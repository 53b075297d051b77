use std::path::PathBuf;

use chrono::Local;
use colored::*;
use futures::StreamExt;
use tmcheck_common::config::Settings;
use tmcheck_common::filter::{FilterSpec, RunConfig, RunMode, Scope};
use tmcheck_common::inventory::{DeviceRecord, Inventory};
use tmcheck_core::diagnostics::ScriptHelper;
use tmcheck_core::probe::{ProbeEngine, ProbeOptions, RecordReport, SystemProber};
use tracing::debug;

use crate::terminal::colors;
use crate::terminal::format;
use crate::terminal::print;
use crate::terminal::report::{ConsoleSink, CsvSink, ReportSink};

/// Probes every selected TM and hands each record group to the sink for the
/// run mode: the live table or a CSV report.
pub async fn check(config: &RunConfig, inventory: &Inventory, settings: &Settings) -> anyhow::Result<()> {
    let records: Vec<&DeviceRecord> = config.select(inventory);
    let engine: ProbeEngine = ProbeEngine::new(
        Box::new(SystemProber::new()),
        Some(Box::new(ScriptHelper::new(&settings.helper))),
        ProbeOptions::from(config),
    );
    debug!("probing {} TMs with {} jobs", records.len(), settings.jobs);

    if config.mode == RunMode::Report {
        report(&engine, records, inventory, settings).await
    } else {
        live(&engine, records, config, inventory, settings).await
    }
}

async fn live(
    engine: &ProbeEngine,
    records: Vec<&DeviceRecord>,
    config: &RunConfig,
    inventory: &Inventory,
    settings: &Settings,
) -> anyhow::Result<()> {
    print::header("tm health check");
    print::aligned_line("source", inventory.path().display().to_string());
    print::aligned_line("filter", describe(&config.filter));
    print::aligned_line("pings", config.ping_count.to_string());
    if engine.options().deep {
        print::aligned_line("versions", "checked on every reachable switch");
    }
    print::rule();
    print::print(&format::result_header());
    print::rule();

    let mut sink: ConsoleSink = ConsoleSink::new(config.verbose);
    let mut reports = Box::pin(engine.run(records, settings.jobs));
    while let Some(report) = reports.next().await {
        sink.write_record(&report)?;
    }

    print::rule();
    total(sink.processed());
    print::end_of_program();
    Ok(())
}

async fn report(
    engine: &ProbeEngine,
    records: Vec<&DeviceRecord>,
    inventory: &Inventory,
    settings: &Settings,
) -> anyhow::Result<()> {
    let (mut sink, path): (CsvSink<std::fs::File>, PathBuf) =
        CsvSink::create(&settings.source_dir, &Local::now())?;

    print::header("full report");
    print::aligned_line("source", inventory.path().display().to_string());
    print::aligned_line("report", path.display().to_string());
    print::aligned_line("TMs", records.len().to_string());
    print::fat_separator();

    let count: usize = records.len();
    let mut reports = Box::pin(engine.run(records, settings.jobs));
    while let Some(report) = reports.next().await {
        sink.write_record(&report)?;
        progress(sink.processed(), count, &report);
    }

    print::rule();
    total(sink.processed());
    tmcheck_common::success!("report written to {}", path.display());
    print::end_of_program();
    Ok(())
}

fn progress(done: usize, count: usize, report: &RecordReport) {
    let failed: usize = report.results.iter().filter(|r| !r.reachable).count();
    let state: ColoredString = if failed == 0 {
        "OK".color(colors::SUCCESS)
    } else {
        format!("{failed} FAILED").color(colors::FAILURE)
    };
    print::print_status(format!(
        "[{done}/{count}] {} {}",
        tmcheck_common::text::fold_accents(&report.record.name),
        state
    ));
}

fn total(processed: usize) {
    print::print(&format!(
        "{} {}",
        "TOPLAM İŞLENEN TM SAYISI:".color(colors::PRIMARY),
        processed.to_string().bold()
    ));
}

fn describe(filter: &FilterSpec) -> String {
    let scope: String = match &filter.scope {
        Scope::All => "all TMs".to_string(),
        Scope::Region(region) => format!("region {region}"),
        Scope::Name { name, exact: true } => format!("TM '{name}'"),
        Scope::Name { name, exact: false } => format!("TMs matching '{name}'"),
        Scope::File(addresses) => format!("{} TMs from list file", addresses.len()),
        Scope::DeviceType(_) => "all TMs".to_string(),
    };
    match filter.device_filter() {
        Some(device_type) => format!("{scope}, {} only", device_type.name()),
        None => scope,
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
