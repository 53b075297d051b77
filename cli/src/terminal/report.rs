//! Destinations for probe results.
//!
//! A sink receives one [`RecordReport`] at a time and writes it completely
//! before the next one arrives, so an interrupted run never leaves half a TM
//! behind.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use tmcheck_common::topology::TopologyVariant;
use tmcheck_core::probe::{ProbeResult, RecordReport};

use crate::terminal::format;
use crate::terminal::print;

pub const REPORT_HEADER: [&str; 8] = [
    "Bolge_No",
    "TM_Adi",
    "TM_Tipi",
    "TM_Prefix",
    "Cihaz_Adi",
    "Cihaz_IP",
    "Ping_Durumu",
    "Web_Port_Durumu",
];

pub trait ReportSink {
    fn write_record(&mut self, report: &RecordReport) -> anyhow::Result<()>;

    /// Number of TMs written so far.
    fn processed(&self) -> usize;
}

/// Live table on the terminal.
pub struct ConsoleSink {
    inline_extra: bool,
    processed: usize,
}

impl ConsoleSink {
    pub fn new(inline_extra: bool) -> Self {
        Self {
            inline_extra,
            processed: 0,
        }
    }
}

impl ReportSink for ConsoleSink {
    fn write_record(&mut self, report: &RecordReport) -> anyhow::Result<()> {
        for result in report.visible() {
            for line in format::result_lines(&report.record, result, self.inline_extra) {
                print::print(&line);
            }
        }
        self.processed += 1;
        Ok(())
    }

    fn processed(&self) -> usize {
        self.processed
    }
}

/// CSV report, one row per probed endpoint.
pub struct CsvSink<W: io::Write> {
    writer: csv::Writer<W>,
    processed: usize,
}

impl<W: io::Write> CsvSink<W> {
    pub fn new(inner: W) -> anyhow::Result<Self> {
        let mut writer: csv::Writer<W> = csv::Writer::from_writer(inner);
        writer.write_record(REPORT_HEADER)?;
        writer.flush()?;
        Ok(Self {
            writer,
            processed: 0,
        })
    }

    pub fn into_inner(self) -> anyhow::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to flush report: {}", e.error()))
    }
}

impl CsvSink<File> {
    /// Creates `TM_Rapor_<timestamp>.csv` under `dir`, creating `dir` first
    /// when needed.
    pub fn create(dir: &Path, now: &DateTime<Local>) -> anyhow::Result<(Self, PathBuf)> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create report directory {}", dir.display()))?;
        let path: PathBuf = dir.join(report_file_name(now));
        let file: File = File::create(&path)
            .with_context(|| format!("failed to create report {}", path.display()))?;
        Ok((Self::new(file)?, path))
    }
}

impl<W: io::Write> ReportSink for CsvSink<W> {
    fn write_record(&mut self, report: &RecordReport) -> anyhow::Result<()> {
        for result in &report.results {
            self.writer.write_record(report_row(report, result))?;
        }
        self.writer.flush()?;
        self.processed += 1;
        Ok(())
    }

    fn processed(&self) -> usize {
        self.processed
    }
}

pub fn report_file_name(now: &DateTime<Local>) -> String {
    format!("TM_Rapor_{}.csv", now.format("%Y-%m-%d_%H-%M-%S"))
}

fn report_row(report: &RecordReport, result: &ProbeResult) -> [String; 8] {
    let record = &report.record;
    [
        record.region.to_string(),
        record.name.clone(),
        TopologyVariant::of(record).report_label().to_string(),
        record.prefix_string(),
        result.endpoint.label.clone(),
        result.endpoint.address.to_string(),
        result.ping_status().to_string(),
        result.web_status(),
    ]
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
    use chrono::TimeZone;
    use std::net::Ipv4Addr;
    use tmcheck_common::inventory::DeviceRecord;
    use tmcheck_common::topology;
    use tmcheck_core::probe::PortStatus;

    fn report() -> RecordReport {
        let record = DeviceRecord {
            region: 7,
            name: "Karşıyaka, Merkez".to_string(),
            address: Ipv4Addr::new(10, 7, 1, 66),
            relay_count: 0,
            switch_count: 1,
            vlan: 0,
        };
        let results: Vec<ProbeResult> = topology::derive(&record)
            .into_iter()
            .map(|endpoint| ProbeResult {
                port: endpoint.protocol.port().map(|_| PortStatus::Open),
                endpoint,
                reachable: true,
                loss: None,
                diagnostic: None,
                visible: true,
            })
            .collect();
        RecordReport { record, results }
    }

    #[test]
    fn report_file_name_should_carry_the_timestamp() {
        let now: DateTime<Local> = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(report_file_name(&now), "TM_Rapor_2024-03-09_07-05-01.csv");
    }

    #[test]
    fn csv_sink_should_write_header_and_one_row_per_result() {
        let mut sink: CsvSink<Vec<u8>> = CsvSink::new(Vec::new()).unwrap();
        sink.write_record(&report()).unwrap();
        assert_eq!(sink.processed(), 1);

        let bytes: Vec<u8> = sink.into_inner().unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, REPORT_HEADER);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(&rows[0][1], "Karşıyaka, Merkez");
        assert_eq!(&rows[0][2], "KLASİK");
        assert_eq!(&rows[0][3], "10.7.1");
        assert_eq!(&rows[0][7], "N/A");
        assert_eq!(&rows[4][4], "SEL3555");
        assert_eq!(&rows[4][7], "HTTPS_OPEN");
    }

    #[test]
    fn csv_sink_should_create_report_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let now: DateTime<Local> = Local::now();

        let (mut sink, path) = CsvSink::create(dir.path(), &now).unwrap();
        sink.write_record(&report()).unwrap();

        let contents: String = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Bolge_No,TM_Adi"));
        assert_eq!(contents.lines().count(), 6);
    }

    #[test]
    fn csv_sink_should_create_missing_report_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested: PathBuf = dir.path().join("source").join("raporlar");

        let (sink, path) = CsvSink::create(&nested, &Local::now()).unwrap();
        drop(sink);

        assert!(path.starts_with(&nested));
        assert!(path.is_file());
    }
}
