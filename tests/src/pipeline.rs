#![cfg(test)]
use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use tmcheck_cli::terminal::report::{CsvSink, ReportSink};
use tmcheck_common::config::Settings;
use tmcheck_common::filter::{FailClosedPrompt, Invocation, RunConfig, RunMode, resolve};
use tmcheck_common::inventory::{DeviceRecord, Inventory};
use tmcheck_core::probe::{PingReport, ProbeEngine, ProbeOptions, Prober, RecordReport};

const INVENTORY: &str = "\
1,Bağcılar Merkez,10.1.1.93,1,3,310
1,Esenler,10.1.2.66,0,1,0
2,\"Kadıköy, Moda\",10.2.0.66
bozuk satir
";

/// Everything answers except the listed addresses. Web ports are open
/// except on `closed`.
struct Network {
    down: BTreeSet<Ipv4Addr>,
    closed: BTreeSet<Ipv4Addr>,
}

#[async_trait]
impl Prober for Network {
    async fn ping(&self, address: Ipv4Addr, _count: u8) -> PingReport {
        PingReport {
            reachable: !self.down.contains(&address),
            loss: None,
        }
    }

    async fn port_open(&self, address: Ipv4Addr, _port: u16) -> bool {
        !self.closed.contains(&address)
    }
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

/// Inventory file, list file, resolution, probing and CSV output together.
#[tokio::test]
async fn list_file_run_writes_whole_record_groups() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "veritabani.csv", INVENTORY);
    write(dir.path(), "hedef.txt", "bagcilar\n10.1.2.66\n\nyok\n");

    let settings: Settings = Settings::rooted_at(dir.path());
    let inventory: Inventory = Inventory::load(&settings.inventory).unwrap();
    assert_eq!(inventory.len(), 3);

    let invocation: Invocation = Invocation {
        target: "hedef.txt".to_string(),
        secondary: None,
        verbose: false,
    };
    let config: RunConfig = resolve(&invocation, &inventory, &settings, &mut FailClosedPrompt).unwrap();
    assert_eq!(config.mode, RunMode::Live);
    assert!(!config.deep());

    let network: Network = Network {
        down: [Ipv4Addr::new(10, 1, 1, 92), Ipv4Addr::new(10, 1, 2, 99)].into(),
        closed: [Ipv4Addr::new(10, 1, 1, 93)].into(),
    };
    let engine: ProbeEngine = ProbeEngine::new(Box::new(network), None, ProbeOptions::from(&config));

    let records: Vec<&DeviceRecord> = config.select(&inventory);
    assert_eq!(records.len(), 2);

    let mut sink: CsvSink<Vec<u8>> = CsvSink::new(Vec::new()).unwrap();
    let reports: Vec<RecordReport> = engine.run(records, 2).collect().await;
    for report in &reports {
        sink.write_record(report).unwrap();
    }
    assert_eq!(sink.processed(), 2);

    let bytes: Vec<u8> = sink.into_inner().unwrap();
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    let devices: Vec<(&str, &str)> = rows.iter().map(|r| (&r[4], &r[5])).collect();

    // Chain stops at Kyland-2, the relay after it is still checked. The second
    // TM ends at its physical host.
    assert_eq!(
        devices,
        vec![
            ("Sdwan", "10.1.1.97"),
            ("ULAK_Fiziksel", "10.1.1.99"),
            ("ULAK_Sanal", "10.1.1.98"),
            ("Kyland-1", "10.1.1.94"),
            ("SEL3555(O)", "10.1.1.93"),
            ("Kyland-2", "10.1.1.92"),
            ("SEL3530_1", "10.1.1.67"),
            ("Sdwan", "10.1.2.97"),
            ("ULAK_Fiziksel", "10.1.2.99"),
        ]
    );

    assert_eq!(&rows[0][2], "OTOMASYONLU");
    assert_eq!(&rows[4][7], "HTTPS_KAPALI (Ping Var)");
    assert_eq!(&rows[5][6], "FAILED");
    assert_eq!(&rows[5][7], "N/A");
    assert_eq!(&rows[7][2], "KLASİK");
    assert_eq!(&rows[8][6], "FAILED");
}

#[tokio::test]
async fn device_type_scope_visits_only_matching_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "veritabani.csv", INVENTORY);

    let settings: Settings = Settings::rooted_at(dir.path());
    let inventory: Inventory = Inventory::load(&settings.inventory).unwrap();
    let invocation: Invocation = Invocation {
        target: "1".to_string(),
        secondary: Some("kyland".to_string()),
        verbose: false,
    };
    let config: RunConfig = resolve(&invocation, &inventory, &settings, &mut FailClosedPrompt).unwrap();

    let network: Network = Network {
        down: BTreeSet::new(),
        closed: BTreeSet::new(),
    };
    let engine: ProbeEngine = ProbeEngine::new(Box::new(network), None, ProbeOptions::from(&config));
    let reports: Vec<RecordReport> = engine.run(config.select(&inventory), 1).collect().await;

    let visible: Vec<String> = reports
        .iter()
        .flat_map(|r| r.visible())
        .map(|result| result.endpoint.label.clone())
        .collect();
    assert_eq!(visible, vec!["Kyland-1", "Kyland-2", "Kyland-3", "Kyland-1"]);
}
