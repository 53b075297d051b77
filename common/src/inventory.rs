//! # Inventory Store
//!
//! Loads the flat TM inventory (`region,name,address[,relays][,switches][,vlan]`)
//! into an ordered, immutable collection. Rows that are not records are
//! skipped silently; only an inventory with no usable rows at all is an error.

use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, Trim};
use tracing::debug;

use crate::error::{ConfigError, Result};

mod record;

pub use record::{DEFAULT_RELAY_COUNT, DEFAULT_SWITCH_COUNT, DEFAULT_VLAN, DeviceRecord};

#[derive(Clone, Debug)]
pub struct Inventory {
    path: PathBuf,
    records: Vec<DeviceRecord>,
}

impl Inventory {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ConfigError::InventoryMissing(path.to_path_buf()).into());
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|source| ConfigError::InventoryRead {
                path: path.to_path_buf(),
                source,
            })?;

        let mut records: Vec<DeviceRecord> = Vec::new();
        let mut raw: ByteRecord = ByteRecord::new();
        let mut line: usize = 0;

        loop {
            let more: bool = reader
                .read_byte_record(&mut raw)
                .map_err(|source| ConfigError::InventoryRead {
                    path: path.to_path_buf(),
                    source,
                })?;
            if !more {
                break;
            }
            line += 1;

            let fields: Vec<String> = raw
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect();

            match DeviceRecord::from_fields(&fields) {
                Some(record) => records.push(record),
                None => debug!("inventory line {line} skipped: {fields:?}"),
            }
        }

        if records.is_empty() {
            return Err(ConfigError::InventoryEmpty(path.to_path_buf()).into());
        }

        debug!("loaded {} records from {}", records.len(), path.display());
        Ok(Self::from_records(path, records))
    }

    /// Wraps already-parsed records, applying the `(region, name)` order.
    pub fn from_records(path: &Path, mut records: Vec<DeviceRecord>) -> Self {
        records.sort_by(|a, b| (a.region, &a.name).cmp(&(b.region, &b.name)));
        Self {
            path: path.to_path_buf(),
            records,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[DeviceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_region(&self, region: u32) -> bool {
        self.records.iter().any(|r| r.region == region)
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
    use crate::error::Error;
    use std::net::Ipv4Addr;

    fn write_inventory(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("veritabani.csv");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn load_should_skip_headers_and_short_rows_and_sort() {
        let (_dir, path) = write_inventory(
            "Bolge,Ad,IP,3530,Kyland,Vlan\n\
             7,Zeytinburnu,10.7.1.66\n\
             3,\"Esenler\",10.3.1.93,2,3,120\n\
             3,Bagcilar TM,10.3.2.93\n\
             broken\n",
        );

        let inventory: Inventory = Inventory::load(&path).unwrap();
        let names: Vec<&str> = inventory.records().iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["Bagcilar TM", "Esenler", "Zeytinburnu"]);
        assert!(inventory.has_region(3));
        assert!(!inventory.has_region(4));
        assert_eq!(inventory.records()[1].switch_count, 3);
    }

    #[test]
    fn load_should_decode_invalid_utf8_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("inv.csv");
        std::fs::write(&path, b"1,Ba\xffcilar,10.0.0.93\n").unwrap();

        let inventory: Inventory = Inventory::load(&path).unwrap();
        assert_eq!(inventory.records()[0].name, "Ba\u{fffd}cilar");
    }

    #[test]
    fn load_should_fail_on_missing_or_empty_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let missing: Result<Inventory> = Inventory::load(&dir.path().join("nope.csv"));
        assert!(matches!(missing, Err(Error::Config(ConfigError::InventoryMissing(_)))));

        let (_dir, path) = write_inventory("Bolge,Ad,IP\n");
        let empty: Result<Inventory> = Inventory::load(&path);
        assert!(matches!(empty, Err(Error::Config(ConfigError::InventoryEmpty(_)))));
    }

    #[test]
    fn written_rows_should_parse_back_to_the_same_record() {
        let records: Vec<DeviceRecord> = vec![
            DeviceRecord {
                region: 4,
                name: "Karşıyaka, Yeni".to_string(),
                address: Ipv4Addr::new(10, 4, 4, 93),
                relay_count: 2,
                switch_count: 3,
                vlan: 110,
            },
            DeviceRecord {
                region: 9,
                name: "Tuzla TM".to_string(),
                address: Ipv4Addr::new(10, 9, 1, 66),
                relay_count: 0,
                switch_count: 1,
                vlan: 0,
            },
        ];

        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in &records {
            writer.write_record(record.to_row()).unwrap();
        }
        let bytes: Vec<u8> = writer.into_inner().unwrap();
        let (_dir, path) = write_inventory(&String::from_utf8(bytes).unwrap());

        let reloaded: Inventory = Inventory::load(&path).unwrap();
        assert_eq!(reloaded.records(), records.as_slice());
    }
}
