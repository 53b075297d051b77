use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::path::Path;

use crate::error::{ConfigError, InputError, Result};
use crate::inventory::DeviceRecord;
use crate::text::normalize;

/// TM addresses selected by a list file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TargetList {
    pub addresses: BTreeSet<Ipv4Addr>,
    /// Lines that matched nothing, in file order.
    pub unmatched: Vec<String>,
}

/// Reads a list file and matches its lines against the inventory.
///
/// An empty selection is an error; unmatched lines are returned for the
/// caller to warn about.
pub fn read_target_list(path: &Path, records: &[DeviceRecord]) -> Result<TargetList> {
    let contents: String = std::fs::read_to_string(path).map_err(|source| ConfigError::ListFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let list: TargetList = match_target_list(&contents, records);
    if list.addresses.is_empty() {
        return Err(InputError::EmptyTargetList(path.to_path_buf()).into());
    }
    Ok(list)
}

/// Each non-blank line is either an IPv4 literal, compared for equality with
/// the TM address, or a name fragment. A fragment selects every TM containing
/// it.
pub fn match_target_list(contents: &str, records: &[DeviceRecord]) -> TargetList {
    let mut list: TargetList = TargetList::default();

    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut matched: bool = false;

        if looks_like_ipv4(line) {
            if let Ok(addr) = line.parse::<Ipv4Addr>() {
                for record in records.iter().filter(|r| r.address == addr) {
                    list.addresses.insert(record.address);
                    matched = true;
                }
            }
        } else {
            let key: String = normalize(line);
            for record in records.iter().filter(|r| normalize(&r.name).contains(&key)) {
                list.addresses.insert(record.address);
                matched = true;
            }
        }

        if !matched {
            list.unmatched.push(line.to_string());
        }
    }

    list
}

/// Four dot-separated groups of one to three digits.
fn looks_like_ipv4(token: &str) -> bool {
    let groups: Vec<&str> = token.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
