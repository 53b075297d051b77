//! # Target Resolution
//!
//! Turns the positional command line (`[target] [secondary] [-v]`) plus the
//! loaded inventory into one immutable [`RunConfig`]. All argument errors
//! surface here, before any probe is sent.
//!
//! * `target`: region number, TM name fragment, list file (`*.txt`), a mode
//!   keyword (`list`, `report`) or a device type.
//! * `secondary`: device-type filter, remote show-command, or `ALL` for the
//!   inventory listing. See [`Secondary`].

use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::Settings;
use crate::error::{ConfigError, InputError, Result};
use crate::inventory::{DeviceRecord, Inventory};
use crate::text::{contains_normalized, normalize};
use crate::topology::Role;
use crate::{info, warn};

mod list_file;
mod names;

pub use list_file::{TargetList, match_target_list, read_target_list};
pub use names::{FailClosedPrompt, NameMatch, ResolvedName, ResolverPrompt, match_name, resolve_name};

/// Echo requests for a single-TM detail check. Also enables deep diagnostics.
pub const DETAILED_PING_COUNT: u8 = 4;
pub const QUICK_PING_COUNT: u8 = 1;

const LIST_KEYWORDS: [&str; 5] = ["ALL", "all", "*", "list", "LIST"];
const LISTING_SENTINELS: [&str; 3] = ["ALL", "all", "*"];
const REPORT_KEYWORDS: [&str; 6] = ["RAPOR", "rapor", "full", "FULL", "REPORT", "report"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceType {
    Sdwan,
    Sel3555,
    Sel3530,
    Ulak,
    Kyland,
}

impl DeviceType {
    pub const ALL: [DeviceType; 5] = [
        DeviceType::Sdwan,
        DeviceType::Sel3555,
        DeviceType::Sel3530,
        DeviceType::Ulak,
        DeviceType::Kyland,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sdwan => "Sdwan",
            Self::Sel3555 => "SEL3555",
            Self::Sel3530 => "SEL3530",
            Self::Ulak => "Ulak",
            Self::Kyland => "Kyland",
        }
    }

    /// Whether endpoints of this role belong to the device type.
    pub fn matches(&self, role: &Role) -> bool {
        match (self, role) {
            (Self::Sdwan, Role::Gateway) => true,
            (Self::Ulak, Role::VirtualHostPhysical | Role::VirtualHostVirtual) => true,
            (Self::Kyland, Role::Switch(_)) => true,
            (Self::Sel3555, Role::Relay(0)) => true,
            (Self::Sel3530, Role::Relay(i)) => *i > 0,
            _ => false,
        }
    }
}

impl FromStr for DeviceType {
    type Err = InputError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InputError::InvalidDeviceType(s.to_string()))
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Show-commands that may be sent to a TM's primary switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteCommand {
    InterfaceBrief,
    VlanBrief,
    Clock,
}

impl RemoteCommand {
    pub const ALL: [RemoteCommand; 3] = [
        RemoteCommand::InterfaceBrief,
        RemoteCommand::VlanBrief,
        RemoteCommand::Clock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InterfaceBrief => "show interface brief",
            Self::VlanBrief => "show vlan brief",
            Self::Clock => "show clock",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(token.trim()))
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meaning of the second positional argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Secondary {
    DeviceTypeFilter(DeviceType),
    RemoteCommand(RemoteCommand),
    InventoryListing,
}

impl FromStr for Secondary {
    type Err = InputError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(command) = RemoteCommand::parse(s) {
            return Ok(Self::RemoteCommand(command));
        }
        if LISTING_SENTINELS.contains(&s) {
            return Ok(Self::InventoryListing);
        }
        s.parse::<DeviceType>()
            .map(Self::DeviceTypeFilter)
            .map_err(|_| InputError::InvalidSecondary(s.to_string()))
    }
}

/// Which TMs a run iterates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    All,
    Region(u32),
    Name { name: String, exact: bool },
    File(BTreeSet<Ipv4Addr>),
    /// Every TM, visiting only endpoints of the given type.
    DeviceType(DeviceType),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSpec {
    pub scope: Scope,
    pub device_type: Option<DeviceType>,
}

impl FilterSpec {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            device_type: None,
        }
    }

    pub fn with_device_type(mut self, device_type: Option<DeviceType>) -> Self {
        self.device_type = device_type;
        self
    }

    /// Device-type constraint from either the second token or the scope itself.
    pub fn device_filter(&self) -> Option<DeviceType> {
        match self.scope {
            Scope::DeviceType(t) => Some(t),
            _ => self.device_type,
        }
    }

    pub fn selects(&self, record: &DeviceRecord) -> bool {
        match &self.scope {
            Scope::All | Scope::DeviceType(_) => true,
            Scope::Region(region) => record.region == *region,
            Scope::Name { name, exact: true } => normalize(&record.name) == normalize(name),
            Scope::Name { name, exact: false } => contains_normalized(&record.name, name),
            Scope::File(addresses) => addresses.contains(&record.address),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Probe and print to the console.
    Live,
    /// Probe everything and write a CSV report.
    Report,
    /// Print the inventory table, no probing.
    Listing,
    /// Run a show-command on each selected TM's primary switch.
    Command(RemoteCommand),
}

/// Everything a run needs to know, decided once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub filter: FilterSpec,
    pub mode: RunMode,
    /// Echo requests per reachability check.
    pub ping_count: u8,
    /// `-v`: deep diagnostics, printed inline.
    pub verbose: bool,
    pub inventory: PathBuf,
}

impl RunConfig {
    /// Version checks run for single-TM detail checks and with `-v`.
    pub fn deep(&self) -> bool {
        self.ping_count >= DETAILED_PING_COUNT || self.verbose
    }

    pub fn select<'a>(&self, inventory: &'a Inventory) -> Vec<&'a DeviceRecord> {
        inventory
            .records()
            .iter()
            .filter(|r| self.filter.selects(r))
            .collect()
    }
}

/// Positional arguments after the optional inventory path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    pub target: String,
    pub secondary: Option<String>,
    pub verbose: bool,
}

/// Builds the run configuration for an invocation.
///
/// `prompt` is consulted only when a name fragment matches several TMs.
pub fn resolve(
    invocation: &Invocation,
    inventory: &Inventory,
    settings: &Settings,
    prompt: &mut dyn ResolverPrompt,
) -> Result<RunConfig> {
    let target: &str = invocation.target.trim();
    let mut config: RunConfig = RunConfig {
        filter: FilterSpec::new(Scope::All),
        mode: RunMode::Live,
        ping_count: QUICK_PING_COUNT,
        verbose: invocation.verbose,
        inventory: inventory.path().to_path_buf(),
    };

    if target.to_lowercase().ends_with(".txt") {
        let path: PathBuf = settings
            .locate_source_file(target)
            .ok_or_else(|| ConfigError::ListFileMissing(PathBuf::from(target)))?;
        let device_type: Option<DeviceType> = invocation
            .secondary
            .as_deref()
            .map(str::parse::<DeviceType>)
            .transpose()?;

        let list: TargetList = read_target_list(&path, inventory.records())?;
        if !list.unmatched.is_empty() {
            warn!(
                "{} entries of {} matched no TM and are skipped: {}",
                list.unmatched.len(),
                path.display(),
                list.unmatched.join(", ")
            );
        }
        info!("{} TMs selected from {}", list.addresses.len(), path.display());

        config.filter = FilterSpec::new(Scope::File(list.addresses)).with_device_type(device_type);
        return Ok(config);
    }

    match invocation.secondary.as_deref() {
        Some(token) => match token.parse::<Secondary>()? {
            Secondary::RemoteCommand(command) => {
                config.filter = FilterSpec::new(name_scope(inventory, target, prompt)?);
                config.mode = RunMode::Command(command);
                config.ping_count = DETAILED_PING_COUNT;
            }
            Secondary::InventoryListing => {
                config.mode = RunMode::Listing;
                config.filter = FilterSpec::new(match parse_region(target) {
                    Some(region) => region_scope(inventory, region)?,
                    None => Scope::Name {
                        name: target.to_string(),
                        exact: false,
                    },
                });
            }
            Secondary::DeviceTypeFilter(device_type) => {
                let scope: Scope = match parse_region(target) {
                    Some(region) => region_scope(inventory, region)?,
                    None => {
                        config.ping_count = DETAILED_PING_COUNT;
                        name_scope(inventory, target, prompt)?
                    }
                };
                config.filter = FilterSpec::new(scope).with_device_type(Some(device_type));
            }
        },
        None => {
            if let Some(region) = parse_region(target) {
                config.filter = FilterSpec::new(region_scope(inventory, region)?);
            } else if LIST_KEYWORDS.contains(&target) {
                config.mode = RunMode::Listing;
            } else if REPORT_KEYWORDS.contains(&target) {
                config.mode = RunMode::Report;
            } else if let Ok(device_type) = target.parse::<DeviceType>() {
                config.filter = FilterSpec::new(Scope::DeviceType(device_type));
            } else {
                config.filter = FilterSpec::new(name_scope(inventory, target, prompt)?);
                config.ping_count = DETAILED_PING_COUNT;
            }
        }
    }

    Ok(config)
}

fn parse_region(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn region_scope(inventory: &Inventory, region: u32) -> Result<Scope> {
    if !inventory.has_region(region) {
        return Err(InputError::UnknownRegion(region).into());
    }
    Ok(Scope::Region(region))
}

fn name_scope(inventory: &Inventory, term: &str, prompt: &mut dyn ResolverPrompt) -> Result<Scope> {
    let resolved: ResolvedName = resolve_name(inventory.records(), term, prompt)?;
    let name: String = if resolved.exact {
        resolved.record.name.clone()
    } else {
        term.to_string()
    };
    Ok(Scope::Name {
        name,
        exact: resolved.exact,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
