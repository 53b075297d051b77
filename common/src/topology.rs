//! # TM Topology
//!
//! Every TM is built the same way: an SD-WAN gateway, a ULAK virtualization
//! host (physical and virtual interface), a chain of Kyland switches and a set
//! of SEL relays. Only the counts differ, and the last octet of the registered
//! address picks between two addressing conventions.
//!
//! [`derive`] turns a [`DeviceRecord`] into the ordered endpoint list. The
//! offsets below are the convention the field network was built with and must
//! not drift.

use std::fmt;
use std::net::Ipv4Addr;

use crate::inventory::DeviceRecord;

const GATEWAY_OCTET: u8 = 97;
const VHOST_PHYSICAL_OCTET: u8 = 99;
const VHOST_VIRTUAL_OCTET: u8 = 98;
pub const SWITCH_ANCHOR_OCTET: u8 = 94;
const RELAY_BASE_OCTET: u32 = 66;
const AUTOMATED_OCTET: u8 = 93;
const CLASSIC_OCTET: u8 = 66;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopologyVariant {
    /// Registered address ends in `.93`.
    Automated,
    /// Registered address ends in `.66`.
    Classic,
    Unknown,
}

impl TopologyVariant {
    pub fn of(record: &DeviceRecord) -> Self {
        match record.trailing_octet() {
            AUTOMATED_OCTET => Self::Automated,
            CLASSIC_OCTET => Self::Classic,
            _ => Self::Unknown,
        }
    }

    /// Value of the report's `TM_Tipi` column.
    pub fn report_label(&self) -> &'static str {
        match self {
            Self::Automated => "OTOMASYONLU",
            Self::Classic => "KLASİK",
            Self::Unknown => "BELIRSIZ",
        }
    }

    /// Octet of the k-th switch (k >= 2) in the chain below `.94`.
    fn chain_octet(&self, k: u32) -> Option<u8> {
        let step: u32 = match self {
            Self::Automated => k,
            Self::Classic | Self::Unknown => k - 1,
        };
        u32::from(SWITCH_ANCHOR_OCTET)
            .checked_sub(step)
            .filter(|&o| o > 0)
            .and_then(|o| u8::try_from(o).ok())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    PingOnly,
    Http,
    Https,
}

impl Protocol {
    pub fn port(&self) -> Option<u16> {
        match self {
            Self::PingOnly => None,
            Self::Http => Some(80),
            Self::Https => Some(443),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PingOnly => "PING",
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Gateway,
    VirtualHostPhysical,
    VirtualHostVirtual,
    /// Kyland switch, 1-based position in the chain.
    Switch(u32),
    /// SEL relay. `0` is the unit on the TM's own address.
    Relay(u32),
}

impl Role {
    /// Gateway and virtualization host. Everything else sits behind them.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Gateway | Self::VirtualHostPhysical | Self::VirtualHostVirtual
        )
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, Self::Switch(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub role: Role,
    /// Device name shown to the operator and written to reports.
    pub label: String,
    pub address: Ipv4Addr,
    pub protocol: Protocol,
}

impl Endpoint {
    fn new(role: Role, label: impl Into<String>, address: Ipv4Addr, protocol: Protocol) -> Self {
        Self {
            role,
            label: label.into(),
            address,
            protocol,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.address)
    }
}

/// Ordered endpoints of one TM.
pub fn derive(record: &DeviceRecord) -> Vec<Endpoint> {
    let variant: TopologyVariant = TopologyVariant::of(record);
    let mut endpoints: Vec<Endpoint> = infrastructure(record);

    endpoints.push(Endpoint::new(
        Role::Switch(1),
        "Kyland-1",
        record.sibling(SWITCH_ANCHOR_OCTET),
        Protocol::Http,
    ));

    let primary_relay: &str = match variant {
        TopologyVariant::Automated => "SEL3555(O)",
        _ => "SEL3555",
    };
    endpoints.push(Endpoint::new(
        Role::Relay(0),
        primary_relay,
        record.address,
        Protocol::Https,
    ));

    for k in 2..=record.switch_count {
        let Some(octet) = variant.chain_octet(k) else {
            break;
        };
        endpoints.push(Endpoint::new(
            Role::Switch(k),
            format!("Kyland-{k}"),
            record.sibling(octet),
            Protocol::Http,
        ));
    }

    for i in 1..=record.relay_count {
        let Some(octet) = u8::try_from(RELAY_BASE_OCTET + i).ok().filter(|&o| o < 255) else {
            break;
        };
        endpoints.push(Endpoint::new(
            Role::Relay(i),
            format!("SEL3530_{i}"),
            record.sibling(octet),
            Protocol::Https,
        ));
    }

    endpoints
}

/// Gateway, physical and virtual host, in probe order.
pub fn infrastructure(record: &DeviceRecord) -> Vec<Endpoint> {
    vec![
        Endpoint::new(
            Role::Gateway,
            "Sdwan",
            record.sibling(GATEWAY_OCTET),
            Protocol::PingOnly,
        ),
        Endpoint::new(
            Role::VirtualHostPhysical,
            "ULAK_Fiziksel",
            record.sibling(VHOST_PHYSICAL_OCTET),
            Protocol::PingOnly,
        ),
        Endpoint::new(
            Role::VirtualHostVirtual,
            "ULAK_Sanal",
            record.sibling(VHOST_VIRTUAL_OCTET),
            Protocol::PingOnly,
        ),
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
