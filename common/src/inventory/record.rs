use std::net::Ipv4Addr;

/// One TM as registered in the inventory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceRecord {
    pub region: u32,
    pub name: String,
    /// Registered TM address. Its trailing octet selects the topology variant.
    pub address: Ipv4Addr,
    /// Extra relays addressed at `.66 + i` (column 4, default 0).
    pub relay_count: u32,
    /// Switches in the chain anchored at `.94` (column 5, default 1).
    pub switch_count: u32,
    /// Management VLAN (column 6, default 0). Informational only.
    pub vlan: u32,
}

pub const DEFAULT_RELAY_COUNT: u32 = 0;
pub const DEFAULT_SWITCH_COUNT: u32 = 1;
pub const DEFAULT_VLAN: u32 = 0;

impl DeviceRecord {
    /// Builds a record from raw inventory fields.
    ///
    /// Returns `None` for rows that are not records: fewer than three fields,
    /// a non-numeric region (header lines land here) or an unusable address.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        if fields.len() < 3 {
            return None;
        }
        let cleaned: Vec<String> = fields.iter().map(|f| clean_field(f.as_ref())).collect();

        let region: u32 = parse_digits(&cleaned[0])?;
        let name: String = cleaned[1].clone();
        let address: Ipv4Addr = cleaned[2].parse().ok()?;

        Some(Self {
            region,
            name,
            address,
            relay_count: count_or(cleaned.get(3), DEFAULT_RELAY_COUNT),
            switch_count: count_or(cleaned.get(4), DEFAULT_SWITCH_COUNT),
            vlan: count_or(cleaned.get(5), DEFAULT_VLAN),
        })
    }

    pub fn prefix(&self) -> [u8; 3] {
        let [a, b, c, _] = self.address.octets();
        [a, b, c]
    }

    /// `a.b.c` as written in the report's `TM_Prefix` column.
    pub fn prefix_string(&self) -> String {
        let [a, b, c] = self.prefix();
        format!("{a}.{b}.{c}")
    }

    pub fn trailing_octet(&self) -> u8 {
        self.address.octets()[3]
    }

    /// Address in this TM's /24 with the given last octet.
    pub fn sibling(&self, octet: u8) -> Ipv4Addr {
        let [a, b, c] = self.prefix();
        Ipv4Addr::new(a, b, c, octet)
    }

    /// The record in inventory column order.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.region.to_string(),
            self.name.clone(),
            self.address.to_string(),
            self.relay_count.to_string(),
            self.switch_count.to_string(),
            self.vlan.to_string(),
        ]
    }
}

fn clean_field(raw: &str) -> String {
    raw.trim().replace('"', "")
}

fn parse_digits(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn count_or(field: Option<&String>, default: u32) -> u32 {
    field.and_then(|f| parse_digits(f)).unwrap_or(default)
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

    #[test]
    fn from_fields_should_apply_count_defaults() {
        let record: DeviceRecord = DeviceRecord::from_fields(&["5", "Bagcilar TM", "10.1.1.93"]).unwrap();
        assert_eq!(record.region, 5);
        assert_eq!(record.relay_count, 0);
        assert_eq!(record.switch_count, 1);
        assert_eq!(record.vlan, 0);
    }

    #[test]
    fn from_fields_should_strip_quotes_and_whitespace() {
        let record: DeviceRecord =
            DeviceRecord::from_fields(&[" 12 ", "\"Esenler\"", " 10.2.3.66", "2", "x", "140"]).unwrap();
        assert_eq!(record.name, "Esenler");
        assert_eq!(record.address, Ipv4Addr::new(10, 2, 3, 66));
        assert_eq!(record.relay_count, 2);
        assert_eq!(record.switch_count, DEFAULT_SWITCH_COUNT);
        assert_eq!(record.vlan, 140);
    }

    #[test]
    fn from_fields_should_reject_non_records() {
        assert!(DeviceRecord::from_fields(&["Bolge", "Ad", "IP"]).is_none());
        assert!(DeviceRecord::from_fields(&["5", "Short"]).is_none());
        assert!(DeviceRecord::from_fields(&["+5", "Signed", "10.0.0.1"]).is_none());
        assert!(DeviceRecord::from_fields(&["5", "BadIp", "10.0.0"]).is_none());
    }

    #[test]
    fn sibling_should_keep_prefix() {
        let record: DeviceRecord = DeviceRecord::from_fields(&["1", "A", "172.16.40.93"]).unwrap();
        assert_eq!(record.sibling(97), Ipv4Addr::new(172, 16, 40, 97));
        assert_eq!(record.prefix_string(), "172.16.40");
        assert_eq!(record.trailing_octet(), 93);
    }
}
