use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use secrecy::SecretString;
use tmcheck_common::error::{InputError, Result};
use tmcheck_common::filter::{ResolverPrompt, resolve_name};
use tmcheck_common::inventory::DeviceRecord;
use tmcheck_common::topology::SWITCH_ANCHOR_OCTET;

use super::SessionError;

const VIRTUAL_HOST_OCTET: u8 = 98;

/// What kind of box the session logs into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    /// Primary Kyland switch.
    Switch,
    /// ULAK virtualization host, virtual interface.
    VirtualHost,
}

impl DeviceClass {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Switch => "kyland",
            Self::VirtualHost => "ulak",
        }
    }

    /// Last octet of the device inside a TM prefix.
    pub fn octet(&self) -> u8 {
        match self {
            Self::Switch => SWITCH_ANCHOR_OCTET,
            Self::VirtualHost => VIRTUAL_HOST_OCTET,
        }
    }

    pub fn default_user(&self) -> &'static str {
        match self {
            Self::Switch => "admin",
            Self::VirtualHost => "cliadmin",
        }
    }

    pub fn user_variable(&self) -> &'static str {
        match self {
            Self::Switch => "TMSSH_KYLAND_USER",
            Self::VirtualHost => "TMSSH_ULAK_USER",
        }
    }

    pub fn password_variable(&self) -> &'static str {
        match self {
            Self::Switch => "TMSSH_KYLAND_PASSWORD",
            Self::VirtualHost => "TMSSH_ULAK_PASSWORD",
        }
    }
}

impl FromStr for DeviceClass {
    type Err = SessionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kyland" => Ok(Self::Switch),
            "ulak" => Ok(Self::VirtualHost),
            _ => Err(SessionError::UnknownDeviceClass(s.to_string())),
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

pub struct Credentials {
    pub user: String,
    pub password: SecretString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Reads the credentials for a class through `lookup`, normally
    /// `std::env::var`. The password has no default.
    pub fn lookup<F>(class: DeviceClass, lookup: F) -> std::result::Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user: String = lookup(class.user_variable())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| class.default_user().to_string());
        let password: String = lookup(class.password_variable())
            .filter(|p| !p.is_empty())
            .ok_or(SessionError::MissingPassword(class.password_variable()))?;

        Ok(Self {
            user,
            password: SecretString::from(password),
        })
    }

    pub fn from_env(class: DeviceClass) -> std::result::Result<Self, SessionError> {
        Self::lookup(class, |name| std::env::var(name).ok())
    }
}

#[derive(Debug)]
pub struct SessionTarget {
    pub class: DeviceClass,
    pub address: Ipv4Addr,
    pub credentials: Credentials,
}

impl SessionTarget {
    /// `user@address` for the ssh command line.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.credentials.user, self.address)
    }
}

/// Turns the operator's target into the device address.
///
/// An IPv4 literal is used as given. Anything else is looked up as a TM name
/// and the last octet of the TM address is swapped for the class octet.
pub fn resolve_address(
    class: DeviceClass,
    term: &str,
    records: &[DeviceRecord],
    prompt: &mut dyn ResolverPrompt,
) -> Result<Ipv4Addr> {
    if let Some(literal) = literal_address(term)? {
        return Ok(literal);
    }
    let resolved = resolve_name(records, term, prompt)?;
    Ok(resolved.record.sibling(class.octet()))
}

/// `Some` for four dot-separated decimal octets. Four numeric groups with an
/// octet above 255 are rejected rather than treated as a name.
pub fn literal_address(term: &str) -> Result<Option<Ipv4Addr>> {
    let groups: Vec<&str> = term.trim().split('.').collect();
    let numeric: bool = groups.len() == 4
        && groups
            .iter()
            .all(|g| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit()));
    if !numeric {
        return Ok(None);
    }

    let mut octets: [u8; 4] = [0; 4];
    for (slot, group) in octets.iter_mut().zip(&groups) {
        *slot = group
            .parse::<u8>()
            .map_err(|_| InputError::InvalidAddress(term.to_string()))?;
    }
    Ok(Some(Ipv4Addr::from(octets)))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
