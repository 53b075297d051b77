use std::io::{self, IsTerminal};
use std::net::Ipv4Addr;

use clap::Parser;
use tmcheck_common::config::Settings;
use tmcheck_common::filter::{FailClosedPrompt, ResolverPrompt};
use tmcheck_common::inventory::Inventory;
use tmcheck_core::session::{
    self, CrosstermTerminal, Credentials, DeviceClass, SessionTarget, literal_address,
    resolve_address,
};

use crate::terminal::print;
use crate::terminal::prompt::ConsolePrompt;

#[derive(Parser, Debug)]
#[command(name = "tmssh")]
#[command(about = "Log in to a TM switch or virtualization host.")]
pub struct SessionLine {
    /// kyland or ulak
    pub device: String,
    /// TM name or IPv4 address
    pub target: String,
}

impl SessionLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

pub fn run(line: &SessionLine, settings: &Settings) -> anyhow::Result<()> {
    let class: DeviceClass = line.device.parse()?;
    let credentials: Credentials = Credentials::from_env(class)?;

    // Literal addresses skip the inventory entirely.
    let address: Ipv4Addr = match literal_address(&line.target)? {
        Some(address) => address,
        None => {
            let inventory: Inventory = Inventory::load(&settings.inventory)?;
            let mut prompt: Box<dyn ResolverPrompt> = if io::stdin().is_terminal() {
                Box::new(ConsolePrompt::stdin())
            } else {
                Box::new(FailClosedPrompt)
            };
            resolve_address(class, &line.target, inventory.records(), prompt.as_mut())?
        }
    };

    let target: SessionTarget = SessionTarget {
        class,
        address,
        credentials,
    };

    print::header("remote session");
    print::aligned_line("device", class.keyword().to_uppercase());
    print::aligned_line("address", address.to_string());
    print::aligned_line("user", target.credentials.user.clone());
    print::fat_separator();

    let result = session::run(&target, &mut CrosstermTerminal);

    print::print("");
    print::end_of_program();
    tmcheck_common::info!("session with {address} ended");
    Ok(result?)
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
    fn session_line_should_take_class_and_target() {
        let line: SessionLine = SessionLine::parse_from(["tmssh", "kyland", "Bagcilar"]);
        assert_eq!(line.device, "kyland");
        assert_eq!(line.target, "Bagcilar");
    }

    #[test]
    fn unknown_class_should_fail_before_anything_else() {
        let line: SessionLine = SessionLine {
            device: "sel".to_string(),
            target: "10.0.0.1".to_string(),
        };
        let dir = tempfile::tempdir().unwrap();

        let err = run(&line, &Settings::rooted_at(dir.path())).unwrap_err();
        assert!(err.to_string().contains("unknown device class"));
    }
}
