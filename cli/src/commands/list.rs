use colored::*;
use tmcheck_common::filter::RunConfig;
use tmcheck_common::inventory::{DeviceRecord, Inventory};

use crate::terminal::colors;
use crate::terminal::format;
use crate::terminal::print;

pub fn list(config: &RunConfig, inventory: &Inventory) -> anyhow::Result<()> {
    let records: Vec<&DeviceRecord> = config.select(inventory);

    print::header("inventory");
    print::aligned_line("source", inventory.path().display().to_string());
    print::rule();
    print::print(&format::listing_header());
    print::rule();
    for record in &records {
        print::print(&format::listing_line(record));
    }
    print::rule();
    print::print(&format!(
        "{} {}",
        "TOPLAM TM SAYISI:".color(colors::PRIMARY),
        records.len().to_string().bold()
    ));
    print::end_of_program();
    Ok(())
}
