#[macro_use]
pub mod macros;

pub mod config;
pub mod error;
pub mod filter;
pub mod inventory;
pub mod text;
pub mod topology;
