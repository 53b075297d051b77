pub mod diagnostics;
pub mod probe;
pub mod session;
