pub mod analyze;
pub mod init;

pub use analyze::{analyze, apply_gate, AnalyzeConfig, GateStatus};
pub use init::{init_config, init_config_in};
