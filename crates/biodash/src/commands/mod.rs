//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod sites;
pub mod util;
