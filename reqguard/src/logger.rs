// reqguard/src/logger.rs
//! Logger setup for the CLI.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Initializes `env_logger` once for the process.
///
/// An explicit `level` wins over `RUST_LOG` for the reqguard crates; with
/// `None` the environment decides and defaults to `warn`. Calling this twice
/// is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder
            .filter_module("reqguard", level)
            .filter_module("reqguard_core", level);
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{} {}] {}",
            record.level(),
            record.target(),
            record.args()
        )
    });
    let _ = builder.target(env_logger::Target::Stderr).try_init();
}
