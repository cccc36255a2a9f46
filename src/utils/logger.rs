use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Installs `env_logger` once per process. `RUST_LOG` overrides the default
/// `info` level, e.g. `RUST_LOG=r_ehash=debug` to see every bucket split.
pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(LevelFilter::Info)
            .filter_module("r_ehash", LevelFilter::Info)
            .format_timestamp_millis()
            .parse_default_env();

        // Another logger may already be installed by the embedding program.
        let _ = builder.try_init();
    });
}
