use env_logger::Env;
use log::LevelFilter;

/// Default log level when `RUST_LOG` is unset.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install `env_logger` as the global logger. `RUST_LOG` overrides the
/// default level.
pub fn init_logging(verbose: bool) {
    let level = default_level(verbose).as_str().to_ascii_lowercase();
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
    log::debug!("logging initialized");
}
