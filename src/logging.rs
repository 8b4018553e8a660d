use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber. `RUST_LOG` takes precedence over
/// the level picked by `-v`.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::builder().with_default_directive(level_from_verbosity(verbosity).into()).from_env_lossy();
    // A subscriber is already installed when embedded (or under test).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}
