use env_logger::{Builder, Target};
use log::LevelFilter;

pub enum LogTarget {
    Stderr,
    Stdout,
}

/// Logger settings resolved by the entry point. `RUST_LOG` still wins over
/// the configured level so a run can be made chattier without a flag change.
pub struct LogOptions {
    pub level: LevelFilter,
    pub target: LogTarget,
    pub timestamps: bool,
}

impl Default for LogOptions {
    fn default() -> LogOptions {
        LogOptions {
            level: LevelFilter::Info,
            target: LogTarget::Stderr,
            timestamps: true,
        }
    }
}

pub fn init(opts: LogOptions) {
    let mut builder = Builder::new();
    builder.filter_level(opts.level);
    builder.target(match opts.target {
        LogTarget::Stderr => Target::Stderr,
        LogTarget::Stdout => Target::Stdout,
    });
    if !opts.timestamps {
        builder.format_timestamp(None);
    }
    builder.parse_default_env();
    builder.init();
}
