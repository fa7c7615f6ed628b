use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use log::{info, LevelFilter};
use openssh::KnownHosts;

use fanout::common::config;
use fanout::common::logging::{self, LogOptions, LogTarget};
use fanout::dispatcher::executor::SshExecutor;
use fanout::dispatcher::writer::Writer;
use fanout::dispatcher::Dispatcher;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Host file: one `name<TAB>hostname_or_ip` entry per line
    #[arg(long)]
    host: PathBuf,
    /// Commands file: one `name<TAB>shell_command` entry per line
    #[arg(long)]
    cmds: PathBuf,
    /// How many hosts to contact in parallel for each command
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    nproc: u16,
    /// Root directory for per-host result files
    #[arg(long = "output_dir")]
    output_dir: PathBuf,
    /// Connect and command timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
    /// Accept and record unknown host keys instead of requiring known_hosts entries
    #[arg(long)]
    accept_unknown_hosts: bool,
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(LogOptions {
        level: args.log_level,
        target: LogTarget::Stderr,
        timestamps: true,
    });

    let hosts = config::load_hosts(&args.host)?;
    let cmds = config::load_cmds(&args.cmds)?;
    info!("loaded {} hosts and {} commands", hosts.len(), cmds.len());

    let known_hosts = if args.accept_unknown_hosts {
        KnownHosts::Add
    } else {
        KnownHosts::Strict
    };
    let executor = SshExecutor::new(Duration::from_secs(args.timeout), known_hosts);
    // One timestamp per run: files never collide within a run, reruns in the
    // same minute overwrite.
    let writer = Writer::new(&args.output_dir, Local::now());

    Dispatcher::new(executor, args.nproc as usize)
        .run(&cmds, &hosts, &writer)
        .await;

    Ok(())
}
