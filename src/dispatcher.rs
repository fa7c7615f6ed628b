use futures::stream::{self, StreamExt};
use log::{debug, error, info};

use crate::common::config::{CommandEntry, HostEntry};
use crate::dispatcher::executor::{Execute, ExecutionResult};
use crate::dispatcher::writer::Writer;

pub mod executor;
pub mod writer;

pub struct Dispatcher<E> {
    executor: E,
    nproc: usize,
}

impl<E: Execute> Dispatcher<E> {
    pub fn new(executor: E, nproc: usize) -> Dispatcher<E> {
        Dispatcher { executor, nproc }
    }

    /// Runs every command in file order. Hosts within one command run in
    /// parallel, bounded by `nproc`; a host failure is logged and skipped
    /// without aborting the rest of the fleet or the remaining commands.
    pub async fn run(&self, cmds: &[CommandEntry], hosts: &[HostEntry], writer: &Writer) {
        for cmd in cmds {
            info!("running `{}` on {} hosts", cmd.name, hosts.len());
            for ret in self.fan_out(cmd, hosts).await {
                if let Some(err) = &ret.stderr {
                    error!("`{}` on {} failed: {}", ret.cmd, ret.host, err);
                    continue;
                }
                match writer.write(&ret) {
                    Ok(path) => debug!("wrote {}", path.display()),
                    Err(err) => {
                        error!("`{}` on {}: writing result failed: {err:#}", ret.cmd, ret.host)
                    }
                }
            }
        }
    }

    // Completion order is nondeterministic; sorting by host name makes the
    // write order reproducible across runs.
    async fn fan_out(&self, cmd: &CommandEntry, hosts: &[HostEntry]) -> Vec<ExecutionResult> {
        let mut rets: Vec<ExecutionResult> = stream::iter(hosts)
            .map(|host| self.executor.exec(cmd, host))
            .buffer_unordered(self.nproc)
            .collect()
            .await;
        rets.sort_by(|a, b| a.host.cmp(&b.host));
        rets
    }
}
