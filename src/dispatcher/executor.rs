use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::debug;
use openssh::{KnownHosts, Session, SessionBuilder};
use tokio::time::timeout;

use crate::common::config::{CommandEntry, HostEntry};

/// Outcome of one command on one host. Exactly one of `stdout`/`stderr` is
/// set: `stderr` carries either the trimmed remote stderr or the failure
/// description, and such a result produces no output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub host: String,
    pub cmd: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl ExecutionResult {
    /// Classifies captured streams: any non-whitespace stderr marks the
    /// result as failed and discards stdout.
    pub fn from_streams(
        cmd: &CommandEntry,
        host: &HostEntry,
        stdout: String,
        stderr: String,
    ) -> ExecutionResult {
        let trimmed = stderr.trim();
        ExecutionResult {
            host: host.name.clone(),
            cmd: cmd.name.clone(),
            stdout: if trimmed.is_empty() { Some(stdout) } else { None },
            stderr: if trimmed.is_empty() { None } else { Some(trimmed.to_string()) },
        }
    }

    pub fn failed(cmd: &CommandEntry, host: &HostEntry, reason: String) -> ExecutionResult {
        ExecutionResult {
            host: host.name.clone(),
            cmd: cmd.name.clone(),
            stdout: None,
            stderr: Some(reason),
        }
    }
}

pub trait Execute {
    async fn exec(&self, cmd: &CommandEntry, host: &HostEntry) -> ExecutionResult;
}

/// Runs commands through the system SSH client with ambient credentials
/// (agent or default keys). One session per invocation, closed on all paths.
pub struct SshExecutor {
    timeout: Duration,
    known_hosts: KnownHosts,
}

impl SshExecutor {
    pub fn new(timeout: Duration, known_hosts: KnownHosts) -> SshExecutor {
        SshExecutor { timeout, known_hosts }
    }

    async fn connect(&self, host: &str) -> Result<Session> {
        let mut builder = SessionBuilder::default();
        builder
            .known_hosts_check(self.known_hosts.clone())
            .connect_timeout(self.timeout);
        builder
            .connect(host)
            .await
            .with_context(|| format!("connect to {host} failed"))
    }

    async fn run_command(&self, session: &Session, cmd: &str) -> Result<(String, String)> {
        let output = match timeout(self.timeout, session.shell(cmd).output()).await {
            Ok(output) => output.context("remote command failed")?,
            Err(_) => bail!("command did not finish within {}s", self.timeout.as_secs()),
        };
        Ok((
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}

impl Execute for SshExecutor {
    async fn exec(&self, cmd: &CommandEntry, host: &HostEntry) -> ExecutionResult {
        debug!("{}: connecting to {}", host.name, host.host);
        let session = match self.connect(&host.host).await {
            Ok(session) => session,
            Err(err) => return ExecutionResult::failed(cmd, host, format!("{err:#}")),
        };

        let ret = match self.run_command(&session, &cmd.cmd).await {
            Ok((stdout, stderr)) => ExecutionResult::from_streams(cmd, host, stdout, stderr),
            Err(err) => ExecutionResult::failed(cmd, host, format!("{err:#}")),
        };

        if let Err(err) = session.close().await {
            debug!("{}: closing session failed: {err}", host.name);
        }
        ret
    }
}
