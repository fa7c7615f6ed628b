use std::fs::{self, File};
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::dispatcher::executor::ExecutionResult;

/// Stores captured stdout as `<output_dir>/<host>/<cmd>_<run time>.log`.
/// The minute-resolution timestamp is fixed at construction, so every file
/// of one run shares the same suffix and a rerun in the same minute
/// overwrites the previous output.
pub struct Writer {
    output_dir: PathBuf,
    time_str: String,
}

impl Writer {
    pub fn new(output_dir: impl Into<PathBuf>, started_at: DateTime<Local>) -> Writer {
        Writer {
            output_dir: output_dir.into(),
            time_str: started_at.format("%Y%m%d_%H%M").to_string(),
        }
    }

    pub fn write(&self, ret: &ExecutionResult) -> Result<PathBuf> {
        let dir = self.output_dir.join(&ret.host);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let path = dir.join(format!("{}_{}.log", ret.cmd, self.time_str));
        let mut file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(ret.stdout.as_deref().unwrap_or("").as_bytes())?;
        file.write_all(b"\n")?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    fn result(host: &str, cmd: &str, stdout: &str) -> ExecutionResult {
        ExecutionResult {
            host: host.to_string(),
            cmd: cmd.to_string(),
            stdout: Some(stdout.to_string()),
            stderr: None,
        }
    }

    #[test]
    fn writes_stdout_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Writer::new(dir.path(), noon());

        let path = writer.write(&result("web1", "uptime", " 12:00 up 3 days")).unwrap();

        assert_eq!(path, dir.path().join("web1").join("uptime_20240501_1230.log"));
        assert_eq!(fs::read_to_string(&path).unwrap(), " 12:00 up 3 days\n");
    }

    #[test]
    fn rerun_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Writer::new(dir.path(), noon());

        writer.write(&result("web1", "uptime", "first")).unwrap();
        let path = writer.write(&result("web1", "uptime", "second")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
        assert_eq!(fs::read_dir(dir.path().join("web1")).unwrap().count(), 1);
    }

    #[test]
    fn host_directory_holds_one_file_per_command() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Writer::new(dir.path(), noon());

        writer.write(&result("web1", "uptime", "up")).unwrap();
        writer.write(&result("web1", "disks", "45%")).unwrap();

        let host_dir = dir.path().join("web1");
        assert!(host_dir.join("uptime_20240501_1230.log").is_file());
        assert!(host_dir.join("disks_20240501_1230.log").is_file());
    }
}
