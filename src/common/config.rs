use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub name: String,
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    pub name: String,
    pub cmd: String,
}

/// Loads `name<TAB>hostname_or_ip` entries. An empty name falls back to the
/// host string, since the name doubles as the output directory.
pub fn load_hosts(path: &Path) -> Result<Vec<HostEntry>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read host file {}", path.display()))?;

    let mut hosts = Vec::new();
    for (lineno, line) in entry_lines(&contents) {
        let (name, host) = split_fields(line).with_context(|| {
            format!("{}:{}: expected `name<TAB>hostname_or_ip`", path.display(), lineno)
        })?;
        hosts.push(HostEntry {
            name: if name.is_empty() { host.to_string() } else { name.to_string() },
            host: host.to_string(),
        });
    }
    Ok(hosts)
}

/// Loads `name<TAB>shell_command` entries. Entries keep file order; the
/// dispatcher runs them one at a time in exactly this order.
pub fn load_cmds(path: &Path) -> Result<Vec<CommandEntry>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read commands file {}", path.display()))?;

    let mut cmds = Vec::new();
    for (lineno, line) in entry_lines(&contents) {
        let (name, cmd) = split_fields(line).with_context(|| {
            format!("{}:{}: expected `name<TAB>shell_command`", path.display(), lineno)
        })?;
        if name.is_empty() {
            bail!(
                "{}:{}: command entry needs a name, it becomes the output file prefix",
                path.display(),
                lineno
            );
        }
        cmds.push(CommandEntry {
            name: name.to_string(),
            cmd: cmd.to_string(),
        });
    }
    Ok(cmds)
}

// 1-based line numbers for diagnostics. Comment and blank lines are not entries.
fn entry_lines(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.starts_with('#') && !line.trim().is_empty())
}

fn split_fields(line: &str) -> Result<(&str, &str)> {
    // Only the first tab separates the fields; a command may contain tabs.
    line.split_once('\t').context("missing tab separator")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn hosts_keep_file_order_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "hosts", "web2\t10.0.0.2\nweb1\t10.0.0.1\nweb2\t10.0.0.2\n");

        let hosts = load_hosts(&path).unwrap();
        let names: Vec<&str> = hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["web2", "web1", "web2"]);
    }

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "hosts", "# fleet\nweb1\t10.0.0.1\n\n   \n#db1\t10.0.0.9\n");

        let hosts = load_hosts(&path).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].host, "10.0.0.1");
    }

    #[test]
    fn empty_host_name_falls_back_to_host() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "hosts", "\t10.0.0.7\n");

        let hosts = load_hosts(&path).unwrap();
        assert_eq!(hosts[0].name, "10.0.0.7");
        assert_eq!(hosts[0].host, "10.0.0.7");
    }

    #[test]
    fn line_without_tab_reports_file_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "hosts", "web1\t10.0.0.1\nweb2 10.0.0.2\n");

        let err = load_hosts(&path).unwrap_err();
        assert!(format!("{err:#}").contains(":2:"), "unexpected error: {err:#}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_hosts(Path::new("/nonexistent/hosts")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/hosts"));
    }

    #[test]
    fn command_without_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "cmds", "\tuptime\n");

        let err = load_cmds(&path).unwrap_err();
        assert!(format!("{err:#}").contains(":1:"), "unexpected error: {err:#}");
    }

    #[test]
    fn command_text_may_contain_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "cmds", "disks\tdf -h\t/data\n");

        let cmds = load_cmds(&path).unwrap();
        assert_eq!(cmds[0].cmd, "df -h\t/data");
    }
}
