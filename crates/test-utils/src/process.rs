//! Helpers for tests that launch real `sh` processes.

use std::path::Path;
use std::time::Duration;

use devloop::task::TaskDescriptor;

/// Task running `script` under `sh -c`. The script must not contain `'`.
pub fn sh_task(script: &str) -> TaskDescriptor {
    assert!(!script.contains('\''), "sh_task scripts cannot contain single quotes");
    TaskDescriptor::plain(format!("sh -c '{script}'"))
}

/// Whether `pid` still names a process (Linux `/proc` check).
///
/// A reaped child disappears from `/proc`; a zombie does not.
pub fn pid_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// Poll until `path` exists, giving up after `timeout`.
pub async fn wait_for_file(path: &Path, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    path.exists()
}

/// Read the lines of `path`, or an empty list if it does not exist yet.
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
