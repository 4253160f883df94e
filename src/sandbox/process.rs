// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Process-group cleanup for sandboxed runs.

use tracing::{debug, warn};

/// Kills a child's whole process group when dropped.
///
/// The child must have been spawned as a group leader
/// (`process_group(0)`), so its pid is also the group id. Killing the group
/// reaches anything the snippet forked as well.
#[derive(Debug)]
pub struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    pub fn new(pid: Option<u32>) -> Self {
        Self { pgid: pid }
    }

    /// Group id being guarded, if still armed.
    pub fn pgid(&self) -> Option<u32> {
        self.pgid
    }

    /// SIGKILL the group now and disarm the guard.
    pub fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_group(pgid);
        }
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        warn!(pgid, "Process group id out of range");
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => debug!(pgid, "Sent SIGKILL to process group"),
        // Everything in the group already exited
        Err(Errno::ESRCH) => {}
        Err(e) => warn!(pgid, error = %e, "Failed to kill process group"),
    }
}

#[cfg(not(unix))]
fn kill_group(pgid: u32) {
    // Without process groups the child itself is killed through kill_on_drop.
    debug!(pgid, "Process group kill unsupported on this platform");
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::process::Command;

    #[tokio::test]
    async fn test_drop_kills_group() {
        let mut child = Command::new("sh")
            .args(["-c", "sleep 30 & sleep 30"])
            .process_group(0)
            .spawn()
            .unwrap();
        let guard = ProcessGroupGuard::new(child.id());
        assert!(guard.pgid().is_some());
        drop(guard);

        let status = tokio::time::timeout(Duration::from_secs(5), child.wait())
            .await
            .expect("child should die with its group")
            .unwrap();
        assert!(!status.success());
    }

    #[test]
    fn test_kill_disarms() {
        let mut guard = ProcessGroupGuard::new(None);
        guard.kill();
        assert_eq!(guard.pgid(), None);
    }
}
