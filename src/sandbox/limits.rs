// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Kernel resource limits for the sandboxed interpreter.
//!
//! Applied in the child between `fork` and `exec`, so they bind the
//! interpreter and everything it spawns.

use std::time::Duration;

use tokio::process::Command;

use crate::config::SandboxSettings;

const MIB: u64 = 1024 * 1024;

/// Limits for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    /// CPU seconds; a backstop behind the wall-clock timer.
    pub cpu_secs: u64,
    /// Address space in bytes, 0 for unlimited.
    pub address_space: u64,
    /// Largest file the snippet may write, in bytes.
    pub file_size: u64,
    pub max_processes: Option<u64>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl ResourceLimits {
    pub fn for_run(settings: &SandboxSettings, time_limit: Duration) -> Self {
        let whole_secs = time_limit.as_secs() + u64::from(time_limit.subsec_nanos() > 0);
        Self {
            cpu_secs: whole_secs + 1,
            address_space: settings.memory_limit_mb * MIB,
            file_size: settings.file_size_limit_mb * MIB,
            max_processes: settings.max_processes,
            uid: settings.run_as_uid,
            gid: settings.run_as_gid,
        }
    }

    /// Install the limits on `command`.
    #[cfg(unix)]
    pub fn apply(self, command: &mut Command) {
        // SAFETY: the closure only makes setrlimit/setgid/setuid syscalls,
        // which are async-signal-safe, and allocates nothing.
        unsafe {
            command.pre_exec(move || self.enforce());
        }
    }

    #[cfg(not(unix))]
    pub fn apply(self, _command: &mut Command) {}

    #[cfg(unix)]
    fn enforce(&self) -> std::io::Result<()> {
        use nix::sys::resource::{setrlimit, Resource};
        use nix::unistd::{setgid, setuid, Gid, Uid};

        setrlimit(Resource::RLIMIT_CPU, self.cpu_secs, self.cpu_secs)?;
        if self.address_space > 0 {
            setrlimit(Resource::RLIMIT_AS, self.address_space, self.address_space)?;
        }
        setrlimit(Resource::RLIMIT_FSIZE, self.file_size, self.file_size)?;
        setrlimit(Resource::RLIMIT_CORE, 0, 0)?;
        #[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
        if let Some(max) = self.max_processes {
            setrlimit(Resource::RLIMIT_NPROC, max, max)?;
        }

        // Group first: after setuid we may no longer be allowed to change it.
        if let Some(gid) = self.gid {
            #[cfg(any(target_os = "linux", target_os = "android"))]
            nix::unistd::setgroups(&[Gid::from_raw(gid)])?;
            setgid(Gid::from_raw(gid))?;
        }
        if let Some(uid) = self.uid {
            setuid(Uid::from_raw(uid))?;
        }
        Ok(())
    }
}
