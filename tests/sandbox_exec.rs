// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Sandbox tests against a real interpreter.
//!
//! Skipped when `python3` is not on PATH.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use snipd::config::SandboxSettings;
use snipd::sandbox::{ExecutionSandbox, SubprocessSandbox, TRUNCATION_MARKER};
use snipd::types::SENTINEL_EXIT_CODE;

fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn sandbox() -> SubprocessSandbox {
    SubprocessSandbox::new(SandboxSettings::default())
}

macro_rules! require_python {
    () => {
        if !python_available() {
            eprintln!("python3 not available, skipping");
            return;
        }
    };
}

#[tokio::test]
async fn test_print_to_stdout() {
    require_python!();
    let result = sandbox()
        .execute("print('hi')", Duration::from_secs(10), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.stdout, "hi\n");
    assert_eq!(result.stderr, "");
    assert_eq!(result.exit_code, 0);
    assert!(!result.timed_out);
    assert!(!result.truncated);
    assert!(result.succeeded());
}

#[tokio::test]
async fn test_exception_goes_to_stderr() {
    require_python!();
    let result = sandbox()
        .execute("raise ValueError('bad input')", Duration::from_secs(10), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.contains("ValueError: bad input"));
    assert!(result.stdout.is_empty());
}

#[tokio::test]
async fn test_explicit_exit_status() {
    require_python!();
    let result = sandbox()
        .execute("import sys\nsys.exit(3)", Duration::from_secs(10), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.exit_code, 3);
    assert!(!result.succeeded());
}

#[tokio::test]
async fn test_stdin_is_closed() {
    require_python!();
    let result = sandbox()
        .execute("input()", Duration::from_secs(10), CancellationToken::new())
        .await
        .unwrap();
    assert_ne!(result.exit_code, 0);
    assert!(result.stderr.contains("EOFError"));
}

#[tokio::test]
async fn test_infinite_loop_times_out() {
    require_python!();
    let started = Instant::now();
    let result = sandbox()
        .execute("while True:\n    pass", Duration::from_millis(500), CancellationToken::new())
        .await
        .unwrap();

    assert!(result.timed_out);
    assert_eq!(result.exit_code, SENTINEL_EXIT_CODE);
    assert!(started.elapsed() < Duration::from_secs(5));
}

/// State letter from `/proc/<pid>/stat`, or `None` once the pid is gone.
#[cfg(target_os = "linux")]
fn process_state(pid: u32) -> Option<char> {
    let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    let after_name = &stat[stat.rfind(')')? + 1..];
    after_name.trim_start().chars().next()
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_timeout_kills_spawned_children() {
    require_python!();
    let code = "import subprocess\nchild = subprocess.Popen(['sleep', '60'])\nprint(child.pid, flush=True)\nwhile True:\n    pass";
    let result = sandbox()
        .execute(code, Duration::from_millis(1000), CancellationToken::new())
        .await
        .unwrap();
    assert!(result.timed_out);
    assert_eq!(result.exit_code, SENTINEL_EXIT_CODE);

    let pid: u32 = result.stdout.trim().parse().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    match process_state(pid) {
        None | Some('Z') | Some('X') => {}
        Some(state) => panic!("sleep {pid} still running (state {state})"),
    }
}

#[tokio::test]
async fn test_server_environment_is_not_inherited() {
    require_python!();
    std::env::set_var("SNIPD_TEST_SECRET", "hunter2");
    let code = "import os\nprint(os.environ.get('SNIPD_TEST_SECRET'))\nprint(sorted(k for k in os.environ if k.startswith('AWS_')))";
    let result = sandbox()
        .execute(code, Duration::from_secs(10), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    assert_eq!(result.stdout, "None\n[]\n");
}

#[tokio::test]
async fn test_output_before_timeout_is_kept() {
    require_python!();
    let code = "import time\nprint('started', flush=True)\ntime.sleep(30)";
    let result = sandbox()
        .execute(code, Duration::from_millis(800), CancellationToken::new())
        .await
        .unwrap();

    assert!(result.timed_out);
    assert_eq!(result.stdout, "started\n");
}

#[tokio::test]
async fn test_output_is_truncated() {
    require_python!();
    let settings = SandboxSettings {
        output_limit_bytes: 1024,
        ..SandboxSettings::default()
    };
    let result = SubprocessSandbox::new(settings)
        .execute("print('x' * 100000)", Duration::from_secs(10), CancellationToken::new())
        .await
        .unwrap();

    assert!(result.truncated);
    assert_eq!(result.exit_code, 0);
    assert!(result.stdout.ends_with(TRUNCATION_MARKER));
    assert!(result.stdout.len() < 1024 + 64);
}

#[tokio::test]
async fn test_cancel_kills_run() {
    require_python!();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = sandbox()
        .execute("import time\ntime.sleep(30)", Duration::from_secs(20), cancel)
        .await
        .unwrap();

    assert!(!result.timed_out);
    assert_eq!(result.exit_code, SENTINEL_EXIT_CODE);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_runs_are_isolated() {
    require_python!();
    let first = sandbox()
        .execute("open('state.txt', 'w').write('1')\nprint('wrote')", Duration::from_secs(10), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first.stdout, "wrote\n");

    let second = sandbox()
        .execute("import os\nprint(os.path.exists('state.txt'))", Duration::from_secs(10), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(second.stdout, "False\n");
}

#[tokio::test]
async fn test_concurrent_runs() {
    require_python!();
    let mut handles = Vec::new();
    for n in 0..4 {
        handles.push(tokio::spawn(async move {
            sandbox()
                .execute(&format!("print({n} * 2)"), Duration::from_secs(10), CancellationToken::new())
                .await
        }));
    }

    for (n, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.stdout, format!("{}\n", n * 2));
        assert_eq!(result.exit_code, 0);
    }
}
