// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon process lifecycle: start/stop/status against a PID file and a
//! log file under the data directory, no control socket involved — the
//! daemon's only interfaces are the chat log and the filesystem.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const PID_FILE: &str = "overseerd.pid";
const LOG_FILE: &str = "overseerd.log";

pub fn pid_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(PID_FILE)
}

pub fn log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE)
}

/// Locate the `overseerd` binary: an explicit env override, a sibling of
/// the running CLI binary, or bare `overseerd` resolved through `PATH`.
pub fn find_daemon_binary() -> PathBuf {
    if let Ok(path) = std::env::var("OVERSEERD_BIN") {
        return PathBuf::from(path);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("overseerd");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("overseerd")
}

pub fn read_pid(data_dir: &Path) -> Option<u32> {
    std::fs::read_to_string(pid_file_path(data_dir)).ok()?.trim().parse().ok()
}

/// Send signal `0` to check liveness without actually signaling the process.
pub fn process_exists(pid: u32) -> bool {
    kill_signal(pid, "-0")
}

fn kill_signal(pid: u32, signal: &str) -> bool {
    Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Start `overseerd` detached, redirecting its own stdout/stderr into the
/// data directory's log file, and record its PID.
pub fn spawn_background(config_path: &Path, data_dir: &Path) -> std::io::Result<u32> {
    let log = std::fs::OpenOptions::new().create(true).append(true).open(log_file_path(data_dir))?;
    let child = Command::new(find_daemon_binary())
        .arg("--config")
        .arg(config_path)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log.try_clone()?))
        .stderr(Stdio::from(log))
        .spawn()?;
    let pid = child.id();
    std::fs::write(pid_file_path(data_dir), pid.to_string())?;
    // Dropping `child` here doesn't kill it — std::process::Child only
    // closes our handle to the already-redirected stdio, it keeps running.
    Ok(pid)
}

/// Send SIGTERM, poll for exit, escalate to SIGKILL after `grace`.
pub fn stop(data_dir: &Path, grace: Duration) -> StopOutcome {
    let Some(pid) = read_pid(data_dir) else { return StopOutcome::NotRunning };
    if !process_exists(pid) {
        let _ = std::fs::remove_file(pid_file_path(data_dir));
        return StopOutcome::NotRunning;
    }

    kill_signal(pid, "-15");
    let start = Instant::now();
    while start.elapsed() < grace {
        if !process_exists(pid) {
            let _ = std::fs::remove_file(pid_file_path(data_dir));
            return StopOutcome::Stopped;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    kill_signal(pid, "-9");
    let _ = std::fs::remove_file(pid_file_path(data_dir));
    StopOutcome::Killed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    NotRunning,
    Stopped,
    Killed,
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
