// PowBench - Free and Open Source Software Statement
//
// This project, powbench, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/process.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Helpers for locating executables on PATH and running setup commands
// (package managers, git, cmake) with their output streamed to the console.

use anyhow::{Context, Result, bail};
use log::info;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;

const LOG_TARGET: &str = "powbench::process";

/// Find an executable on PATH, honouring the `.exe` suffix on Windows
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| executable_in(&dir, name))
}

fn executable_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidate = dir.join(name);
    if candidate.is_file() {
        return Some(candidate);
    }
    if cfg!(windows) && Path::new(name).extension().is_none() {
        let exe = dir.join(format!("{}.exe", name));
        if exe.is_file() {
            return Some(exe);
        }
    }
    None
}

/// Run a setup command to completion; non-zero exit is an error
pub async fn run_command<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
    info!(target: LOG_TARGET, "▶️ {} {}", program, args.join(" "));

    let mut command = Command::new(program);
    command.args(&args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let status = command
        .status()
        .await
        .with_context(|| format!("failed to start {}", program))?;

    if !status.success() {
        bail!("{} {} failed: {}", program, args.join(" "), describe_status(status));
    }
    Ok(())
}

/// Exit code of a finished process; signals map to 128 + signal on Unix
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

fn describe_status(status: ExitStatus) -> String {
    format!("exit code {}", exit_code(status))
}

/// Whether the current process runs as root / elevated
pub fn is_privileged() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(windows)]
    {
        // `net session` only succeeds from an elevated prompt
        std::process::Command::new("net")
            .arg("session")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Process helpers.
//   - PATH lookup, setup command runner, exit code mapping, privilege check.
