//! Shell tool — run one command in the workspace.
//!
//! Stdout and stderr are read line by line as they arrive; every line is
//! forwarded to the event bus as a delta and also collected for the result.

use pico_core::error::ToolError;
use pico_core::event::{Event, EventBus};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

const TOOL: &str = "bash";

/// Run `command` through the system shell with `workspace` as cwd.
///
/// A non-zero exit is not an error: it is reported as
/// `bash failed (<code>)\n<stderr>`. A process killed by a signal reports
/// code `-1`.
pub async fn run_bash(workspace: &Path, command: &str, bus: &EventBus) -> Result<String, ToolError> {
    debug!(command = %command, cwd = %workspace.display(), "Executing shell command");
    bus.emit(&Event::tool_start(TOOL, command));

    let (stdout, stderr, code) = match execute(workspace, command, bus).await {
        Ok(done) => done,
        Err(e) => {
            bus.emit(&Event::tool_end(TOOL, -1));
            return Err(e);
        }
    };
    bus.emit(&Event::tool_end(TOOL, code));

    if code != 0 {
        warn!(command = %command, exit_code = code, "Command failed");
        return Ok(format!("bash failed ({code})\n{}", stderr.trim()));
    }

    let stdout = stdout.trim();
    if stdout.is_empty() {
        Ok("(no output)".into())
    } else {
        Ok(stdout.to_string())
    }
}

fn shell(command: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

async fn execute(
    workspace: &Path,
    command: &str,
    bus: &EventBus,
) -> Result<(String, String, i32), ToolError> {
    let spawn_err = |reason: String| ToolError::Spawn {
        command: command.into(),
        reason,
    };

    let mut child = shell(command)
        .current_dir(workspace)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_err(e.to_string()))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| spawn_err("stdout not captured".into()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| spawn_err("stderr not captured".into()))?;

    let mut out_lines = BufReader::new(stdout).split(b'\n');
    let mut err_lines = BufReader::new(stderr).split(b'\n');
    let mut out = String::new();
    let mut err = String::new();
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            segment = out_lines.next_segment(), if out_open => {
                match take_line(segment) {
                    Some(line) => {
                        bus.emit(&Event::tool_stdout_delta(&line));
                        out.push_str(&line);
                        out.push('\n');
                    }
                    None => out_open = false,
                }
            }
            segment = err_lines.next_segment(), if err_open => {
                match take_line(segment) {
                    Some(line) => {
                        bus.emit(&Event::tool_stderr_delta(&line));
                        err.push_str(&line);
                        err.push('\n');
                    }
                    None => err_open = false,
                }
            }
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| spawn_err(e.to_string()))?;

    Ok((out, err, status.code().unwrap_or(-1)))
}

/// Decode one pipe segment; `None` once the pipe is closed or broken.
fn take_line(segment: std::io::Result<Option<Vec<u8>>>) -> Option<String> {
    match segment {
        Ok(Some(mut bytes)) => {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Failed reading command output");
            None
        }
    }
}
