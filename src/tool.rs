use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Result of one external tool run. Tool-level failures (non-zero exit,
/// missing binary, missing output file) all land in `Failed` so the caller
/// has a single place to decide between warn-and-continue and fail-fast.
#[derive(Debug)]
pub enum RenderOutcome {
    Success {
        path: PathBuf,
    },
    Failed {
        /// `None` when the tool binary could not be found or the process was
        /// killed before exiting.
        exit_code: Option<i32>,
        stderr: String,
    },
}

/// Unexpected I/O while driving the child process, as opposed to the tool
/// itself failing.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to feed diagram source to `{command}`: {source}")]
    Stdin {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to collect output of `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// The external diagram-to-PNG compiler, treated as an opaque black box.
/// Invoked as `<command> -o <output_name>` with the diagram source on stdin,
/// blocking until the process exits.
#[derive(Debug, Clone)]
pub struct DiagramTool {
    command: String,
}

impl DiagramTool {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn render(
        &self,
        source: &str,
        working_dir: &Path,
        output_name: &str,
    ) -> Result<RenderOutcome, ToolError> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        debug!("Invoking diagram tool: {} -o {}", self.command, output_name);
        let spawned = Command::new(program)
            .args(&args)
            .arg("-o")
            .arg(output_name)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(RenderOutcome::Failed {
                    exit_code: None,
                    stderr: format!("{}: command not found", program),
                })
            }
            Err(e) => {
                return Err(ToolError::Spawn {
                    command: self.command.clone(),
                    source: e,
                })
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            // A tool that exits without draining stdin closes the pipe early;
            // that shows up in the exit status collected below.
            if let Err(e) = stdin.write_all(source.as_bytes()) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(ToolError::Stdin {
                        command: self.command.clone(),
                        source: e,
                    });
                }
            }
        }

        let output = child.wait_with_output().map_err(|e| ToolError::Wait {
            command: self.command.clone(),
            source: e,
        })?;

        let path = working_dir.join(output_name);
        if output.status.success() && path.exists() {
            return Ok(RenderOutcome::Success { path });
        }

        let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if output.status.success() {
            stderr = format!("output file {} was not created", output_name);
        }
        Ok(RenderOutcome::Failed {
            exit_code: output.status.code(),
            stderr,
        })
    }
}
