//! Phase orchestration against a container runtime
//!
//! - `runtime`: the `ContainerRuntime` capability
//! - `docker`: Docker-CLI-compatible implementation (docker, podman)
//! - `phase`: the fixed per-phase mount and argument contract
//! - `runner`: runs one phase and turns failures into `PackError::Phase`

mod container;
mod docker;
mod phase;
mod runner;
mod runtime;

pub use container::{ContainerConfig, MountMode, OutputMode, RunOutcome, VolumeBinding};
pub use docker::CliRuntime;
pub use phase::{Phase, PhaseContext, PhaseInvocation};
pub use runner::PhaseRunner;
pub use runtime::ContainerRuntime;

use crate::error::{PackError, PackResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

/// Max number of output lines to include in phase error messages.
const ERROR_TAIL_LINES: usize = 50;

/// Which stream a line of container output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

/// Keep the last `ERROR_TAIL_LINES` lines of output for error diagnostics.
pub(crate) fn error_tail(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let total = lines.len();
    if total > ERROR_TAIL_LINES {
        lines[total - ERROR_TAIL_LINES..].join("\n")
    } else {
        lines.join("\n")
    }
}

/// Read stdout+stderr of a child line by line, calling `on_output` for each.
///
/// Lines are returned in arrival order so captured output interleaves the
/// two streams the way the phase wrote them. Invalid UTF-8 is replaced, never
/// fatal: both pipes are drained to EOF so the child cannot block on a full
/// pipe.
pub(crate) async fn stream_child_output(
    child: &mut tokio::process::Child,
    on_output: &(dyn Fn(OutputSource, &str) + Send + Sync),
) -> PackResult<Vec<String>> {
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| PackError::Internal("child stderr not piped".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| PackError::Internal("child stdout not piped".to_string()))?;

    let mut stderr_reader = BufReader::new(stderr);
    let mut stdout_reader = BufReader::new(stdout);
    let mut stderr_buf = Vec::new();
    let mut stdout_buf = Vec::new();

    let mut all_output = Vec::new();
    let mut stderr_done = false;
    let mut stdout_done = false;

    while !stderr_done || !stdout_done {
        tokio::select! {
            line = next_line(&mut stderr_reader, &mut stderr_buf), if !stderr_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(OutputSource::Stderr, &line);
                        all_output.push(line);
                    }
                    Ok(None) => stderr_done = true,
                    Err(e) => {
                        warn!("Reading container stderr failed: {}", e);
                        stderr_done = true;
                    }
                }
            }
            line = next_line(&mut stdout_reader, &mut stdout_buf), if !stdout_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(OutputSource::Stdout, &line);
                        all_output.push(line);
                    }
                    Ok(None) => stdout_done = true,
                    Err(e) => {
                        warn!("Reading container stdout failed: {}", e);
                        stdout_done = true;
                    }
                }
            }
        }
    }

    Ok(all_output)
}

/// Next line from `reader`, lossily decoded, or `None` at EOF.
///
/// Bytes of an interrupted read stay in `buf` and are completed by the next
/// call, so this is safe to race in `select!`.
async fn next_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 && buf.is_empty() {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    let line = String::from_utf8_lossy(buf).into_owned();
    buf.clear();
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn next_line_replaces_invalid_utf8() {
        let input: &[u8] = b"bad \xff byte\r\nnext\nlast";
        let mut reader = BufReader::new(input);
        let mut buf = Vec::new();

        assert_eq!(
            next_line(&mut reader, &mut buf).await.unwrap().as_deref(),
            Some("bad \u{FFFD} byte")
        );
        assert_eq!(
            next_line(&mut reader, &mut buf).await.unwrap().as_deref(),
            Some("next")
        );
        assert_eq!(
            next_line(&mut reader, &mut buf).await.unwrap().as_deref(),
            Some("last")
        );
        assert_eq!(next_line(&mut reader, &mut buf).await.unwrap(), None);
    }

    #[test]
    fn error_tail_keeps_short_output() {
        assert_eq!(error_tail("a\nb"), "a\nb");
        assert_eq!(error_tail(""), "");
    }

    #[test]
    fn error_tail_truncates_to_last_lines() {
        let output: Vec<String> = (0..120).map(|i| format!("line {}", i)).collect();
        let tail = error_tail(&output.join("\n"));
        let lines: Vec<&str> = tail.lines().collect();
        assert_eq!(lines.len(), ERROR_TAIL_LINES);
        assert_eq!(lines[0], "line 70");
        assert_eq!(lines[ERROR_TAIL_LINES - 1], "line 119");
    }
}
