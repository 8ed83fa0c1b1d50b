//! Runs the external memvid binary and parses its JSON stdout.
//!
//! Every call spawns exactly one child process:
//! `<binary> <subcommand> <memory path> [args...]`. The binary must exit zero
//! and print a single JSON object. There are no retries; a failed or timed
//! out invocation is reported straight back to the HTTP caller.

use crate::error::ApiError;
use serde_json::{Map, Value};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;

/// Argument vector for a single memvid invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    subcommand: &'static str,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new(subcommand: &'static str, memory: &Path) -> Self {
        Self {
            subcommand,
            args: vec![subcommand.into(), memory.as_os_str().to_owned()],
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Append `flag value` when `value` is present and non-empty.
    pub fn option(mut self, flag: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.args.push(flag.into());
            self.args.push(value.into());
        }
        self
    }

    /// Append a bare `flag` when `enabled`.
    pub fn switch(mut self, flag: &str, enabled: bool) -> Self {
        if enabled {
            self.args.push(flag.into());
        }
        self
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

/// Handle on the external binary, shared by all handlers.
#[derive(Debug, Clone)]
pub struct MemvidCli {
    bin: PathBuf,
    timeout: Duration,
}

impl MemvidCli {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one invocation and return the JSON object printed on stdout.
    pub async fn run(&self, invocation: Invocation) -> Result<Map<String, Value>, ApiError> {
        log::info!("[MEMVID] {}", invocation.subcommand);
        log::debug!("[MEMVID] {} {:?}", self.bin.display(), invocation.args());

        let mut child = Command::new(&self.bin)
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                log::error!("[MEMVID] Failed to spawn {}: {}", self.bin.display(), e);
                ApiError::Io(e)
            })?;

        let output = match timeout(self.timeout, wait_with_output(&mut child)).await {
            Ok(result) => result?,
            Err(_) => {
                // kill() also waits, so the child is reaped before we return
                if let Err(e) = child.kill().await {
                    log::warn!("[MEMVID] Failed to kill timed out process: {}", e);
                }
                log::warn!(
                    "[MEMVID] {} timed out after {}s",
                    invocation.subcommand,
                    self.timeout.as_secs_f64()
                );
                return Err(ApiError::Timeout);
            }
        };

        parse_output(invocation.subcommand, output)
    }
}

async fn wait_with_output(child: &mut Child) -> std::io::Result<Output> {
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let (status, stdout_read, stderr_read) = tokio::join!(
        child.wait(),
        read_pipe(stdout_pipe, &mut stdout),
        read_pipe(stderr_pipe, &mut stderr),
    );
    stdout_read?;
    stderr_read?;

    Ok(Output {
        status: status?,
        stdout,
        stderr,
    })
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>, buf: &mut Vec<u8>) -> std::io::Result<()> {
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(buf).await?;
    }
    Ok(())
}

fn parse_output(subcommand: &str, output: Output) -> Result<Map<String, Value>, ApiError> {
    let stdout = String::from_utf8_lossy(&output.stdout);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        log::warn!(
            "[MEMVID] {} exited with {}: {}",
            subcommand,
            output.status,
            stderr
        );
        let message = if stderr.is_empty() {
            "Command failed".to_string()
        } else {
            stderr.to_string()
        };
        return Err(ApiError::ExecutionFailed(message));
    }

    log::debug!("[MEMVID] {} wrote {} bytes", subcommand, output.stdout.len());

    match serde_json::from_str::<Value>(&stdout) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => {
            log::warn!("[MEMVID] {} produced non-object output", subcommand);
            Err(ApiError::MalformedOutput(stdout.into_owned()))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::write_script;

    fn cli(bin: PathBuf) -> MemvidCli {
        MemvidCli::new(bin, Duration::from_secs(10))
    }

    #[test]
    fn test_invocation_builds_argument_vector() {
        let inv = Invocation::new("put", Path::new("/data/a.mv2"))
            .arg("hello")
            .option("--title", Some("Greeting"))
            .option("--uri", None)
            .option("--empty", Some(""))
            .switch("--deep", false);
        let args: Vec<&OsStr> = inv.args().iter().map(|a| a.as_os_str()).collect();
        assert_eq!(
            args,
            vec!["put", "/data/a.mv2", "hello", "--title", "Greeting"]
        );
    }

    #[tokio::test]
    async fn test_run_parses_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_script(dir.path(), r#"echo "{\"status\": \"ok\", \"cmd\": \"$1\"}""#);

        let result = cli(bin)
            .run(Invocation::new("stats", Path::new("/tmp/x.mv2")))
            .await
            .unwrap();
        assert_eq!(result["status"], "ok");
        assert_eq!(result["cmd"], "stats");
    }

    #[tokio::test]
    async fn test_nonzero_exit_surfaces_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_script(dir.path(), "echo 'corrupt header' >&2; exit 3");

        let err = cli(bin)
            .run(Invocation::new("stats", Path::new("/tmp/x.mv2")))
            .await
            .unwrap_err();
        match err {
            ApiError::ExecutionFailed(msg) => assert_eq!(msg, "corrupt header"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_stderr_is_generic() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_script(dir.path(), "exit 1");

        let err = cli(bin)
            .run(Invocation::new("stats", Path::new("/tmp/x.mv2")))
            .await
            .unwrap_err();
        match err {
            ApiError::ExecutionFailed(msg) => assert_eq!(msg, "Command failed"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_stdout_is_reported_raw() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_script(dir.path(), "echo 'definitely not json'");

        let err = cli(bin)
            .run(Invocation::new("stats", Path::new("/tmp/x.mv2")))
            .await
            .unwrap_err();
        match err {
            ApiError::MalformedOutput(raw) => assert!(raw.contains("definitely not json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_object_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write_script(dir.path(), "echo '[1, 2, 3]'");

        let err = cli(bin)
            .run(Invocation::new("stats", Path::new("/tmp/x.mv2")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = cli(dir.path().join("no-such-binary"))
            .run(Invocation::new("stats", Path::new("/tmp/x.mv2")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timeout_kills_and_reaps_child() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let bin = write_script(
            dir.path(),
            &format!("echo $$ > '{}'; exec sleep 30", pid_file.display()),
        );

        let started = std::time::Instant::now();
        let err = MemvidCli::new(bin, Duration::from_millis(500))
            .run(Invocation::new("search", Path::new("/tmp/x.mv2")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(10));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let proc_entry = PathBuf::from(format!("/proc/{}", pid.trim()));
        assert!(!proc_entry.exists(), "child process was left running");
    }
}
