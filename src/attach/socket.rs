//! Client side of the HotSpot dynamic attach protocol on Linux.
//!
//! The JVM only opens its attach listener (`.java_pid<pid>` in its temp
//! directory) after it sees an `.attach_pid<pid>` trigger file and receives
//! `SIGQUIT`. Each command is then one connection: a version-1 request of
//! NUL-terminated strings, answered by a status line and free-form output.

use crate::error::{MonitorError, Result};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use procfs::process::Process;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

const PROTOCOL_VERSION: &str = "1";
const ARG_COUNT: usize = 3;
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub const DEFAULT_ATTACH_TIMEOUT: Duration = Duration::from_secs(10);

/// Encode an attach request. Commands always carry exactly three arguments,
/// missing ones are sent empty.
pub fn encode_request(command: &str, args: &[&str]) -> Vec<u8> {
    let mut request = Vec::new();
    for part in [PROTOCOL_VERSION, command]
        .into_iter()
        .chain((0..ARG_COUNT).map(|i| args.get(i).copied().unwrap_or("")))
    {
        request.extend_from_slice(part.as_bytes());
        request.push(0);
    }
    request
}

/// Split a reply into its status code and the remaining output.
pub fn decode_response(reply: &str) -> Result<(i32, &str)> {
    let (status, output) = reply.split_once('\n').unwrap_or((reply, ""));
    let status = status.trim().parse().map_err(|_| {
        MonitorError::Transport(format!("malformed attach reply status {:?}", status))
    })?;
    Ok((status, output))
}

#[derive(Debug, Clone)]
pub struct AttachClient {
    tmp_dir: PathBuf,
    timeout: Duration,
}

impl AttachClient {
    pub fn new(tmp_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            tmp_dir: tmp_dir.into(),
            timeout,
        }
    }

    pub fn socket_path(&self, pid: u32) -> PathBuf {
        self.tmp_dir.join(format!(".java_pid{}", pid))
    }

    /// Run one attach command and return its output, failing on a non-zero
    /// status.
    pub async fn execute(&self, pid: u32, command: &str, args: &[&str]) -> Result<String> {
        let socket = self.ensure_listener(pid).await?;
        let attach_err = |e: std::io::Error| MonitorError::Attach {
            pid,
            message: format!("{}: {}", socket.display(), e),
        };

        let mut stream = UnixStream::connect(&socket).await.map_err(attach_err)?;
        tracing::debug!("Attach {} -> {} {:?}", pid, command, args);
        stream
            .write_all(&encode_request(command, args))
            .await
            .map_err(attach_err)?;

        let mut reply = String::new();
        stream
            .read_to_string(&mut reply)
            .await
            .map_err(attach_err)?;

        let (status, output) = decode_response(&reply)?;
        if status != 0 {
            return Err(MonitorError::Attach {
                pid,
                message: format!("{} failed with status {}: {}", command, status, output.trim()),
            });
        }
        Ok(output.to_string())
    }

    /// Make sure the attach listener of `pid` is up, starting it if needed.
    async fn ensure_listener(&self, pid: u32) -> Result<PathBuf> {
        let socket = self.socket_path(pid);
        if socket.exists() {
            return Ok(socket);
        }

        let trigger = self.create_trigger_file(pid)?;
        let started = self.start_listener(pid, &socket).await;
        if let Err(e) = std::fs::remove_file(&trigger) {
            tracing::debug!("Cannot remove {}: {}", trigger.display(), e);
        }
        started.map(|()| socket)
    }

    async fn start_listener(&self, pid: u32, socket: &Path) -> Result<()> {
        tracing::debug!("Starting attach listener of {}", pid);
        kill(Pid::from_raw(pid as i32), Signal::SIGQUIT).map_err(|e| MonitorError::Attach {
            pid,
            message: format!("cannot signal process: {}", e),
        })?;

        let deadline = tokio::time::Instant::now() + self.timeout;
        while tokio::time::Instant::now() < deadline {
            tokio::time::sleep(POLL_INTERVAL).await;
            if socket.exists() {
                return Ok(());
            }
        }

        Err(MonitorError::Attach {
            pid,
            message: format!(
                "attach listener did not start within {:?} ({} missing)",
                self.timeout,
                socket.display()
            ),
        })
    }

    /// The JVM looks for the trigger file in its working directory first,
    /// then in its temp directory.
    fn create_trigger_file(&self, pid: u32) -> Result<PathBuf> {
        let name = format!(".attach_pid{}", pid);
        let cwd = Process::new(pid as i32).and_then(|p| p.cwd()).ok();

        let mut last_err = None;
        for dir in cwd.iter().chain(std::iter::once(&self.tmp_dir)) {
            let path = dir.join(&name);
            match std::fs::File::create(&path) {
                Ok(_) => return Ok(path),
                Err(e) => {
                    tracing::debug!("Cannot create {}: {}", path.display(), e);
                    last_err = Some(e);
                }
            }
        }

        Err(MonitorError::Attach {
            pid,
            message: format!(
                "cannot create attach trigger file: {}",
                last_err.map(|e| e.to_string()).unwrap_or_default()
            ),
        })
    }
}
