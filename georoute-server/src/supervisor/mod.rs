//! Lifecycle of the local routing service.
//!
//! The router prefers a locally running `osrm-routed`. It asks a
//! [`ServiceLifecycle`] whether that service is up before each route
//! calculation and, if not, asks it to start one. Failing to start is
//! not fatal: the router simply falls back to remote providers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

/// Errors from starting the local routing service.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// The configured executable does not exist
    #[error("routing service executable not found: {}", .0.display())]
    MissingExecutable(PathBuf),

    /// The process could not be spawned
    #[error("failed to start routing service: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Start/liveness control for a routing service.
pub trait ServiceLifecycle: Send + Sync {
    /// Whether the service currently accepts requests.
    fn is_running(&self) -> BoxFuture<'_, bool>;

    /// Start the service unless it is already running. Idempotent.
    fn ensure_running(&self) -> BoxFuture<'_, Result<(), SupervisorError>>;
}

/// A service managed outside this process, or not at all.
///
/// Reports itself as running and never spawns anything; if nothing is
/// listening, requests to it fail and the router falls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmanaged;

impl ServiceLifecycle for Unmanaged {
    fn is_running(&self) -> BoxFuture<'_, bool> {
        Box::pin(async { true })
    }

    fn ensure_running(&self) -> BoxFuture<'_, Result<(), SupervisorError>> {
        Box::pin(async { Ok(()) })
    }
}

/// How to launch and probe the local routing service.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Path (or bare command name) of the executable.
    pub executable: PathBuf,
    /// Command-line arguments.
    pub args: Vec<String>,
    /// Working directory; defaults to the executable's directory.
    pub working_dir: Option<PathBuf>,
    /// Address probed to decide whether the service is up.
    pub probe_addr: SocketAddr,
    /// How long a probe connection may take.
    pub probe_timeout: Duration,
}

impl SupervisorConfig {
    /// Launch `executable` with `args`, probing `probe_addr`.
    pub fn new(executable: impl Into<PathBuf>, args: Vec<String>, probe_addr: SocketAddr) -> Self {
        let executable = executable.into();
        let working_dir = executable
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Self {
            executable,
            args,
            working_dir,
            probe_addr,
            probe_timeout: Duration::from_millis(500),
        }
    }

    /// `osrm-routed` serving `data_file` on 127.0.0.1:7880 with the MLD algorithm.
    pub fn osrm(executable: impl Into<PathBuf>, data_file: impl Into<String>) -> Self {
        let args = vec![
            data_file.into(),
            "-i".to_string(),
            "127.0.0.1".to_string(),
            "-p".to_string(),
            "7880".to_string(),
            "-a".to_string(),
            "MLD".to_string(),
        ];
        Self::new(executable, args, SocketAddr::from(([127, 0, 0, 1], 7880)))
    }

    /// Set the working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

/// Spawns and watches a local routing service process.
///
/// The child is killed when the supervisor is dropped. Its stdout and
/// stderr are forwarded to `tracing` at debug level.
pub struct LocalRoutingService {
    config: SupervisorConfig,
    child: Mutex<Option<Child>>,
}

impl LocalRoutingService {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            child: Mutex::new(None),
        }
    }

    /// Whether something accepts TCP connections on the probe address.
    async fn port_open(&self) -> bool {
        matches!(
            tokio::time::timeout(
                self.config.probe_timeout,
                TcpStream::connect(self.config.probe_addr)
            )
            .await,
            Ok(Ok(_))
        )
    }

    async fn start(&self) -> Result<(), SupervisorError> {
        let mut child = self.child.lock().await;

        if child_alive(&mut child) || self.port_open().await {
            tracing::debug!("local routing service already running");
            return Ok(());
        }

        let exe = &self.config.executable;
        if exe.components().count() > 1 && !exe.exists() {
            return Err(SupervisorError::MissingExecutable(exe.clone()));
        }

        let mut command = Command::new(exe);
        command
            .args(&self.config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        let mut spawned = command.spawn()?;
        tracing::info!(
            executable = %exe.display(),
            pid = spawned.id(),
            "started local routing service"
        );

        if let Some(stdout) = spawned.stdout.take() {
            tokio::spawn(drain(stdout, "stdout"));
        }
        if let Some(stderr) = spawned.stderr.take() {
            tokio::spawn(drain(stderr, "stderr"));
        }

        *child = Some(spawned);
        Ok(())
    }
}

impl ServiceLifecycle for LocalRoutingService {
    fn is_running(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let alive = child_alive(&mut *self.child.lock().await);
            alive || self.port_open().await
        })
    }

    fn ensure_running(&self) -> BoxFuture<'_, Result<(), SupervisorError>> {
        Box::pin(self.start())
    }
}

/// True if `child` holds a process that has not exited. Reaps exited ones.
fn child_alive(child: &mut Option<Child>) -> bool {
    let Some(process) = child.as_mut() else {
        return false;
    };
    match process.try_wait() {
        Ok(None) => true,
        Ok(Some(status)) => {
            tracing::warn!(%status, "local routing service exited");
            *child = None;
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not query local routing service status");
            false
        }
    }
}

/// Forward each output line of the service to the log.
async fn drain(stream: impl AsyncRead + Unpin, stream_name: &'static str) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => tracing::debug!(target: "osrm", stream = stream_name, "{line}"),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(target: "osrm", stream = stream_name, error = %e, "output stream failed");
                break;
            }
        }
    }
}
