//! Runs `serve` as a child process and watches it.
//!
//! The child is ready as soon as either its stdout carries the listening
//! marker or an HTTP GET against its URL succeeds. Every output line is
//! mirrored into `server.log` next to the shell's own logs.

use anyhow::{anyhow, bail, Context, Result};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::instance_lock::InstanceLock;
use super::opener::try_open_browser;
use crate::presentation::{shutdown_signal, READY_MARKER};
use loginport_infrastructure::config::AppConfig;

pub const SERVER_LOG_FILE: &str = "server.log";

const STDERR_TAIL_LINES: usize = 20;
const READER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Append-only mirror of the child's output.
#[derive(Debug, Clone)]
pub struct ServerLog {
    file: Arc<Mutex<File>>,
}

impl ServerLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log dir {}", dir.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn append(&self, stream: &str, line: &str) {
        self.write_line(&format!("[{}] {}", stream, line));
    }

    pub fn record_exit(&self, code: Option<i32>) {
        match code {
            Some(code) => self.write_line(&format!("[EXIT {}]", code)),
            None => self.write_line("[EXIT signal]"),
        }
    }

    fn write_line(&self, entry: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
        if let Ok(mut file) = self.file.lock() {
            if let Err(e) = writeln!(file, "{} {}", timestamp, entry) {
                warn!("Failed to write server log: {}", e);
            }
        }
    }
}

/// HTTP fallback for readiness detection.
#[derive(Debug, Clone)]
pub struct ReadinessCheck {
    http: reqwest::Client,
    url: String,
    interval: Duration,
    attempts: u32,
}

impl ReadinessCheck {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .context("Failed to build readiness check client")?;
        Ok(Self {
            http,
            url: url.into(),
            interval: Duration::from_millis(500),
            attempts: 60,
        })
    }

    pub fn with_schedule(mut self, interval: Duration, attempts: u32) -> Self {
        self.interval = interval;
        self.attempts = attempts;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True once a GET succeeds, false when the attempts run out.
    pub async fn wait(&self) -> bool {
        for attempt in 1..=self.attempts {
            tokio::time::sleep(self.interval).await;
            match self.http.get(&self.url).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Readiness check succeeded on attempt {}", attempt);
                    return true;
                }
                Ok(response) => debug!("Readiness check {}: HTTP {}", attempt, response.status()),
                Err(e) => debug!("Readiness check {}: {}", attempt, e),
            }
        }
        false
    }
}

pub struct ServerProcess {
    child: Child,
    log: ServerLog,
    readiness: ReadinessCheck,
    marker_seen: oneshot::Receiver<()>,
    stdout_task: JoinHandle<()>,
    stderr_task: JoinHandle<VecDeque<String>>,
}

impl ServerProcess {
    pub fn spawn(mut command: Command, log: ServerLog, readiness: ReadinessCheck) -> Result<Self> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().context("Failed to start server process")?;
        info!("🚀 Server process started (pid {:?})", child.id());

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("Server stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("Server stderr was not captured"))?;

        let (marker_tx, marker_seen) = oneshot::channel();
        let stdout_task = tokio::spawn(forward_stdout(stdout, log.clone(), marker_tx));
        let stderr_task = tokio::spawn(forward_stderr(stderr, log.clone()));

        Ok(Self {
            child,
            log,
            readiness,
            marker_seen,
            stdout_task,
            stderr_task,
        })
    }

    /// Resolves when the server is reachable; fails if it exits first.
    pub async fn wait_ready(&mut self) -> Result<()> {
        tokio::select! {
            biased;
            status = self.child.wait() => {
                let status = status.context("Failed to wait for server process")?;
                self.log.record_exit(status.code());
                let tail = self.join_readers().await;
                Err(early_exit_error(status.code(), &tail))
            }
            Ok(()) = &mut self.marker_seen => {
                info!("Server reported readiness");
                Ok(())
            }
            ready = self.readiness.wait() => {
                if ready {
                    info!("Server answered at {}", self.readiness.url());
                    Ok(())
                } else {
                    bail!("Server did not become ready at {}", self.readiness.url())
                }
            }
        }
    }

    /// Wait for the child to exit on its own.
    pub async fn wait(&mut self) -> Result<Option<i32>> {
        let status = self
            .child
            .wait()
            .await
            .context("Failed to wait for server process")?;
        self.log.record_exit(status.code());
        Ok(status.code())
    }

    /// Kill the child and reap it.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill server process: {}", e);
        }
        let status = self
            .child
            .wait()
            .await
            .context("Failed to reap server process")?;
        self.log.record_exit(status.code());
        info!("Server process stopped");
        Ok(())
    }

    async fn join_readers(&mut self) -> VecDeque<String> {
        let _ = tokio::time::timeout(READER_JOIN_TIMEOUT, &mut self.stdout_task).await;
        match tokio::time::timeout(READER_JOIN_TIMEOUT, &mut self.stderr_task).await {
            Ok(Ok(tail)) => tail,
            _ => VecDeque::new(),
        }
    }
}

async fn forward_stdout<R>(stream: R, log: ServerLog, marker_tx: oneshot::Sender<()>)
where
    R: AsyncRead + Unpin,
{
    let mut marker_tx = Some(marker_tx);
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        log.append("STDOUT", &line);
        info!(target: "loginport::server", "{}", line);
        if line.contains(READY_MARKER) {
            if let Some(tx) = marker_tx.take() {
                let _ = tx.send(());
            }
        }
    }
}

async fn forward_stderr<R>(stream: R, log: ServerLog) -> VecDeque<String>
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        log.append("STDERR", &line);
        warn!(target: "loginport::server", "{}", line);
        if line.trim().is_empty() {
            continue;
        }
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    tail
}

fn early_exit_error(code: Option<i32>, tail: &VecDeque<String>) -> anyhow::Error {
    let exit = code.map_or_else(|| "a signal".to_string(), |c| format!("code {}", c));
    if tail.is_empty() {
        return anyhow!("Server exited with {} before becoming ready", exit);
    }
    let detail: Vec<&str> = tail.iter().map(String::as_str).collect();
    anyhow!(
        "Server exited with {} before becoming ready:\n{}",
        exit,
        detail.join("\n")
    )
}

#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    /// Binary that implements the `serve` subcommand
    pub exe: PathBuf,
    pub config_path: PathBuf,
    pub sheet_title: Option<String>,
    pub port: Option<u16>,
    pub log_dir: PathBuf,
    pub open_ui: bool,
}

/// `run` subcommand: lock, spawn, wait for readiness, open the UI, supervise.
pub async fn run(options: SupervisorOptions) -> Result<()> {
    let _lock = InstanceLock::acquire()?;

    let config = AppConfig::load_or_create(&options.config_path)?;
    let port = options.port.unwrap_or(config.port);
    let url = format!("http://127.0.0.1:{}", port);

    let mut command = Command::new(&options.exe);
    command
        .arg("serve")
        .arg("--config")
        .arg(&options.config_path)
        .arg("--port")
        .arg(port.to_string());
    if let Some(title) = options.sheet_title.as_deref() {
        command.arg("--sheet-title").arg(title);
    }

    let log = ServerLog::open(&options.log_dir.join(SERVER_LOG_FILE))?;
    let readiness = ReadinessCheck::new(url.clone())?;
    let mut server = ServerProcess::spawn(command, log, readiness)?;

    let interrupted = tokio::select! {
        ready = server.wait_ready() => {
            ready?;
            false
        }
        _ = shutdown_signal() => true,
    };
    if interrupted {
        return server.shutdown().await;
    }

    info!("✅ LoginPort ready at {}", url);
    if options.open_ui && !try_open_browser(&url) {
        warn!("Could not open a browser; visit {} manually", url);
    }

    let exited = tokio::select! {
        code = server.wait() => Some(code?),
        _ = shutdown_signal() => None,
    };
    match exited {
        None => server.shutdown().await,
        Some(Some(0)) => Ok(()),
        Some(code) => {
            error!("Server exited unexpectedly ({:?})", code);
            bail!("Server exited unexpectedly ({:?})", code)
        }
    }
}
