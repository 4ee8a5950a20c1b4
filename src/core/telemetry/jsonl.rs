//! JSON lines file sink

use super::{TaskOutcome, TelemetrySink};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum Command {
    Write(Box<TaskOutcome>),
    Flush(oneshot::Sender<()>),
}

/// Appends one JSON object per outcome from a background task
#[derive(Debug, Clone)]
pub struct JsonlTelemetrySink {
    sender: mpsc::UnboundedSender<Command>,
    path: PathBuf,
}

impl JsonlTelemetrySink {
    /// Spawn the writer task; must be called inside a tokio runtime
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(path.clone(), receiver));
        Self { sender, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait until every outcome recorded so far is on disk
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(Command::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

impl TelemetrySink for JsonlTelemetrySink {
    fn record(&self, outcome: TaskOutcome) {
        if self.sender.send(Command::Write(Box::new(outcome))).is_err() {
            warn!(path = %self.path.display(), "Telemetry writer stopped; dropping outcome");
        }
    }
}

async fn run_writer(path: PathBuf, mut receiver: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Write(outcome) => {
                if let Err(e) = append_line(&path, &outcome).await {
                    warn!(path = %path.display(), error = %e, "Failed to persist ai_task telemetry");
                }
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!(path = %path.display(), "Telemetry writer finished");
}

async fn append_line(path: &Path, outcome: &TaskOutcome) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut line = serde_json::to_string(&with_timestamp(outcome)?)?;
    line.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

fn with_timestamp(outcome: &TaskOutcome) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(outcome)?;
    if let Value::Object(map) = &mut value {
        map.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
    }
    Ok(value)
}
