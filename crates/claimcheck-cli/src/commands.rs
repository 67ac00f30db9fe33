//! Command handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use claimcheck_core::domain::{ClientError, UploadFile};
use claimcheck_core::impls::{FileStorage, HttpBackend};
use claimcheck_core::ports::SystemClock;
use claimcheck_core::render::text;
use claimcheck_core::{ClientConfig, Exporter, LocalTaskId, ReportFormat, Session, TaskRecord, TaskStore};

use crate::cli::Command;

pub struct App {
    config: ClientConfig,
    session: Session,
    exporter: Exporter,
}

impl App {
    pub fn open(config: ClientConfig) -> Result<Self> {
        let backend = HttpBackend::new(&config.api_url, config.http_timeout)
            .with_context(|| format!("invalid API url {}", config.api_url))?;
        let storage = FileStorage::open(&config.state_dir)
            .with_context(|| format!("cannot open state directory {}", config.state_dir.display()))?;
        let store = TaskStore::open(Arc::new(storage)).context("cannot load saved tasks")?;

        let session = Session::builder(Arc::new(backend))
            .store(store)
            .poll_interval(config.poll_interval)
            .build();
        info!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "client ready");
        Ok(Self::with_session(config, session))
    }

    pub fn with_session(config: ClientConfig, session: Session) -> Self {
        let exporter = Exporter::new(&config.report_dir, Arc::new(SystemClock));
        Self {
            config,
            session,
            exporter,
        }
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Upload { files } => self.upload(&files).await,
            Command::List => self.list().await,
            Command::Show { id, json } => self.show(id.as_deref(), json).await,
            Command::Select { id } => self.select(&id).await,
            Command::Retry { id } => self.retry(&id).await,
            Command::Delete { id } => self.delete(&id).await,
            Command::Clear => self.clear().await,
            Command::Export { id, all, format } => self.export(id.as_deref(), all, format).await,
            Command::Preview { id, out } => self.preview(&id, out).await,
            Command::Health => self.health().await,
        }
    }

    /// Every file is read before the first one is sent, so a bad path fails
    /// the command without leaving half of the batch on the server.
    async fn upload(&self, paths: &[PathBuf]) -> Result<()> {
        let mut files = Vec::new();
        for path in paths {
            match UploadFile::read(path).await {
                Ok(file) => files.push((path, file)),
                Err(e @ ClientError::UnsupportedFileType { .. }) => {
                    eprintln!("skipping {}: {e}", path.display());
                }
                Err(e) => return Err(e).context("nothing was uploaded"),
            }
        }
        if files.is_empty() {
            bail!("nothing was uploaded");
        }

        let mut ids = Vec::new();
        let mut failure = None;
        for (path, file) in files {
            match self.session.upload(file).await {
                Ok(outcome) => {
                    println!("{}  {}", outcome.id, path.display());
                    ids.push(outcome.id);
                }
                Err(e) => {
                    failure = Some(anyhow::Error::new(e).context(format!("cannot upload {}", path.display())));
                    break;
                }
            }
        }

        // Accepted tasks are only saved once they reach a terminal state.
        self.session.wait_idle().await;
        if !ids.is_empty() {
            println!();
        }
        for id in ids {
            if let Some(record) = self.session.task(id).await {
                println!("{}", text::summary_line(&record));
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn list(&self) -> Result<()> {
        let tasks = self.session.tasks().await;
        let selected = self.session.selected().await;
        let counts = self.session.counts().await;
        print!("{}", text::task_list(&tasks, selected.as_ref(), &counts));
        Ok(())
    }

    async fn show(&self, id: Option<&str>, json: bool) -> Result<()> {
        let record = self.record_or_selected(id).await?;
        if json {
            let result = record
                .result
                .as_ref()
                .ok_or(ClientError::NoResult(record.id))?;
            println!("{}", serde_json::to_string_pretty(result.raw())?);
        } else {
            print!("{}", text::task_details(&record));
        }
        Ok(())
    }

    async fn select(&self, query: &str) -> Result<()> {
        let id = self.resolve(query).await?;
        self.session.select(id).await?;
        println!("selected {id}");
        Ok(())
    }

    async fn retry(&self, query: &str) -> Result<()> {
        let id = self.resolve(query).await?;
        let outcome = self.session.retry(id).await;
        // A refused retry is recorded on the task; show it before failing.
        self.session.wait_idle().await;
        if let Some(record) = self.session.task(id).await {
            println!("{}", text::summary_line(&record));
        }
        outcome.with_context(|| format!("retry of {id} failed"))
    }

    async fn delete(&self, query: &str) -> Result<()> {
        let id = self.resolve(query).await?;
        let removed = self.session.delete(id).await?;
        println!("deleted {} ({})", removed.id, removed.name);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let removed = self.session.clear().await;
        println!("removed {removed} tasks");
        Ok(())
    }

    async fn export(&self, id: Option<&str>, all: bool, format: ReportFormat) -> Result<()> {
        if all {
            let tasks = self.session.tasks().await;
            match self.exporter.export_all(&tasks, format).await? {
                Some(path) => println!("{}", path.display()),
                None => println!("No completed tasks to export."),
            }
            return Ok(());
        }
        let record = self.record_or_selected(id).await?;
        let path = self
            .exporter
            .export_task(&record, format)
            .await
            .with_context(|| format!("cannot export {}", record.name))?;
        println!("{}", path.display());
        Ok(())
    }

    async fn preview(&self, query: &str, out: Option<PathBuf>) -> Result<()> {
        let id = self.resolve(query).await?;
        let record = self.task(id).await?;
        let bytes = match self.session.preview(id).await {
            Ok(bytes) => bytes,
            Err(ClientError::FileUnavailable) => {
                warn!(task = %id, "original file missing on server");
                bail!("{}", ClientError::FileUnavailable);
            }
            Err(e) => return Err(e).context("cannot fetch original file"),
        };
        let path = out.unwrap_or_else(|| preview_path(&self.config.report_dir, &record));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("cannot write {}", path.display()))?;
        println!("{} ({} bytes, {})", path.display(), bytes.len(), record.mime_type);
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        let health = self
            .session
            .health()
            .await
            .with_context(|| format!("{} is not reachable", self.config.api_url))?;
        println!("{}: {}", self.config.api_url, health.status);
        if let Some(count) = health.tasks_count {
            println!("tasks on server: {count}");
        }
        for (status, count) in &health.tasks_by_status {
            println!("  {status:<12} {count}");
        }
        Ok(())
    }

    async fn resolve(&self, query: &str) -> Result<LocalTaskId> {
        Ok(self.session.resolve(query).await?)
    }

    async fn task(&self, id: LocalTaskId) -> Result<TaskRecord> {
        self.session
            .task(id)
            .await
            .ok_or_else(|| ClientError::TaskNotFound(id.to_string()).into())
    }

    async fn record_or_selected(&self, query: Option<&str>) -> Result<TaskRecord> {
        match query {
            Some(query) => {
                let id = self.resolve(query).await?;
                self.task(id).await
            }
            None => match self.session.selected().await {
                Some(record) => Ok(record),
                None => bail!("no task selected; pass a task id"),
            },
        }
    }
}

/// Original name inside `dir`, prefixed with the short id to avoid clobbering.
fn preview_path(dir: &Path, record: &TaskRecord) -> PathBuf {
    let name = Path::new(&record.name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let id = record.id.to_string();
    let short: String = id.chars().skip("local-".len()).take(8).collect();
    dir.join(format!("{}_{name}", short.to_lowercase()))
}
