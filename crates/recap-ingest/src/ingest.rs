use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use recap_core::{
    status_from_counts, HostId, Play, PlayId, ReportId, ReportMeta, TaskId, TaskRecord,
    TaskSummary,
};
use recap_parser::ParseReport;
use recap_store::{NewHost, NewPlay, NewReport, Storage};
use recap_store_sqlite::SqliteStorage;

use crate::{content_hash, now_unix, Config};

/// Imperative shell around parse -> derive -> persist.
pub struct Ingestor<S: Storage> {
    pub root: PathBuf,
    pub cfg: Config,
    pub store: S,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested { report_id: ReportId, hosts: usize },
    /// Same content seen before; nothing written.
    AlreadyIngested { report_id: ReportId },
}

impl Ingestor<SqliteStorage> {
    /// Open (creating on first use) the project under `root`.
    pub fn open(root: PathBuf) -> Result<Self> {
        let cfg_path = Config::config_path(&root);
        let cfg = if cfg_path.exists() {
            Config::load_from(&cfg_path)?
        } else {
            let project_id = root.file_name().and_then(|s| s.to_str()).unwrap_or("recap");
            let cfg = Config::default_for_root(project_id);
            cfg.save_to(&cfg_path)?;
            cfg
        };
        let store = SqliteStorage::open(&cfg.db_path(&root))?;
        Ok(Self { root, cfg, store })
    }

    pub fn init_root(root: &Path) -> Result<()> {
        let cfg_path = Config::config_path(root);
        if !cfg_path.exists() {
            let project_id = root.file_name().and_then(|s| s.to_str()).unwrap_or("recap");
            Config::default_for_root(project_id).save_to(&cfg_path)?;
        }
        let cfg = Config::load_from(&cfg_path)?;
        let _ = SqliteStorage::open(&cfg.db_path(root))?;
        Ok(())
    }
}

impl<S: Storage> Ingestor<S> {
    pub fn with_store(root: PathBuf, cfg: Config, store: S) -> Self {
        Self { root, cfg, store }
    }

    pub fn ingest_file(&self, path: &Path) -> Result<IngestOutcome> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read log file {}", path.display()))?;
        self.ingest(&raw)
    }

    /// Parse a raw log, derive play statuses from the recap tallies, and
    /// persist the report. Re-ingesting identical content is a no-op.
    pub fn ingest(&self, raw: &str) -> Result<IngestOutcome> {
        let hash = content_hash(raw);
        if let Some(report_id) = self.store.find_report_by_hash(&hash)? {
            tracing::debug!(hash = %hash, "log already ingested");
            return Ok(IngestOutcome::AlreadyIngested { report_id });
        }

        let parsed = recap_parser::parse(raw).context("parse ansible log")?;
        let report = build_report(&parsed, hash, now_unix());
        let hosts = report.hosts.len();
        self.store.insert_report(&report)?;
        tracing::info!(
            report_id = %report.meta.id.as_str(),
            hosts,
            plays = parsed.plays.len(),
            "ingested log"
        );
        Ok(IngestOutcome::Ingested { report_id: report.meta.id, hosts })
    }
}

/// Flatten a parse report into storage rows. Each host gets one play row per
/// parsed play, carrying the host's recap-derived status and tallies; task
/// rows attach to their (host, play) pair.
pub fn build_report(parsed: &ParseReport, content_hash: String, now_unix: i64) -> NewReport {
    let meta = ReportMeta {
        id: ReportId::new(),
        content_hash,
        ingested_at_unix: now_unix,
        finished_at_unix: parsed.finished_at_unix,
        format: parsed.format,
    };

    let mut hosts = vec![];
    // (hostname, play name) -> (host index, play index)
    let mut play_slots: HashMap<(String, String), (usize, usize)> = HashMap::new();

    for recap in &parsed.hosts {
        let status = status_from_counts(&recap.counts);
        let tasks = TaskSummary {
            ok: recap.counts.ok,
            changed: recap.counts.changed,
            failed: recap.counts.failed,
        };
        let mut plays = vec![];
        for entry in &parsed.plays {
            play_slots.insert(
                (recap.hostname.clone(), entry.name.clone()),
                (hosts.len(), plays.len()),
            );
            plays.push(NewPlay {
                play: Play {
                    id: PlayId::new(),
                    name: entry.name.clone(),
                    started_at_unix: parsed.finished_at_unix,
                    status,
                    tasks,
                },
                order: entry.order,
                line_number: entry.line_number,
                tasks: vec![],
            });
        }
        hosts.push(NewHost {
            id: HostId::new(),
            hostname: recap.hostname.clone(),
            plays,
        });
    }

    for task in &parsed.tasks {
        for result in &task.results {
            let slot = play_slots.get(&(result.hostname.clone(), task.play_name.clone()));
            if let Some(&(hi, pi)) = slot {
                let play_id = hosts[hi].plays[pi].play.id.clone();
                hosts[hi].plays[pi].tasks.push(TaskRecord {
                    id: TaskId::new(),
                    play_id,
                    name: task.name.clone(),
                    order: task.order,
                    line_number: task.line_number,
                    outcome: result.outcome,
                    failure_message: result.message.clone(),
                });
            }
        }
    }

    NewReport { meta, hosts }
}
