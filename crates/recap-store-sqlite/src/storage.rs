use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use recap_core::{
    Board, Host, LogFormat, Play, PlayId, PlayStatus, ReportId, ReportMeta, TaskId, TaskOutcome,
    TaskRecord, TaskSummary,
};
use recap_store::{NewReport, Storage};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("open sqlite db {}", db_path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        // init schema
        let init_sql = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(init_sql)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn str_to_status(s: &str) -> PlayStatus {
        match s {
            "changed" => PlayStatus::Changed,
            "failed" => PlayStatus::Failed,
            _ => PlayStatus::Ok,
        }
    }

    fn str_to_outcome(s: &str) -> TaskOutcome {
        s.parse().unwrap_or(TaskOutcome::Ok)
    }

    fn str_to_format(s: &str) -> LogFormat {
        match s {
            "timestamped" => LogFormat::Timestamped,
            _ => LogFormat::Stdout,
        }
    }

    fn row_to_meta(r: &rusqlite::Row<'_>) -> rusqlite::Result<ReportMeta> {
        Ok(ReportMeta {
            id: ReportId::from_str(r.get::<_, String>(0)?),
            content_hash: r.get(1)?,
            ingested_at_unix: r.get(2)?,
            finished_at_unix: r.get(3)?,
            format: Self::str_to_format(&r.get::<_, String>(4)?),
        })
    }
}

impl Storage for SqliteStorage {
    fn insert_report(&self, report: &NewReport) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO reports(id, content_hash, ingested_at, finished_at, format)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                report.meta.id.0,
                report.meta.content_hash,
                report.meta.ingested_at_unix,
                report.meta.finished_at_unix,
                report.meta.format.as_str()
            ],
        )?;

        for (host_ord, host) in report.hosts.iter().enumerate() {
            tx.execute(
                "INSERT INTO hosts(id, report_id, hostname, ord) VALUES (?1, ?2, ?3, ?4)",
                params![host.id.0, report.meta.id.0, host.hostname, host_ord as i64],
            )?;
            for p in &host.plays {
                tx.execute(
                    "INSERT INTO plays(id, host_id, name, ord, line_number, started_at, status,
                                       tasks_ok, tasks_changed, tasks_failed)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        p.play.id.0,
                        host.id.0,
                        p.play.name,
                        p.order as i64,
                        p.line_number.map(|n| n as i64),
                        p.play.started_at_unix,
                        p.play.status.as_str(),
                        p.play.tasks.ok as i64,
                        p.play.tasks.changed as i64,
                        p.play.tasks.failed as i64
                    ],
                )?;
                for t in &p.tasks {
                    tx.execute(
                        "INSERT INTO tasks(id, play_id, name, ord, line_number, outcome, failure_message)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            t.id.0,
                            p.play.id.0,
                            t.name,
                            t.order as i64,
                            t.line_number.map(|n| n as i64),
                            t.outcome.as_str(),
                            t.failure_message
                        ],
                    )?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn list_reports(&self) -> Result<Vec<ReportMeta>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, content_hash, ingested_at, finished_at, format
             FROM reports ORDER BY ingested_at",
        )?;
        let rows = stmt.query_map([], |r| Self::row_to_meta(r))?;
        let mut reports = vec![];
        for row in rows {
            reports.push(row?);
        }
        Ok(reports)
    }

    fn find_report_by_hash(&self, content_hash: &str) -> Result<Option<ReportId>> {
        let conn = self.conn.lock().unwrap();
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM reports WHERE content_hash=?1",
                params![content_hash],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id.map(ReportId::from_str))
    }

    fn latest_report(&self) -> Result<Option<ReportId>> {
        let conn = self.conn.lock().unwrap();
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM reports ORDER BY ingested_at DESC, rowid DESC LIMIT 1",
                [],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id.map(ReportId::from_str))
    }

    fn load_board(&self, report_id: &ReportId) -> Result<Board> {
        let conn = self.conn.lock().unwrap();

        let finished_at: Option<i64> = conn
            .query_row(
                "SELECT finished_at FROM reports WHERE id=?1",
                params![report_id.0],
                |r| r.get(0),
            )
            .optional()
            .with_context(|| format!("load report {}", report_id.as_str()))?
            .ok_or_else(|| anyhow::anyhow!("report not found: {}", report_id.as_str()))?;

        let mut hosts = vec![];
        {
            let mut stmt = conn.prepare(
                "SELECT id, hostname FROM hosts WHERE report_id=?1 ORDER BY ord",
            )?;
            let host_rows = stmt.query_map(params![report_id.0], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
            })?;
            let mut plays_stmt = conn.prepare(
                "SELECT id, name, started_at, status, tasks_ok, tasks_changed, tasks_failed
                 FROM plays WHERE host_id=?1 ORDER BY ord",
            )?;
            for row in host_rows {
                let (host_id, hostname) = row?;
                let play_rows = plays_stmt.query_map(params![host_id], |r| {
                    Ok(Play {
                        id: PlayId::from_str(r.get::<_, String>(0)?),
                        name: r.get(1)?,
                        started_at_unix: r.get(2)?,
                        status: Self::str_to_status(&r.get::<_, String>(3)?),
                        tasks: TaskSummary {
                            ok: r.get::<_, i64>(4)? as u32,
                            changed: r.get::<_, i64>(5)? as u32,
                            failed: r.get::<_, i64>(6)? as u32,
                        },
                    })
                })?;
                let mut plays = vec![];
                for p in play_rows {
                    plays.push(p?);
                }
                hosts.push(Host { hostname, plays });
            }
        }

        Ok(Board {
            report_id: Some(report_id.clone()),
            finished_at_unix: finished_at,
            hosts,
        })
    }

    fn tasks_for_play(
        &self,
        play_id: &PlayId,
        filter: Option<TaskOutcome>,
    ) -> Result<Vec<TaskRecord>> {
        let conn = self.conn.lock().unwrap();

        // Filtering on failed also matches fatal rows.
        let (sql, filter_param): (&str, Option<String>) = match filter {
            None => (
                "SELECT id, play_id, name, ord, line_number, outcome, failure_message
                 FROM tasks WHERE play_id=?1 ORDER BY ord",
                None,
            ),
            Some(TaskOutcome::Failed) => (
                "SELECT id, play_id, name, ord, line_number, outcome, failure_message
                 FROM tasks WHERE play_id=?1 AND outcome IN ('failed','fatal') ORDER BY ord",
                None,
            ),
            Some(other) => (
                "SELECT id, play_id, name, ord, line_number, outcome, failure_message
                 FROM tasks WHERE play_id=?1 AND outcome=?2 ORDER BY ord",
                Some(other.as_str().to_string()),
            ),
        };

        let mut stmt = conn.prepare(sql)?;
        let map_row = |r: &rusqlite::Row<'_>| -> rusqlite::Result<TaskRecord> {
            Ok(TaskRecord {
                id: TaskId::from_str(r.get::<_, String>(0)?),
                play_id: PlayId::from_str(r.get::<_, String>(1)?),
                name: r.get(2)?,
                order: r.get::<_, i64>(3)? as u32,
                line_number: r.get::<_, Option<i64>>(4)?.map(|n| n as u32),
                outcome: Self::str_to_outcome(&r.get::<_, String>(5)?),
                failure_message: r.get(6)?,
            })
        };

        let mut tasks = vec![];
        match filter_param {
            Some(outcome) => {
                let rows = stmt.query_map(params![play_id.0, outcome], map_row)?;
                for row in rows {
                    tasks.push(row?);
                }
            }
            None => {
                let rows = stmt.query_map(params![play_id.0], map_row)?;
                for row in rows {
                    tasks.push(row?);
                }
            }
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_core::HostId;
    use recap_store::{NewHost, NewPlay};
    use tempfile::tempdir;

    fn sample_report(hash: &str, ingested_at: i64) -> (NewReport, PlayId) {
        let play_id = PlayId::new();
        let report = NewReport {
            meta: ReportMeta {
                id: ReportId::new(),
                content_hash: hash.to_string(),
                ingested_at_unix: ingested_at,
                finished_at_unix: Some(1_705_314_903),
                format: LogFormat::Timestamped,
            },
            hosts: vec![
                NewHost {
                    id: HostId::new(),
                    hostname: "lb-01".to_string(),
                    plays: vec![NewPlay {
                        play: Play {
                            id: play_id.clone(),
                            name: "Configure Load Balancer".to_string(),
                            started_at_unix: Some(1_705_314_903),
                            status: PlayStatus::Failed,
                            tasks: TaskSummary { ok: 8, changed: 2, failed: 1 },
                        },
                        order: 0,
                        line_number: Some(1),
                        tasks: vec![
                            TaskRecord {
                                id: TaskId::new(),
                                play_id: play_id.clone(),
                                name: "Install haproxy".to_string(),
                                order: 0,
                                line_number: Some(3),
                                outcome: TaskOutcome::Changed,
                                failure_message: None,
                            },
                            TaskRecord {
                                id: TaskId::new(),
                                play_id: play_id.clone(),
                                name: "Reload certs".to_string(),
                                order: 1,
                                line_number: Some(8),
                                outcome: TaskOutcome::Fatal,
                                failure_message: Some("cert expired".to_string()),
                            },
                        ],
                    }],
                },
                NewHost {
                    id: HostId::new(),
                    hostname: "cache-01".to_string(),
                    plays: vec![],
                },
            ],
        };
        (report, play_id)
    }

    #[test]
    fn sqlite_open_and_migrate() {
        let dir = tempdir().unwrap();
        let _ = SqliteStorage::open(&dir.path().join("recap.db")).unwrap();
    }

    #[test]
    fn report_roundtrip_preserves_rows() {
        let dir = tempdir().unwrap();
        let store = SqliteStorage::open(&dir.path().join("recap.db")).unwrap();
        let (report, _) = sample_report("h1", 100);
        store.insert_report(&report).unwrap();

        let listed = store.list_reports().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content_hash, "h1");
        assert_eq!(listed[0].format, LogFormat::Timestamped);

        let board = store.load_board(&report.meta.id).unwrap();
        assert_eq!(board.hosts.len(), 2);
        assert_eq!(board.hosts[0].hostname, "lb-01");
        assert_eq!(board.hosts[0].plays[0].status, PlayStatus::Failed);
        assert_eq!(board.hosts[0].plays[0].tasks.ok, 8);
        // empty play list survives as-is
        assert!(board.hosts[1].plays.is_empty());
    }

    #[test]
    fn duplicate_content_hash_is_rejected() {
        let dir = tempdir().unwrap();
        let store = SqliteStorage::open(&dir.path().join("recap.db")).unwrap();
        let (first, _) = sample_report("same", 100);
        let (second, _) = sample_report("same", 200);
        store.insert_report(&first).unwrap();
        assert!(store.insert_report(&second).is_err());
        assert_eq!(store.find_report_by_hash("same").unwrap(), Some(first.meta.id));
    }

    #[test]
    fn latest_report_prefers_newest_ingest() {
        let dir = tempdir().unwrap();
        let store = SqliteStorage::open(&dir.path().join("recap.db")).unwrap();
        let (old, _) = sample_report("h1", 100);
        let (new, _) = sample_report("h2", 200);
        store.insert_report(&old).unwrap();
        store.insert_report(&new).unwrap();
        assert_eq!(store.latest_report().unwrap(), Some(new.meta.id));
    }

    #[test]
    fn task_filter_failed_includes_fatal() {
        let dir = tempdir().unwrap();
        let store = SqliteStorage::open(&dir.path().join("recap.db")).unwrap();
        let (report, play_id) = sample_report("h1", 100);
        store.insert_report(&report).unwrap();

        let all = store.tasks_for_play(&play_id, None).unwrap();
        assert_eq!(all.len(), 2);

        let failed = store.tasks_for_play(&play_id, Some(TaskOutcome::Failed)).unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].outcome, TaskOutcome::Fatal);

        let skipped = store.tasks_for_play(&play_id, Some(TaskOutcome::Skipping)).unwrap();
        assert!(skipped.is_empty());
    }
}
