use std::sync::Mutex;

use recap_core::{Board, Host, PlayId, ReportId, ReportMeta, TaskOutcome, TaskRecord};

use crate::traits::{outcome_matches, NewReport, Storage};

/// In-memory storage for tests. Not durable, but good for unit/small
/// scenario tests.
#[derive(Default)]
pub struct InMemoryStorage {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    reports: Vec<NewReport>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for InMemoryStorage {
    fn insert_report(&self, report: &NewReport) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.reports.push(report.clone());
        Ok(())
    }

    fn list_reports(&self) -> anyhow::Result<Vec<ReportMeta>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.reports.iter().map(|r| r.meta.clone()).collect())
    }

    fn find_report_by_hash(&self, content_hash: &str) -> anyhow::Result<Option<ReportId>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reports
            .iter()
            .find(|r| r.meta.content_hash == content_hash)
            .map(|r| r.meta.id.clone()))
    }

    fn latest_report(&self) -> anyhow::Result<Option<ReportId>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reports
            .iter()
            .max_by_key(|r| r.meta.ingested_at_unix)
            .map(|r| r.meta.id.clone()))
    }

    fn load_board(&self, report_id: &ReportId) -> anyhow::Result<Board> {
        let inner = self.inner.lock().unwrap();
        let report = inner
            .reports
            .iter()
            .find(|r| r.meta.id == *report_id)
            .ok_or_else(|| anyhow::anyhow!("report not found: {}", report_id.as_str()))?;
        Ok(Board {
            report_id: Some(report.meta.id.clone()),
            finished_at_unix: report.meta.finished_at_unix,
            hosts: report
                .hosts
                .iter()
                .map(|h| Host {
                    hostname: h.hostname.clone(),
                    plays: h.plays.iter().map(|p| p.play.clone()).collect(),
                })
                .collect(),
        })
    }

    fn tasks_for_play(
        &self,
        play_id: &PlayId,
        filter: Option<TaskOutcome>,
    ) -> anyhow::Result<Vec<TaskRecord>> {
        let inner = self.inner.lock().unwrap();
        let mut tasks: Vec<TaskRecord> = inner
            .reports
            .iter()
            .flat_map(|r| r.hosts.iter())
            .flat_map(|h| h.plays.iter())
            .filter(|p| p.play.id == *play_id)
            .flat_map(|p| p.tasks.iter())
            .filter(|t| filter.map_or(true, |f| outcome_matches(t.outcome, f)))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.order);
        Ok(tasks)
    }
}
