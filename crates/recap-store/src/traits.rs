use recap_core::{Board, Play, PlayId, ReportId, ReportMeta, TaskOutcome, TaskRecord};

/// A fully-derived report ready to persist: one row tree per ingested log.
#[derive(Clone, Debug)]
pub struct NewReport {
    pub meta: ReportMeta,
    pub hosts: Vec<NewHost>,
}

#[derive(Clone, Debug)]
pub struct NewHost {
    pub id: recap_core::HostId,
    pub hostname: String,
    pub plays: Vec<NewPlay>,
}

#[derive(Clone, Debug)]
pub struct NewPlay {
    pub play: Play,
    pub order: u32,
    pub line_number: Option<u32>,
    pub tasks: Vec<TaskRecord>,
}

pub trait Storage: Send + Sync {
    fn insert_report(&self, report: &NewReport) -> anyhow::Result<()>;

    fn list_reports(&self) -> anyhow::Result<Vec<ReportMeta>>;

    /// Ingest idempotency lookup: a log is identified by its content hash.
    fn find_report_by_hash(&self, content_hash: &str) -> anyhow::Result<Option<ReportId>>;

    fn latest_report(&self) -> anyhow::Result<Option<ReportId>>;

    /// Hosts with their plays for one report, in stored order.
    /// Severity ordering is the caller's concern (rollup is never persisted).
    fn load_board(&self, report_id: &ReportId) -> anyhow::Result<Board>;

    /// Tasks of one play ordered by execution order. Filtering on `Failed`
    /// also matches `Fatal` rows.
    fn tasks_for_play(
        &self,
        play_id: &PlayId,
        filter: Option<TaskOutcome>,
    ) -> anyhow::Result<Vec<TaskRecord>>;
}

/// Shared filter rule so both backends agree on what "failed" matches.
pub fn outcome_matches(outcome: TaskOutcome, filter: TaskOutcome) -> bool {
    match filter {
        TaskOutcome::Failed => outcome.is_failure(),
        other => outcome == other,
    }
}
