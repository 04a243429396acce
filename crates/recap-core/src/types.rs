use serde::{Deserialize, Serialize};

use crate::{ids::*, model::*};

/// Per-play tally of task outcomes. Independent of the play's own status;
/// both come from the producer.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskSummary {
    pub ok: u32,
    pub changed: u32,
    pub failed: u32,
}

/// Full PLAY RECAP tally for one host.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecapCounts {
    pub ok: u32,
    pub changed: u32,
    pub failed: u32,
    pub unreachable: u32,
    pub skipped: u32,
    pub rescued: u32,
    pub ignored: u32,
}

impl RecapCounts {
    /// Sum counters from another recap (multi-recap timestamped logs).
    pub fn absorb(&mut self, other: &RecapCounts) {
        self.ok += other.ok;
        self.changed += other.changed;
        self.failed += other.failed;
        self.unreachable += other.unreachable;
        self.skipped += other.skipped;
        self.rescued += other.rescued;
        self.ignored += other.ignored;
    }
}

/// One automation run against a host. Immutable once constructed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Play {
    pub id: PlayId,
    pub name: String,
    /// Recap time for timestamped logs; raw stdout carries none.
    pub started_at_unix: Option<i64>,
    pub status: PlayStatus,
    pub tasks: TaskSummary,
}

/// One task execution row within a play.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub play_id: PlayId,
    pub name: String,
    pub order: u32,
    pub line_number: Option<u32>,
    pub outcome: TaskOutcome,
    pub failure_message: Option<String>,
}

/// A target machine with its ordered play history. Play order reflects
/// execution order and is never re-sorted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Host {
    pub hostname: String,
    pub plays: Vec<Play>,
}

/// One ingested log with its derived rows, ready for display.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Board {
    pub report_id: Option<ReportId>,
    pub finished_at_unix: Option<i64>,
    pub hosts: Vec<Host>,
}

/// Summary row for an ingested report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportMeta {
    pub id: ReportId,
    pub content_hash: String,
    pub ingested_at_unix: i64,
    pub finished_at_unix: Option<i64>,
    pub format: LogFormat,
}
