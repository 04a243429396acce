use serde::{Deserialize, Serialize};

/// Outcome of one play on one host, and the rollup status of a host.
/// Unknown status strings are a producer bug and are rejected at parse time.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PlayStatus {
    Ok,
    Changed,
    Failed,
}

impl PlayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayStatus::Ok => "ok",
            PlayStatus::Changed => "changed",
            PlayStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for PlayStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(PlayStatus::Ok),
            "changed" => Ok(PlayStatus::Changed),
            "failed" => Ok(PlayStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Per-task result status as Ansible reports it. `Fatal` is treated as a
/// failure when filtering.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    Ok,
    Changed,
    Failed,
    Fatal,
    Skipping,
    Unreachable,
    Ignored,
    Rescued,
}

impl TaskOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOutcome::Ok => "ok",
            TaskOutcome::Changed => "changed",
            TaskOutcome::Failed => "failed",
            TaskOutcome::Fatal => "fatal",
            TaskOutcome::Skipping => "skipping",
            TaskOutcome::Unreachable => "unreachable",
            TaskOutcome::Ignored => "ignored",
            TaskOutcome::Rescued => "rescued",
        }
    }

    pub fn all() -> &'static [TaskOutcome] {
        &[
            TaskOutcome::Ok,
            TaskOutcome::Changed,
            TaskOutcome::Failed,
            TaskOutcome::Fatal,
            TaskOutcome::Skipping,
            TaskOutcome::Unreachable,
            TaskOutcome::Ignored,
            TaskOutcome::Rescued,
        ]
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed | TaskOutcome::Fatal)
    }
}

impl std::str::FromStr for TaskOutcome {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(TaskOutcome::Ok),
            "changed" => Ok(TaskOutcome::Changed),
            "failed" => Ok(TaskOutcome::Failed),
            "fatal" => Ok(TaskOutcome::Fatal),
            "skipping" => Ok(TaskOutcome::Skipping),
            "unreachable" => Ok(TaskOutcome::Unreachable),
            "ignored" => Ok(TaskOutcome::Ignored),
            "rescued" => Ok(TaskOutcome::Rescued),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Detected shape of an ingested log.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    /// Raw `ansible-playbook` stdout.
    Stdout,
    /// Log file with `YYYY-MM-DD HH:MM:SS,mmm | ` line prefixes.
    Timestamped,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Stdout => "stdout",
            LogFormat::Timestamped => "timestamped",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown status {0:?}")]
pub struct UnknownStatus(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_status_roundtrip() {
        for s in [PlayStatus::Ok, PlayStatus::Changed, PlayStatus::Failed] {
            assert_eq!(s.as_str().parse::<PlayStatus>().unwrap(), s);
        }
    }

    #[test]
    fn play_status_rejects_unknown() {
        let err = "pending".parse::<PlayStatus>().unwrap_err();
        assert_eq!(err, UnknownStatus("pending".to_string()));
    }

    #[test]
    fn task_outcome_roundtrip() {
        for o in TaskOutcome::all() {
            assert_eq!(o.as_str().parse::<TaskOutcome>().unwrap(), *o);
        }
    }

    #[test]
    fn fatal_counts_as_failure() {
        assert!(TaskOutcome::Fatal.is_failure());
        assert!(TaskOutcome::Failed.is_failure());
        assert!(!TaskOutcome::Ignored.is_failure());
    }
}
