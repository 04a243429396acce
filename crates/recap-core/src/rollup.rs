use crate::{Host, PlayStatus, RecapCounts};

/// Rollup status for a host: the worst status among its plays.
/// Failed dominates Changed, which dominates Ok, independent of counts or
/// ordering. An empty play list rolls up to Ok: no failures and no changes
/// were observed. Callers feeding live data where "no plays yet" means
/// something else should handle that case before calling in.
pub fn host_status(plays: &[crate::Play]) -> PlayStatus {
    if plays.iter().any(|p| p.status == PlayStatus::Failed) {
        return PlayStatus::Failed;
    }
    if plays.iter().any(|p| p.status == PlayStatus::Changed) {
        return PlayStatus::Changed;
    }
    PlayStatus::Ok
}

/// Sort key for board ordering: worst first.
pub fn severity_rank(status: PlayStatus) -> u8 {
    match status {
        PlayStatus::Failed => 0,
        PlayStatus::Changed => 1,
        PlayStatus::Ok => 2,
    }
}

/// Return hosts ordered by ascending severity rank of their rollup status.
/// The sort is stable: hosts with equal rollup status keep their input order,
/// so equal-severity hosts do not jitter between renders. The input is left
/// untouched; duplicates pass through.
pub fn sort_hosts_by_severity(hosts: &[Host]) -> Vec<Host> {
    let mut sorted = hosts.to_vec();
    sorted.sort_by_key(|h| severity_rank(host_status(&h.plays)));
    sorted
}

/// Status derivation from PLAY RECAP tallies, used at ingest time to assign
/// each play's status. Unreachable hosts count as failed.
pub fn status_from_counts(counts: &RecapCounts) -> PlayStatus {
    if counts.failed > 0 || counts.unreachable > 0 {
        return PlayStatus::Failed;
    }
    if counts.changed > 0 {
        return PlayStatus::Changed;
    }
    PlayStatus::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Play, PlayId, TaskSummary};

    fn play(status: PlayStatus) -> Play {
        Play {
            id: PlayId::new(),
            name: "p".to_string(),
            started_at_unix: None,
            status,
            tasks: TaskSummary::default(),
        }
    }

    #[test]
    fn empty_plays_roll_up_to_ok() {
        assert_eq!(host_status(&[]), PlayStatus::Ok);
    }

    #[test]
    fn failed_dominates_regardless_of_position() {
        let plays = vec![
            play(PlayStatus::Ok),
            play(PlayStatus::Failed),
            play(PlayStatus::Changed),
        ];
        assert_eq!(host_status(&plays), PlayStatus::Failed);

        let plays = vec![play(PlayStatus::Failed), play(PlayStatus::Ok)];
        assert_eq!(host_status(&plays), PlayStatus::Failed);
    }

    #[test]
    fn changed_dominates_ok() {
        let plays = vec![play(PlayStatus::Changed), play(PlayStatus::Ok)];
        assert_eq!(host_status(&plays), PlayStatus::Changed);
    }

    #[test]
    fn all_ok_rolls_up_to_ok() {
        let plays = vec![play(PlayStatus::Ok), play(PlayStatus::Ok)];
        assert_eq!(host_status(&plays), PlayStatus::Ok);
    }

    #[test]
    fn rank_orders_failed_worst() {
        assert!(severity_rank(PlayStatus::Failed) < severity_rank(PlayStatus::Changed));
        assert!(severity_rank(PlayStatus::Changed) < severity_rank(PlayStatus::Ok));
    }

    #[test]
    fn counts_with_unreachable_derive_failed() {
        let counts = RecapCounts { unreachable: 1, ok: 10, ..Default::default() };
        assert_eq!(status_from_counts(&counts), PlayStatus::Failed);
    }

    #[test]
    fn counts_priority_failed_then_changed_then_ok() {
        let counts = RecapCounts { failed: 1, changed: 5, ok: 10, ..Default::default() };
        assert_eq!(status_from_counts(&counts), PlayStatus::Failed);

        let counts = RecapCounts { changed: 2, ok: 10, ..Default::default() };
        assert_eq!(status_from_counts(&counts), PlayStatus::Changed);

        assert_eq!(status_from_counts(&RecapCounts::default()), PlayStatus::Ok);
    }
}
