use recap_core::{
    host_status, severity_rank, sort_hosts_by_severity, Host, Play, PlayId, PlayStatus,
    TaskSummary,
};

fn host(hostname: &str, statuses: &[PlayStatus]) -> Host {
    Host {
        hostname: hostname.to_string(),
        plays: statuses
            .iter()
            .map(|s| Play {
                id: PlayId::new(),
                name: format!("play on {}", hostname),
                started_at_unix: None,
                status: *s,
                tasks: TaskSummary { ok: 1, changed: 0, failed: 0 },
            })
            .collect(),
    }
}

#[test]
fn board_sorts_failed_first_then_changed_then_ok() {
    let hosts = vec![
        host("a", &[PlayStatus::Ok]),
        host("b", &[PlayStatus::Failed]),
        host("c", &[PlayStatus::Changed]),
        host("d", &[PlayStatus::Failed]),
    ];
    let sorted = sort_hosts_by_severity(&hosts);
    let names: Vec<&str> = sorted.iter().map(|h| h.hostname.as_str()).collect();
    // b before d: both failed, b preceded d in the input
    assert_eq!(names, vec!["b", "d", "c", "a"]);
}

#[test]
fn sort_is_stable_within_equal_severity() {
    let hosts = vec![
        host("web-01", &[PlayStatus::Changed, PlayStatus::Ok]),
        host("web-02", &[PlayStatus::Ok, PlayStatus::Changed]),
        host("web-03", &[PlayStatus::Changed]),
    ];
    let sorted = sort_hosts_by_severity(&hosts);
    let names: Vec<&str> = sorted.iter().map(|h| h.hostname.as_str()).collect();
    assert_eq!(names, vec!["web-01", "web-02", "web-03"]);
}

#[test]
fn sort_does_not_mutate_input() {
    let hosts = vec![
        host("z", &[PlayStatus::Ok]),
        host("y", &[PlayStatus::Failed]),
    ];
    let before = hosts.clone();
    let _ = sort_hosts_by_severity(&hosts);
    assert_eq!(hosts, before);
}

#[test]
fn sort_preserves_multiplicity_including_duplicate_hostnames() {
    let hosts = vec![
        host("dup", &[PlayStatus::Ok]),
        host("dup", &[PlayStatus::Failed]),
        host("dup", &[PlayStatus::Ok]),
    ];
    let sorted = sort_hosts_by_severity(&hosts);
    assert_eq!(sorted.len(), 3);
    assert!(sorted.iter().all(|h| h.hostname == "dup"));
    assert_eq!(
        sorted.iter().filter(|h| host_status(&h.plays) == PlayStatus::Failed).count(),
        1
    );
}

#[test]
fn sorted_output_ranks_never_decrease() {
    let hosts = vec![
        host("h1", &[PlayStatus::Ok, PlayStatus::Ok]),
        host("h2", &[PlayStatus::Changed, PlayStatus::Ok]),
        host("h3", &[PlayStatus::Ok, PlayStatus::Failed, PlayStatus::Changed]),
        host("h4", &[]),
        host("h5", &[PlayStatus::Failed]),
        host("h6", &[PlayStatus::Ok, PlayStatus::Changed]),
    ];
    let sorted = sort_hosts_by_severity(&hosts);
    let ranks: Vec<u8> = sorted
        .iter()
        .map(|h| severity_rank(host_status(&h.plays)))
        .collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn rollup_over_mixed_play_histories() {
    assert_eq!(
        host_status(&host("x", &[PlayStatus::Ok, PlayStatus::Ok]).plays),
        PlayStatus::Ok
    );
    assert_eq!(
        host_status(&host("y", &[PlayStatus::Changed, PlayStatus::Ok]).plays),
        PlayStatus::Changed
    );
    assert_eq!(
        host_status(
            &host("z", &[PlayStatus::Ok, PlayStatus::Failed, PlayStatus::Changed]).plays
        ),
        PlayStatus::Failed
    );
}

#[test]
fn empty_host_sorts_with_the_ok_group() {
    let hosts = vec![
        host("empty", &[]),
        host("broken", &[PlayStatus::Failed]),
    ];
    let sorted = sort_hosts_by_severity(&hosts);
    assert_eq!(sorted[0].hostname, "broken");
    assert_eq!(sorted[1].hostname, "empty");
}
