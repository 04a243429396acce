use std::collections::{HashMap, HashSet};

use recap_core::{LogFormat, RecapCounts, TaskOutcome};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::recap::{is_recap_banner, recap_row};
use crate::scan::{play_banner, result_line, split_stamp, stamp_to_unix, task_banner};

/// One host's recap tally. Counts from multiple PLAY RECAP sections (split
/// timestamped logs) are summed per host.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostRecap {
    pub hostname: String,
    pub counts: RecapCounts,
}

/// A play banner in document order. Line numbers are 1-based.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayEntry {
    pub name: String,
    pub order: u32,
    pub line_number: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskHostResult {
    pub hostname: String,
    pub outcome: TaskOutcome,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskEntry {
    pub name: String,
    pub order: u32,
    pub play_name: String,
    pub line_number: Option<u32>,
    pub results: Vec<TaskHostResult>,
}

/// Everything extracted from one log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParseReport {
    pub format: LogFormat,
    /// Last log stamp seen; raw stdout has none.
    pub finished_at_unix: Option<i64>,
    pub hosts: Vec<HostRecap>,
    pub plays: Vec<PlayEntry>,
    pub tasks: Vec<TaskEntry>,
}

/// Auto-detect the log format and parse it.
///
/// Rejects empty input and logs with no PLAY RECAP section; everything else
/// degrades gracefully (unrecognized lines are skipped).
pub fn parse(raw: &str) -> Result<ParseReport, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyLog);
    }
    // Browser textareas and Windows agents submit CRLF.
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let format = detect_format(&normalized);

    let mut state = ScanState::default();
    for (line_no, line) in normalized.lines().enumerate() {
        let line_no = line_no as u32 + 1;
        let line = match format {
            LogFormat::Stdout => line,
            LogFormat::Timestamped => match split_stamp(line) {
                Some((stamp, rest)) => {
                    if let Some(ts) = stamp_to_unix(stamp) {
                        state.last_stamp_unix = Some(ts);
                    }
                    rest
                }
                None => line,
            },
        };
        state.feed(line, line_no);
    }

    if state.hosts.is_empty() {
        return Err(ParseError::NoRecap);
    }

    Ok(ParseReport {
        format,
        finished_at_unix: state.last_stamp_unix,
        hosts: state.hosts,
        plays: state.plays,
        tasks: state.tasks,
    })
}

/// The first non-empty line decides: stamped prefix means a log file,
/// anything else is raw playbook stdout.
pub fn detect_format(content: &str) -> LogFormat {
    match content.lines().find(|l| !l.trim().is_empty()) {
        Some(first) if split_stamp(first).is_some() => LogFormat::Timestamped,
        _ => LogFormat::Stdout,
    }
}

#[derive(Default)]
struct ScanState {
    hosts: Vec<HostRecap>,
    host_index: HashMap<String, usize>,
    plays: Vec<PlayEntry>,
    seen_plays: HashSet<String>,
    tasks: Vec<TaskEntry>,
    current_play: Option<String>,
    in_recap: bool,
    last_stamp_unix: Option<i64>,
}

impl ScanState {
    fn feed(&mut self, line: &str, line_no: u32) {
        if self.in_recap {
            if let Some((hostname, counts)) = recap_row(line) {
                self.record_recap(hostname, counts);
                return;
            }
            // First non-row line closes the section; fall through so a
            // following PLAY banner is not lost.
            self.in_recap = false;
        }

        if is_recap_banner(line) {
            self.in_recap = true;
            return;
        }

        if let Some(name) = play_banner(line) {
            if self.seen_plays.insert(name.to_string()) {
                self.plays.push(PlayEntry {
                    name: name.to_string(),
                    order: self.plays.len() as u32,
                    line_number: Some(line_no),
                });
            }
            self.current_play = Some(name.to_string());
            return;
        }

        if let Some(name) = task_banner(line) {
            let play_name = self.current_play.clone().unwrap_or_default();
            self.tasks.push(TaskEntry {
                name: name.to_string(),
                order: self.tasks.len() as u32,
                play_name,
                line_number: Some(line_no),
                results: vec![],
            });
            return;
        }

        if let Some(r) = result_line(line) {
            if let Some(task) = self.tasks.last_mut() {
                task.results.push(TaskHostResult {
                    hostname: r.hostname.to_string(),
                    outcome: r.outcome,
                    message: r.message.map(str::to_string),
                });
            }
        }
    }

    fn record_recap(&mut self, hostname: String, counts: RecapCounts) {
        match self.host_index.get(&hostname) {
            Some(&i) => self.hosts[i].counts.absorb(&counts),
            None => {
                self.host_index.insert(hostname.clone(), self.hosts.len());
                self.hosts.push(HostRecap { hostname, counts });
            }
        }
    }
}
