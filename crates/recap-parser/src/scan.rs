use chrono::NaiveDateTime;
use recap_core::TaskOutcome;

/// Play/task banner and per-host result line scanning.
///
/// Ansible stdout interleaves three line shapes we care about:
///   PLAY [name] ****
///   TASK [name] ****
///   ok: [host]            (also changed:/failed:/fatal:/skipping:/unreachable:)
/// Timestamped log files prefix every line with "YYYY-MM-DD HH:MM:SS,mmm | ".

/// Extract the bracketed name from a `PLAY [...]` banner line.
pub fn play_banner(line: &str) -> Option<&str> {
    bracketed_after(line, "PLAY [")
}

/// Extract the bracketed name from a `TASK [...]` banner line.
pub fn task_banner(line: &str) -> Option<&str> {
    bracketed_after(line, "TASK [")
}

fn bracketed_after<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let start = line.find(prefix)? + prefix.len();
    let rest = &line[start..];
    let end = rest.find(']')?;
    Some(&rest[..end])
}

/// Per-host result line within a task, e.g. `fatal: [web-01]: FAILED! => {...}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultLine<'a> {
    pub outcome: TaskOutcome,
    pub hostname: &'a str,
    /// Raw failure payload after `=>`, kept only for failure outcomes.
    pub message: Option<&'a str>,
}

pub fn result_line(line: &str) -> Option<ResultLine<'_>> {
    let colon = line.find(':')?;
    let outcome: TaskOutcome = line[..colon].trim().parse().ok()?;
    let rest = line[colon + 1..].trim_start();
    let hostname = rest.strip_prefix('[')?;
    let end = hostname.find(']')?;
    let (hostname, tail) = (&hostname[..end], &hostname[end + 1..]);
    // Loop items report as `[host] => (item=...)`; the host part is the same.
    let message = if outcome.is_failure() || outcome == TaskOutcome::Unreachable {
        tail.split_once("=>").map(|(_, m)| m.trim()).filter(|m| !m.is_empty())
    } else {
        None
    };
    Some(ResultLine { outcome, hostname, message })
}

/// Split a `YYYY-MM-DD HH:MM:SS,mmm | ` prefix off a log line. Returns the
/// stamp text and the remainder, or None when the line is unstamped.
pub fn split_stamp(line: &str) -> Option<(&str, &str)> {
    const STAMP_LEN: usize = 23; // "2024-01-15 10:30:45,123"
    let bytes = line.as_bytes();
    if bytes.len() < STAMP_LEN {
        return None;
    }
    for (i, b) in bytes[..STAMP_LEN].iter().enumerate() {
        let ok = match i {
            4 | 7 => *b == b'-',
            10 => *b == b' ',
            13 | 16 => *b == b':',
            19 => *b == b',',
            _ => b.is_ascii_digit(),
        };
        if !ok {
            return None;
        }
    }
    let rest = line[STAMP_LEN..].strip_prefix(" | ")?;
    Some((&line[..STAMP_LEN], rest))
}

/// Parse a stamp produced by `split_stamp` into unix seconds.
pub fn stamp_to_unix(stamp: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S,%3f")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}
