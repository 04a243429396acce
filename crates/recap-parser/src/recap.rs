use recap_core::RecapCounts;

/// PLAY RECAP section parsing.
///
/// Recap rows look like:
///   web-01    : ok=15   changed=5   unreachable=0   failed=0   skipped=2   rescued=0   ignored=0

pub fn is_recap_banner(line: &str) -> bool {
    line.trim_start().starts_with("PLAY RECAP")
}

/// Parse one recap row into hostname + counts. Returns None for anything
/// that is not a recap row, which is how the caller detects the section end.
pub fn recap_row(line: &str) -> Option<(String, RecapCounts)> {
    let (host_part, counts_part) = line.split_once(':')?;
    let hostname = host_part.trim();
    if hostname.is_empty() || hostname.contains(char::is_whitespace) {
        return None;
    }

    let mut counts = RecapCounts::default();
    let mut seen = 0u32;
    for token in counts_part.split_whitespace() {
        let (key, value) = token.split_once('=')?;
        let value: u32 = value.parse().ok()?;
        match key {
            "ok" => counts.ok = value,
            "changed" => counts.changed = value,
            "failed" => counts.failed = value,
            "unreachable" => counts.unreachable = value,
            "skipped" => counts.skipped = value,
            "rescued" => counts.rescued = value,
            "ignored" => counts.ignored = value,
            _ => return None,
        }
        seen += 1;
    }
    if seen == 0 {
        return None;
    }
    Some((hostname.to_string(), counts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_recap_row() {
        let line = "web-01.prod.example.com    : ok=15   changed=5    unreachable=0    failed=1    skipped=2    rescued=0    ignored=0";
        let (host, counts) = recap_row(line).unwrap();
        assert_eq!(host, "web-01.prod.example.com");
        assert_eq!(counts.ok, 15);
        assert_eq!(counts.changed, 5);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.skipped, 2);
    }

    #[test]
    fn rejects_non_recap_lines() {
        assert!(recap_row("").is_none());
        assert!(recap_row("PLAY RECAP *********").is_none());
        assert!(recap_row("fatal: [web-01]: FAILED! => {}").is_none());
        assert!(recap_row("ok: [web-01]").is_none());
        assert!(recap_row("some prose with : a colon").is_none());
    }

    #[test]
    fn rejects_unknown_count_keys() {
        assert!(recap_row("web-01 : ok=1 bogus=2").is_none());
    }

    #[test]
    fn recap_banner_detection() {
        assert!(is_recap_banner("PLAY RECAP *********************"));
        assert!(!is_recap_banner("PLAY [Setup] *******************"));
    }
}
