//! Duration string parsing/formatting (`§4.3`): `"<H> hr <M> min <S> sec"`,
//! with any part optional and omitted when zero.

use once_cell::sync::Lazy;
use regex::Regex;

static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*hr").unwrap());
static MINUTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*min").unwrap());
static SECONDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*sec").unwrap());

/// Parse a human duration string into total seconds. Missing parts count as
/// zero; an unparseable string yields zero.
#[must_use]
pub fn parse_duration(s: &str) -> u64 {
    let hours = HOURS_RE
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0);
    let minutes = MINUTES_RE
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0);
    let seconds = SECONDS_RE
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0);
    hours * 3600 + minutes * 60 + seconds
}

/// Format total seconds back into `"<H> hr <M> min <S> sec"`, omitting zero
/// parts. Zero total seconds formats as `"0 sec"`.
#[must_use]
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let remainder = total_seconds % 3600;
    let minutes = remainder / 60;
    let seconds = remainder % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours} hr"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} min"));
    }
    if seconds > 0 {
        parts.push(format!("{seconds} sec"));
    }

    if parts.is_empty() {
        "0 sec".to_string()
    } else {
        parts.join(" ")
    }
}
