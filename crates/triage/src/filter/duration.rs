//! Signed duration windows for temporal filters.
//!
//! Patterns like `+7d` (at least seven days old) and `-30d` (updated within
//! the last thirty days) compile into typed windows evaluated against a
//! caller-supplied evaluation time. The exact boundary belongs to `+`.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Pattern grammar: sign, magnitude, unit (minutes, hours, days, weeks)
static DURATION_REGEX: OnceLock<Regex> = OnceLock::new();

fn duration_regex() -> &'static Regex {
    DURATION_REGEX
        .get_or_init(|| Regex::new(r"^([+-])(\d+)([mhdw])$").expect("duration regex should compile"))
}

/// A signed duration window relative to evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationWindow {
    /// `+` selects timestamps at least `span` old, `-` selects more recent ones
    at_least: bool,
    span: Duration,
}

impl DurationWindow {
    /// Parse a signed duration pattern, e.g. `+7d`, `-12h`, `+2w`.
    ///
    /// Returns `None` for anything outside the grammar, including magnitudes
    /// too large to represent.
    pub fn parse(pattern: &str) -> Option<DurationWindow> {
        let caps = duration_regex().captures(pattern)?;
        let magnitude: i64 = caps[2].parse().ok()?;
        let span = match &caps[3] {
            "m" => Duration::try_minutes(magnitude)?,
            "h" => Duration::try_hours(magnitude)?,
            "d" => Duration::try_days(magnitude)?,
            "w" => Duration::try_weeks(magnitude)?,
            _ => return None,
        };
        Some(DurationWindow {
            at_least: &caps[1] == "+",
            span,
        })
    }

    /// Whether a timestamp falls inside this window at `now`.
    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let elapsed = now.signed_duration_since(timestamp);
        if self.at_least {
            elapsed >= self.span
        } else {
            elapsed < self.span
        }
    }

    /// Whether a missing timestamp satisfies this window.
    ///
    /// A never-responded item is treated as infinitely long ago: it satisfies
    /// every staleness (`+`) window and no recency (`-`) window.
    pub fn matches_missing(&self) -> bool {
        self.at_least
    }
}
