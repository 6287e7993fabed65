//! Activity observations and per-site usage tallies.
//!
//! Reports come from an external watcher (screen analysis or the browser
//! extension). Only the resulting classification crosses into the core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Site name used when a report carries none.
pub const UNKNOWN_SITE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Productive,
    Wasted,
    Neutral,
    Nsfw,
}

impl ActivityStatus {
    /// Whether this classification counts as a violation.
    pub fn is_violation(&self) -> bool {
        matches!(self, ActivityStatus::Wasted)
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityStatus::Productive => "productive",
            ActivityStatus::Wasted => "wasted",
            ActivityStatus::Neutral => "neutral",
            ActivityStatus::Nsfw => "nsfw",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "productive" => Ok(ActivityStatus::Productive),
            "wasted" => Ok(ActivityStatus::Wasted),
            "neutral" => Ok(ActivityStatus::Neutral),
            "nsfw" => Ok(ActivityStatus::Nsfw),
            other => Err(format!("unknown activity status: {other}")),
        }
    }
}

/// One classification from the observation feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReport {
    #[serde(default)]
    pub site: Option<String>,
    pub status: ActivityStatus,
}

impl ActivityReport {
    pub fn new(site: Option<String>, status: ActivityStatus) -> Self {
        Self { site, status }
    }

    pub fn site_or_unknown(&self) -> &str {
        self.site
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SITE)
    }
}

/// Minutes attributed to one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainUsage {
    pub domain: String,
    pub minutes: u64,
    /// Category assigned on first sighting
    pub category: ActivityStatus,
}

/// Productive vs wasted minute totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTotals {
    pub total_productive: u64,
    pub total_wasted: u64,
}

/// Per-domain usage in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageLog {
    entries: Vec<DomainUsage>,
}

impl UsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one observed minute against the report's site.
    pub fn record(&mut self, report: &ActivityReport) -> &DomainUsage {
        let domain = report.site_or_unknown();
        let idx = match self.entries.iter().position(|u| u.domain == domain) {
            Some(idx) => {
                self.entries[idx].minutes += 1;
                idx
            }
            None => {
                self.entries.push(DomainUsage {
                    domain: domain.to_string(),
                    minutes: 1,
                    category: report.status,
                });
                self.entries.len() - 1
            }
        };
        &self.entries[idx]
    }

    pub fn entries(&self) -> &[DomainUsage] {
        &self.entries
    }

    pub fn totals(&self) -> UsageTotals {
        self.entries
            .iter()
            .fold(UsageTotals::default(), |mut acc, u| {
                match u.category {
                    ActivityStatus::Productive => acc.total_productive += u.minutes,
                    ActivityStatus::Wasted => acc.total_wasted += u.minutes,
                    ActivityStatus::Neutral | ActivityStatus::Nsfw => {}
                }
                acc
            })
    }
}
