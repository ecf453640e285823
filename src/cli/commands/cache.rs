//! Cache administration commands: `list`, `stats` and `clear`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{format_age, list_table, output, truncate, CommandOutput};
use crate::domain::models::{CacheEntry, CacheStats};
use crate::services::ResolutionService;

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Confirm removal of every entry
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
pub struct EntryRow {
    pub handle: String,
    pub name: Option<String>,
    pub failures: u32,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EntryListOutput {
    pub entries: Vec<EntryRow>,
    pub total: usize,
    #[serde(skip)]
    pub now: DateTime<Utc>,
}

impl EntryListOutput {
    /// Rows from a least-recently-used-first snapshot, most recent first.
    pub fn from_entries(
        entries: impl DoubleEndedIterator<Item = (String, CacheEntry)>,
        now: DateTime<Utc>,
    ) -> Self {
        let entries: Vec<EntryRow> = entries
            .rev()
            .map(|(handle, entry)| EntryRow {
                handle,
                name: entry.name,
                failures: entry.failure_count,
                last_updated: entry.last_updated,
            })
            .collect();
        Self {
            total: entries.len(),
            entries,
            now,
        }
    }
}

impl CommandOutput for EntryListOutput {
    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return "No cached entries.".to_string();
        }

        let mut table = list_table(&["handle", "name", "failures", "age"]);
        for row in &self.entries {
            table.add_row(vec![
                row.handle.clone(),
                row.name.as_deref().map_or_else(|| "-".to_string(), |n| truncate(n, 40)),
                row.failures.to_string(),
                format_age(self.now - row.last_updated),
            ]);
        }
        format!("{} entries:\n{table}", self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    #[serde(flatten)]
    pub stats: CacheStats,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["metric", "value"]);
        table.add_row(vec!["entries".to_string(), self.stats.entries.to_string()]);
        table.add_row(vec!["named".to_string(), self.stats.named.to_string()]);
        table.add_row(vec!["failing".to_string(), self.stats.failing.to_string()]);
        table.add_row(vec![
            "snapshot size".to_string(),
            format!("{:.1} KiB", self.stats.snapshot_bytes as f64 / 1024.0),
        ]);
        table.to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ClearOutput {
    pub removed: usize,
}

impl CommandOutput for ClearOutput {
    fn to_human(&self) -> String {
        format!("Removed {} cached entries.", self.removed)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn list(service: &ResolutionService, json: bool) -> Result<()> {
    let entries = service.entries().await?;
    output(&EntryListOutput::from_entries(entries.into_iter(), Utc::now()), json);
    Ok(())
}

pub async fn stats(service: &ResolutionService, json: bool) -> Result<()> {
    let stats = service.stats().await?;
    output(&StatsOutput { stats }, json);
    Ok(())
}

pub async fn clear(args: ClearArgs, service: &ResolutionService, json: bool) -> Result<()> {
    if !args.yes {
        anyhow::bail!("Refusing to clear the cache without --yes");
    }

    let removed = service.stats().await?.entries;
    service.clear().await?;
    output(&ClearOutput { removed }, json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_list_output_is_most_recent_first() {
        let now = Utc::now();
        let entries = vec![
            ("@old".to_string(), CacheEntry::resolved("Old", now - Duration::hours(2))),
            ("@new".to_string(), CacheEntry::failed(now)),
        ];

        let output = EntryListOutput::from_entries(entries.into_iter(), now);
        assert_eq!(output.total, 2);
        assert_eq!(output.entries[0].handle, "@new");
        assert_eq!(output.entries[1].handle, "@old");

        let human = output.to_human();
        assert!(human.contains("2h"));
        assert!(human.contains("@old"));
    }

    #[test]
    fn test_empty_list_output() {
        let output = EntryListOutput::from_entries(Vec::new().into_iter(), Utc::now());
        assert_eq!(output.to_human(), "No cached entries.");
        assert_eq!(output.to_json()["total"], 0);
    }

    #[test]
    fn test_stats_json_is_flat() {
        let output = StatsOutput {
            stats: CacheStats {
                entries: 3,
                named: 2,
                failing: 1,
                snapshot_bytes: 2048,
            },
        };
        let json = output.to_json();
        assert_eq!(json["entries"], 3);
        assert_eq!(json["failing"], 1);
        assert!(output.to_human().contains("2.0 KiB"));
    }
}
