//! `resolve` command.

use anyhow::{Context, Result};
use clap::Args;
use futures::future::try_join_all;
use serde::Serialize;

use crate::cli::output::{list_table, output, CommandOutput};
use crate::domain::models::{normalize_handle, Priority, ResolveOutcome};
use crate::services::ResolutionService;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Handles to resolve, with or without the leading @
    #[arg(required = true)]
    pub handles: Vec<String>,

    /// Queue lane (high, normal)
    #[arg(short, long, default_value = "normal")]
    pub priority: Priority,
}

#[derive(Debug, Serialize)]
pub struct ResolvedRow {
    pub handle: String,
    pub status: &'static str,
    pub name: Option<String>,
}

impl ResolvedRow {
    pub fn new(handle: String, outcome: &ResolveOutcome) -> Self {
        Self {
            handle,
            status: outcome.status(),
            name: outcome.name().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    pub results: Vec<ResolvedRow>,
}

impl CommandOutput for ResolveOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["handle", "status", "name"]);
        for row in &self.results {
            table.add_row(vec![
                row.handle.clone(),
                row.status.to_string(),
                row.name.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        table.to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ResolveArgs, service: &ResolutionService, json: bool) -> Result<()> {
    let handles = args
        .handles
        .iter()
        .map(|raw| normalize_handle(raw).with_context(|| format!("Invalid handle {raw:?}")))
        .collect::<Result<Vec<_>>>()?;

    let outcomes = try_join_all(
        handles
            .iter()
            .map(|handle| service.resolve(handle.as_str(), args.priority)),
    )
    .await
    .context("Resolution service stopped")?;

    let results = handles
        .into_iter()
        .zip(&outcomes)
        .map(|(handle, outcome)| ResolvedRow::new(handle, outcome))
        .collect();

    output(&ResolveOutput { results }, json);
    Ok(())
}
