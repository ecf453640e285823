//! `add` command: resolve one handle right away and persist it.

use anyhow::{Context, Result};
use clap::Args;

use super::resolve::{ResolveOutput, ResolvedRow};
use crate::cli::output::output;
use crate::domain::models::{normalize_handle, Priority, ResolveOutcome};
use crate::services::ResolutionService;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Handle to add, with or without the leading @
    pub handle: String,

    /// Store this display name instead of looking it up
    #[arg(short, long)]
    pub name: Option<String>,
}

pub async fn execute(args: AddArgs, service: &ResolutionService, json: bool) -> Result<()> {
    let handle = normalize_handle(&args.handle)
        .with_context(|| format!("Invalid handle {:?}", args.handle))?;

    let outcome = match args.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        Some(name) => {
            service.insert(handle.as_str(), name.as_str()).await?;
            ResolveOutcome::Resolved(name)
        }
        None => service.resolve(handle.as_str(), Priority::High).await?,
    };
    service.flush_now().await?;

    let failed = outcome.name().is_none();
    output(
        &ResolveOutput {
            results: vec![ResolvedRow::new(handle.clone(), &outcome)],
        },
        json,
    );

    if failed {
        anyhow::bail!("Could not resolve {handle}");
    }
    Ok(())
}
