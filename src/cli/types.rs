//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{add::AddArgs, cache::ClearArgs, resolve::ResolveArgs};

#[derive(Parser, Debug)]
#[command(name = "handle-resolver")]
#[command(about = "Resolve channel handles to display names with a persistent cache", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .handle-resolver/config.yaml and local.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep the cache in memory only; nothing is loaded or saved
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve one or more handles to display names
    Resolve(ResolveArgs),

    /// Resolve a handle immediately and persist the result
    Add(AddArgs),

    /// List cached entries, most recently used first
    List,

    /// Show cache statistics
    Stats,

    /// Remove every cached entry
    Clear(ClearArgs),
}
