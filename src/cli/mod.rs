//! CLI module for bsd
//!
//! Provides the command-line interface using clap.

pub mod commands;
mod workspace;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::schemas::{StageKind, Status};

pub use workspace::{
    linked_changes, open_engine, open_engine_with_events, workspace_root, WorkspaceEngine,
};

/// bsd - Sign waste shipment documents and follow their status
#[derive(Parser, Debug)]
#[command(name = "bsd")]
#[command(version)]
#[command(about = "Sign waste shipment documents (bordereaux) and follow their status")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress info-level output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Override the working directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a .bordereaux workspace in the current directory
    Init {
        /// Rewrite the configuration even if .bordereaux already exists
        #[arg(long)]
        force: bool,
    },

    /// Import bordereaux from a JSON file holding an array of documents
    Import {
        /// Path to the JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List bordereaux with optional filtering
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Filter by status (initial, sent, processed, awaiting_group, ...)
        #[arg(long)]
        status: Option<Status>,
    },

    /// Show details of a bordereau
    Show {
        /// Bordereau ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish a draft so it can be signed
    Publish {
        /// Bordereau ID
        id: String,

        /// Calling user
        #[arg(long)]
        user: String,
    },

    /// Sign a bordereau for a stage
    Sign {
        /// Bordereau ID
        id: String,

        /// Signature type (emission, work, transport, reception, operation)
        #[arg(long = "type")]
        signature_type: StageKind,

        /// Calling user
        #[arg(long)]
        user: String,

        /// Name recorded on the signature (defaults to the user's name)
        #[arg(long)]
        author: Option<String>,

        /// Secret code of the organization signed on behalf of
        #[arg(long)]
        code: Option<String>,

        /// Signature date, RFC 3339 (defaults to now)
        #[arg(long)]
        date: Option<DateTime<Utc>>,
    },

    /// Check which fields are missing to sign a stage
    Check {
        /// Bordereau ID
        id: String,

        /// Signature type to check
        #[arg(long)]
        stage: StageKind,
    },

    /// Delete a bordereau that has not left the producer
    Delete {
        /// Bordereau ID
        id: String,

        /// Calling user
        #[arg(long)]
        user: String,
    },
}
