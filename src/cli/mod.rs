//! CLI module - command-line interface for Rolodex
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Rolodex - contact book API server
#[derive(Parser)]
#[command(name = "rolodex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Validate the configuration and check the database is reachable
    #[command(alias = "check")]
    CheckConfig,

    /// Create a user without going through the API
    CreateUser {
        /// Login name, must be unique
        #[arg(long)]
        username: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Password; there is no default
        #[arg(long, env = "ROLODEX_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

pub use commands::*;
