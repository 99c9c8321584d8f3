//! Command-line interface definition for Learnmap
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for authentication, listing materials and sessions,
//! creating sessions, and the interactive workspace.

use clap::{Parser, Subcommand};

/// Learnmap - learning sessions and prerequisite maps from the terminal
///
/// Attach uploaded materials to a learning session and explore the
/// prerequisite tree the server generates for it.
#[derive(Parser, Debug, Clone)]
#[command(name = "learnmap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "LEARNMAP_CONFIG", default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the server base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Credential profile to use
    #[arg(long)]
    pub profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to stderr as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Learnmap
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and store the credential
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password; prompted for when omitted
        #[arg(short, long, env = "LEARNMAP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and store the credential
    Signup {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Password; prompted for when omitted
        #[arg(short, long, env = "LEARNMAP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Invalidate the session server-side and forget the local credential
    Logout,

    /// Show whether a credential is stored
    Status,

    /// List uploaded materials
    Materials {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage learning sessions
    Sessions {
        /// Session subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Interactive workspace: select materials, create and browse sessions
    Workspace,
}

/// Learning session subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List sessions
    List {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a session and its prerequisite tree
    Show {
        /// Session id
        id: i64,

        /// Print raw JSON instead of the tree outline
        #[arg(long)]
        json: bool,
    },

    /// Create a session from uploaded materials
    Create {
        /// Session title
        #[arg(short, long)]
        title: String,

        /// Learning objective
        #[arg(short, long)]
        objective: Option<String>,

        /// Material id to attach (repeatable)
        #[arg(short, long = "material", value_name = "ID")]
        materials: Vec<i64>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
