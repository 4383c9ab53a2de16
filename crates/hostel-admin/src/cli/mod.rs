//! Command-line interface for hostel-admin.
//!
//! This module provides the CLI structure for the `hosteladm` binary.

mod commands;

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AccountArgs, AdminsCommand, ConfigCommand, DashboardCommand, FormsCommand, LoginCommand,
    OutputFormat, ReportCommand, ReportRangeArg, TeachersCommand, WhoamiCommand,
};

/// hosteladm - Admin dashboard for hostel inspection reports
///
/// View and prune submitted forms, manage teacher accounts, and export
/// reports from the hostel report service.
#[derive(Parser)]
#[command(name = "hosteladm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Report service URL, overriding the configuration
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Admin token, overriding the stored token
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show forms, teachers and the report link together
    Dashboard(DashboardCommand),

    /// Log in as an admin and store the token
    Login(LoginCommand),

    /// Forget the stored token
    Logout,

    /// Show who the stored token belongs to
    Whoami(WhoamiCommand),

    /// Manage submitted forms
    #[command(subcommand)]
    Forms(FormsCommand),

    /// Manage teacher accounts
    #[command(subcommand)]
    Teachers(TeachersCommand),

    /// Manage admin accounts
    #[command(subcommand)]
    Admins(AdminsCommand),

    /// Export reports
    #[command(subcommand)]
    Report(ReportCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("config", &self.config)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("base_url", &self.base_url)
            .field("token", &commands::redacted(self.token.as_deref()))
            .field("command", &self.command)
            .finish()
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
