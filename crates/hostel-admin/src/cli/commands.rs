//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::ReportRange;

/// Dashboard command arguments.
#[derive(Debug, Args)]
pub struct DashboardCommand {
    /// Report range shown in the download section
    #[arg(short, long, value_enum)]
    pub range: Option<ReportRangeArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Login command arguments.
#[derive(Args)]
pub struct LoginCommand {
    /// Admin login name
    #[arg(short, long)]
    pub admin_id: String,

    /// Password (read from stdin when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Whoami command arguments.
#[derive(Debug, Args)]
pub struct WhoamiCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Submitted form commands.
#[derive(Debug, Subcommand)]
pub enum FormsCommand {
    /// List submitted forms
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Delete a submitted form
    Delete {
        /// Form identifier
        id: i64,
    },
}

/// Teacher account commands.
#[derive(Debug, Subcommand)]
pub enum TeachersCommand {
    /// List teacher accounts
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Add a teacher account
    Add(AccountArgs),

    /// Delete a teacher account
    Delete {
        /// Teacher identifier
        id: i64,
    },
}

/// Admin account commands.
#[derive(Debug, Subcommand)]
pub enum AdminsCommand {
    /// List admin accounts
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Add an admin account
    Add(AccountArgs),

    /// Delete an admin account
    Delete {
        /// Admin identifier
        id: i64,
    },
}

/// Name and password for a new account.
#[derive(Args)]
pub struct AccountArgs {
    /// Display and login name
    #[arg(short, long)]
    pub name: String,

    /// Password (read from stdin when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("admin_id", &self.admin_id)
            .field("password", &redacted(self.password.as_deref()))
            .finish()
    }
}

impl fmt::Debug for AccountArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountArgs")
            .field("name", &self.name)
            .field("password", &redacted(self.password.as_deref()))
            .finish()
    }
}

/// Stand-in shown by `Debug` for a secret that was supplied.
pub(crate) fn redacted(secret: Option<&str>) -> Option<&'static str> {
    secret.map(|_| "<redacted>")
}

/// Report export commands.
#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Print the export URL for a range
    Url {
        /// Report range (defaults to the configured range)
        #[arg(value_enum)]
        range: Option<ReportRangeArg>,
    },

    /// Download the exported report
    Download {
        /// Report range (defaults to the configured range)
        #[arg(value_enum)]
        range: Option<ReportRangeArg>,

        /// Directory to write the report into
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Report range argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportRangeArg {
    /// The last seven days
    Weekly,
    /// The last month
    Monthly,
    /// The last year
    Yearly,
}

impl From<ReportRangeArg> for ReportRange {
    fn from(arg: ReportRangeArg) -> Self {
        match arg {
            ReportRangeArg::Weekly => Self::Weekly,
            ReportRangeArg::Monthly => Self::Monthly,
            ReportRangeArg::Yearly => Self::Yearly,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_range_arg_conversion() {
        assert_eq!(ReportRange::from(ReportRangeArg::Weekly), ReportRange::Weekly);
        assert_eq!(ReportRange::from(ReportRangeArg::Monthly), ReportRange::Monthly);
        assert_eq!(ReportRange::from(ReportRangeArg::Yearly), ReportRange::Yearly);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_account_args_debug_has_name() {
        let args = AccountArgs {
            name: "Meera".to_string(),
            password: None,
        };
        assert!(format!("{args:?}").contains("Meera"));
    }

    #[test]
    fn test_account_args_debug_redacts_password() {
        let args = AccountArgs {
            name: "Meera".to_string(),
            password: Some("hunter2".to_string()),
        };
        let shown = format!("{args:?}");
        assert!(shown.contains("Meera"));
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_login_command_debug_redacts_password() {
        let cmd = LoginCommand {
            admin_id: "Paul".to_string(),
            password: Some("hunter2".to_string()),
        };
        let shown = format!("{cmd:?}");
        assert!(shown.contains("Paul"));
        assert!(!shown.contains("hunter2"));

        let cmd = LoginCommand {
            admin_id: "Paul".to_string(),
            password: None,
        };
        assert!(format!("{cmd:?}").contains("None"));
    }
}
