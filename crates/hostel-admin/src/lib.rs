//! `hostel-admin` - Admin dashboard for the hostel report service
//!
//! This library lists submitted inspection forms and teacher accounts, prunes
//! them, and exports reports through the service's REST API.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod model;
pub mod notify;
pub mod render;
pub mod token;

pub use client::{AdminApi, ApiClient};
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Admin, FormSubmission, Maintenance, NewTeacher, Report, ReportRange, Teacher};
pub use notify::{ConsoleNotifier, Notifier, RecordingNotifier, SilentNotifier};
pub use token::{Claims, TokenStore};
