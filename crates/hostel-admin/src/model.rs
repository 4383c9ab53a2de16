//! Record types exchanged with the report service.
//!
//! These are transient views of records owned by the remote service. None of
//! them are persisted locally.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A submitted hostel inspection form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    /// Server-assigned identifier.
    pub id: i64,

    /// Teacher who submitted the form.
    pub teacher_name: String,

    /// Teacher accompanying the submitter, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subordinate_teacher_name: Option<String>,

    /// Hostel the form is about.
    pub hostel_name: String,

    /// Creation timestamp exactly as the service sent it.
    pub created_at: String,

    /// Free-text comments.
    #[serde(default)]
    pub general_comments: Option<String>,

    /// Maintenance flag or description.
    #[serde(default)]
    pub maintenance_required: Option<Maintenance>,

    /// Complaints text.
    #[serde(default)]
    pub complaints: Option<String>,

    /// Link to an uploaded photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl FormSubmission {
    /// Parse `created_at` as either RFC 2822 (the service's HTTP-date style)
    /// or RFC 3339.
    #[must_use]
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.trim();
        DateTime::parse_from_rfc2822(raw)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }
}

/// The maintenance column holds either a yes/no flag or a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Maintenance {
    /// A yes/no answer.
    Flag(bool),
    /// A free-text description.
    Text(String),
}

impl fmt::Display for Maintenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(true) => write!(f, "Yes"),
            Self::Flag(false) => write!(f, "No"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// A teacher account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Server-assigned identifier.
    pub id: i64,
    /// Display name, also the login name.
    pub name: String,
}

/// An admin account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    /// Server-assigned identifier.
    pub id: i64,
    /// Display name, also the login name.
    pub name: String,
}

/// Credentials for a new teacher or admin account.
///
/// The password is sent once and never displayed.
#[derive(Clone, PartialEq, Eq, Default, Serialize)]
pub struct NewTeacher {
    /// Display name.
    pub name: String,
    /// Plaintext password, submitted once.
    pub password: String,
}

impl NewTeacher {
    /// Create new account credentials.
    #[must_use]
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }

    /// Both fields are required.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteDraft`] naming the first missing field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::IncompleteDraft("name is required"));
        }
        if self.password.is_empty() {
            return Err(Error::IncompleteDraft("password is required"));
        }
        Ok(())
    }

    /// Check whether both fields are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.password.is_empty()
    }
}

impl fmt::Debug for NewTeacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewTeacher")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Period covered by an exported report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportRange {
    /// The last seven days.
    #[default]
    Weekly,
    /// The last month.
    Monthly,
    /// The last year.
    Yearly,
}

impl ReportRange {
    /// All ranges, in selection order.
    pub const ALL: [Self; 3] = [Self::Weekly, Self::Monthly, Self::Yearly];

    /// Path segment used by the download endpoint.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// File name the service uses for this range.
    #[must_use]
    pub fn default_file_name(self) -> String {
        format!("report_{}.xlsx", self.as_str())
    }
}

impl fmt::Display for ReportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(Error::InvalidRange(s.to_string())),
        }
    }
}

/// A downloaded report file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Range the report covers.
    pub range: ReportRange,
    /// Suggested file name.
    pub file_name: String,
    /// MIME type reported by the service.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Body of a successful admin login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Whether the service accepted the credentials.
    #[serde(default)]
    pub success: bool,
    /// Human-readable outcome.
    #[serde(default)]
    pub message: String,
    /// Issued token, present on success.
    #[serde(default)]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_form_deserialize_full_row() {
        let json = r#"{
            "id": 7,
            "teacher_name": "Asha",
            "subordinate_teacher_name": "Ravi",
            "hostel_name": "North Block",
            "general_comments": "Clean",
            "maintenance_required": "Leaking tap",
            "complaints": null,
            "image_url": null,
            "created_at": "Tue, 15 Oct 2024 10:30:00 GMT"
        }"#;
        let form: FormSubmission = serde_json::from_str(json).unwrap();

        assert_eq!(form.id, 7);
        assert_eq!(form.hostel_name, "North Block");
        assert_eq!(form.subordinate_teacher_name.as_deref(), Some("Ravi"));
        assert_eq!(
            form.maintenance_required,
            Some(Maintenance::Text("Leaking tap".to_string()))
        );
        assert!(form.complaints.is_none());
    }

    #[test]
    fn test_form_deserialize_minimal_row() {
        let json = r#"{"id": 1, "teacher_name": "A", "hostel_name": "H", "created_at": "2024-10-15T10:30:00Z", "maintenance_required": true}"#;
        let form: FormSubmission = serde_json::from_str(json).unwrap();

        assert_eq!(form.maintenance_required, Some(Maintenance::Flag(true)));
        assert!(form.general_comments.is_none());
        assert!(form.image_url.is_none());
    }

    #[test]
    fn test_created_at_utc_rfc2822() {
        let form = FormSubmission {
            id: 1,
            teacher_name: "A".to_string(),
            subordinate_teacher_name: None,
            hostel_name: "H".to_string(),
            created_at: "Tue, 15 Oct 2024 10:30:00 GMT".to_string(),
            general_comments: None,
            maintenance_required: None,
            complaints: None,
            image_url: None,
        };
        let dt = form.created_at_utc().unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_created_at_utc_unparseable() {
        let form = FormSubmission {
            id: 1,
            teacher_name: "A".to_string(),
            subordinate_teacher_name: None,
            hostel_name: "H".to_string(),
            created_at: "yesterday".to_string(),
            general_comments: None,
            maintenance_required: None,
            complaints: None,
            image_url: None,
        };
        assert!(form.created_at_utc().is_none());
    }

    #[test]
    fn test_maintenance_display() {
        assert_eq!(Maintenance::Flag(true).to_string(), "Yes");
        assert_eq!(Maintenance::Flag(false).to_string(), "No");
        assert_eq!(Maintenance::Text("Broken fan".to_string()).to_string(), "Broken fan");
    }

    #[test]
    fn test_new_teacher_validate() {
        assert!(NewTeacher::new("Asha", "secret").validate().is_ok());
        assert!(matches!(
            NewTeacher::new("  ", "secret").validate(),
            Err(Error::IncompleteDraft("name is required"))
        ));
        assert!(matches!(
            NewTeacher::new("Asha", "").validate(),
            Err(Error::IncompleteDraft("password is required"))
        ));
    }

    #[test]
    fn test_new_teacher_debug_redacts_password() {
        let debug_str = format!("{:?}", NewTeacher::new("Asha", "hunter2"));
        assert!(debug_str.contains("Asha"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_new_teacher_serializes_both_fields() {
        let json = serde_json::to_value(NewTeacher::new("Asha", "pw")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Asha", "password": "pw"}));
    }

    #[test]
    fn test_report_range_parse() {
        assert_eq!("weekly".parse::<ReportRange>().unwrap(), ReportRange::Weekly);
        assert_eq!("Monthly".parse::<ReportRange>().unwrap(), ReportRange::Monthly);
        assert_eq!(" yearly ".parse::<ReportRange>().unwrap(), ReportRange::Yearly);
        assert!(matches!(
            "custom".parse::<ReportRange>(),
            Err(Error::InvalidRange(_))
        ));
    }

    #[test]
    fn test_report_range_display_and_file_name() {
        assert_eq!(ReportRange::Monthly.to_string(), "monthly");
        assert_eq!(ReportRange::Yearly.default_file_name(), "report_yearly.xlsx");
        assert_eq!(ReportRange::default(), ReportRange::Weekly);
    }

    #[test]
    fn test_login_response_failure_shape() {
        let json = r#"{"success": false, "message": "Invalid credentials"}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert!(resp.token.is_none());
    }
}
