//! The admin dashboard.
//!
//! [`Dashboard`] holds a disposable in-memory copy of the forms and teachers
//! owned by the report service, plus the small amount of UI state the admin
//! edits: the new-teacher draft and the selected report range.
//!
//! Every operation maps one user action to one request. Failures are logged
//! and otherwise ignored: no retry, no notice, and the cached lists are left
//! as they were. Operations return `true` when the request succeeded.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::client::AdminApi;
use crate::error::{Error, Result};
use crate::model::{FormSubmission, NewTeacher, Report, ReportRange, Teacher};
use crate::notify::Notifier;
use crate::token;

/// Notice shown after a teacher is created.
pub const TEACHER_ADDED: &str = "Teacher added successfully!";
/// Notice shown after a teacher is deleted.
pub const TEACHER_DELETED: &str = "Teacher deleted successfully";
/// Notice shown after a form is deleted.
pub const FORM_DELETED: &str = "Form deleted successfully!";

/// Dashboard state and operations.
#[derive(Debug)]
pub struct Dashboard<A, N> {
    api: A,
    notifier: N,
    privileged_username: String,
    privileged: bool,
    forms: Vec<FormSubmission>,
    teachers: Vec<Teacher>,
    draft: NewTeacher,
    range: ReportRange,
}

impl<A: AdminApi, N: Notifier> Dashboard<A, N> {
    /// Create an empty dashboard.
    ///
    /// `privileged_username` is the login whose token unlocks the form
    /// delete actions.
    pub fn new(api: A, notifier: N, privileged_username: impl Into<String>) -> Self {
        Self {
            api,
            notifier,
            privileged_username: privileged_username.into(),
            privileged: false,
            forms: Vec::new(),
            teachers: Vec::new(),
            draft: NewTeacher::default(),
            range: ReportRange::default(),
        }
    }

    /// Initial load: fetch forms, fetch teachers, derive the privileged flag.
    ///
    /// Both fetches are attempted even if the first fails. Returns whether
    /// both succeeded.
    pub async fn load(&mut self, token: Option<&str>) -> bool {
        let forms_ok = self.refresh_forms().await;
        let teachers_ok = self.refresh_teachers().await;
        self.check_privileged(token);
        forms_ok && teachers_ok
    }

    /// Derive the privileged flag from the token's `username` claim.
    pub fn check_privileged(&mut self, token: Option<&str>) {
        self.privileged = token::is_privileged(token, &self.privileged_username);
        debug!(privileged = self.privileged, "Checked token privileges");
    }

    /// Replace the cached forms with a fresh copy from the service.
    pub async fn refresh_forms(&mut self) -> bool {
        match self.api.list_forms().await {
            Ok(forms) => {
                debug!("Fetched {} forms", forms.len());
                self.forms = forms;
                true
            }
            Err(e) => {
                error!("Error fetching forms: {e}");
                false
            }
        }
    }

    /// Replace the cached teachers with a fresh copy from the service.
    pub async fn refresh_teachers(&mut self) -> bool {
        match self.api.list_teachers().await {
            Ok(teachers) => {
                debug!("Fetched {} teachers", teachers.len());
                self.teachers = teachers;
                true
            }
            Err(e) => {
                error!("Error fetching teachers: {e}");
                false
            }
        }
    }

    /// Submit the new-teacher draft.
    ///
    /// On success the draft is cleared and the teacher list re-fetched. An
    /// incomplete draft is rejected without calling the service.
    pub async fn add_teacher(&mut self) -> bool {
        if let Err(e) = self.draft.validate() {
            warn!("Not adding teacher: {e}");
            return false;
        }

        match self.api.add_teacher(&self.draft).await {
            Ok(()) => {
                info!("Added teacher {}", self.draft.name);
                self.notifier.notify(TEACHER_ADDED);
                self.draft = NewTeacher::default();
                self.refresh_teachers().await;
                true
            }
            Err(e) => {
                error!("Error adding teacher: {e}");
                false
            }
        }
    }

    /// Delete a teacher and drop it from the cached list.
    pub async fn delete_teacher(&mut self, id: i64) -> bool {
        match self.api.delete_teacher(id).await {
            Ok(()) => {
                info!("Deleted teacher {id}");
                self.teachers.retain(|t| t.id != id);
                self.notifier.notify(TEACHER_DELETED);
                true
            }
            Err(e) => {
                error!("Error deleting teacher: {e}");
                false
            }
        }
    }

    /// Delete a form and re-fetch the form list.
    ///
    /// The privileged flag only decides whether the dashboard *offers* this
    /// action; the service decides whether it is allowed.
    pub async fn delete_form(&mut self, id: i64) -> bool {
        match self.api.delete_form(id).await {
            Ok(()) => {
                info!("Deleted form {id}");
                self.notifier.notify(FORM_DELETED);
                self.refresh_forms().await;
                true
            }
            Err(e) => {
                error!("Error deleting form: {e}");
                false
            }
        }
    }

    /// Export URL for the selected range.
    pub fn report_url(&self) -> String {
        self.api.report_url(self.range)
    }

    /// Download the report for the selected range into `dir`.
    ///
    /// Returns the path written, or `None` if anything failed.
    pub async fn download_report(&self, dir: &Path) -> Option<PathBuf> {
        let result = match self.api.download_report(self.range).await {
            Ok(report) => save_report(&report, dir),
            Err(e) => Err(e),
        };
        match result {
            Ok(path) => {
                info!("Saved {} report to {}", self.range, path.display());
                Some(path)
            }
            Err(e) => {
                error!("Error downloading {} report: {e}", self.range);
                None
            }
        }
    }

    /// Select the report range used by downloads.
    pub fn select_range(&mut self, range: ReportRange) {
        self.range = range;
    }

    /// Currently selected report range.
    pub fn range(&self) -> ReportRange {
        self.range
    }

    /// Editable new-teacher draft.
    pub fn draft_mut(&mut self) -> &mut NewTeacher {
        &mut self.draft
    }

    /// Current new-teacher draft.
    pub fn draft(&self) -> &NewTeacher {
        &self.draft
    }

    /// Cached forms.
    pub fn forms(&self) -> &[FormSubmission] {
        &self.forms
    }

    /// Cached teachers.
    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    /// Whether the delete-form actions are shown.
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// The underlying API client.
    pub fn api(&self) -> &A {
        &self.api
    }
}

/// Write a downloaded report into `dir`, creating it if needed.
///
/// The file is named after the report, so an earlier download of the same
/// range in `dir` is replaced.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_report(report: &Report, dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let path = dir.join(&report.file_name);
    std::fs::write(&path, &report.bytes)?;
    Ok(path)
}
