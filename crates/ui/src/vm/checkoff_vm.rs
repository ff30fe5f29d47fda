use services::{AppServices, CheckoffPhase, CheckoffReconciler};
use skilltrack_core::filter_students;
use skilltrack_core::model::{CheckoffRequest, CourseId, CourseSnapshot, SkillDefinition};

use crate::state::{ViewError, ViewState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoffStudentRowVm {
    pub email: String,
    pub display_name: String,
    pub selected: bool,
    /// Whether the selected skill is already checked off for this student.
    pub has_skill: bool,
}

/// Instructor screen: pick a skill, pick students, check them off.
pub struct CheckoffFormVm {
    snapshot: CourseSnapshot,
    reconciler: CheckoffReconciler,
    selected_skill: Option<String>,
    selected_students: Vec<String>,
    search: String,
    notice: Option<String>,
}

impl CheckoffFormVm {
    #[must_use]
    pub fn new(snapshot: CourseSnapshot, reconciler: CheckoffReconciler) -> Self {
        Self {
            snapshot,
            reconciler,
            selected_skill: None,
            selected_students: Vec::new(),
            search: String::new(),
            notice: None,
        }
    }

    #[must_use]
    pub fn course_name(&self) -> &str {
        &self.snapshot.detail.course_name
    }

    #[must_use]
    pub fn skills(&self) -> &[SkillDefinition] {
        &self.snapshot.detail.skills
    }

    #[must_use]
    pub fn snapshot(&self) -> &CourseSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn selected_skill(&self) -> Option<&str> {
        self.selected_skill.as_deref()
    }

    pub fn select_skill(&mut self, skill_name: impl Into<String>) {
        self.selected_skill = Some(skill_name.into());
    }

    pub fn toggle_student(&mut self, email: &str) {
        if let Some(pos) = self.selected_students.iter().position(|e| e == email) {
            self.selected_students.remove(pos);
        } else {
            self.selected_students.push(email.to_owned());
        }
    }

    /// Select every student matching the current search.
    pub fn select_all_visible(&mut self) {
        for row in self.students() {
            if !row.selected {
                self.selected_students.push(row.email);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_students.clear();
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected_students.len()
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    #[must_use]
    pub fn students(&self) -> Vec<CheckoffStudentRowVm> {
        filter_students(&self.snapshot.detail.students, &self.search)
            .iter()
            .map(|student| CheckoffStudentRowVm {
                email: student.email().to_owned(),
                display_name: student.display_name(),
                selected: self.selected_students.iter().any(|e| e == student.email()),
                has_skill: self.has_selected_skill(student.email()),
            })
            .collect()
    }

    fn has_selected_skill(&self, email: &str) -> bool {
        let Some(skill) = self.selected_skill.as_deref() else {
            return false;
        };
        self.snapshot
            .progress_for(email)
            .and_then(|p| p.skill(skill))
            .is_some_and(|s| s.checked_off())
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.reconciler.phase() == CheckoffPhase::Submitting
    }

    /// Shown after a save whose follow-up refresh failed.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// # Errors
    ///
    /// Returns `ViewError::Validation` when no skill or no student is selected.
    pub fn build_request(&self) -> Result<CheckoffRequest, ViewError> {
        CheckoffRequest::new(
            self.snapshot.course_id().clone(),
            self.selected_skill.clone().unwrap_or_default(),
            &self.selected_students,
        )
        .map_err(|e| ViewError::Validation(e.to_string()))
    }

    /// Submit the selection. On success the selection is cleared and the
    /// confirmation message is returned.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Validation` for an incomplete selection (nothing
    /// is sent), otherwise the mapped service failure. The selection is kept
    /// on failure so the instructor can retry.
    pub async fn submit(&mut self) -> Result<String, ViewError> {
        let request = self.build_request()?;
        self.notice = None;
        let outcome = self
            .reconciler
            .submit(&request, &mut self.snapshot)
            .await
            .map_err(ViewError::from)?;

        if !outcome.refreshed {
            self.notice = Some("Saved, but the list could not be refreshed. Try again later.".into());
        }
        self.selected_students.clear();
        Ok(format!(
            "{} student(s) checked off for {}",
            outcome.students.len(),
            outcome.skill_name
        ))
    }
}

/// Load a course with every rostered student's progress and prepare the form.
pub async fn load_checkoff_form(
    services: &AppServices,
    course_id: &CourseId,
    actor: &str,
) -> ViewState<CheckoffFormVm> {
    ViewState::from_result(services.courses().roster_snapshot(course_id).await, |_| false)
        .map(|snapshot| CheckoffFormVm::new(snapshot, services.reconciler(actor)))
}
