use services::CourseService;
use skilltrack_core::model::{CourseId, SkillRecord};
use skilltrack_core::{StatusFilter, filter_skills};

use crate::state::{EmptyState, SEARCH_MISS, ViewError, ViewState};
use crate::vm::course_list_vm::progress_label;
use crate::vm::time_fmt::format_checkoff_date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillRowVm {
    pub name: String,
    pub description: Option<String>,
    pub checked_off: bool,
    pub status_label: &'static str,
    /// `"Checked off by prof@x.com on Feb 1, 2026"` when known.
    pub attribution: Option<String>,
}

impl From<&SkillRecord> for SkillRowVm {
    fn from(skill: &SkillRecord) -> Self {
        Self {
            name: skill.skill_name().to_owned(),
            description: skill.description().map(str::to_owned),
            checked_off: skill.checked_off(),
            status_label: if skill.checked_off() {
                "Complete"
            } else {
                "Incomplete"
            },
            attribution: attribution(skill),
        }
    }
}

fn attribution(skill: &SkillRecord) -> Option<String> {
    match (skill.checked_off_by(), skill.date_checked_off()) {
        (Some(by), Some(at)) => Some(format!(
            "Checked off by {by} on {}",
            format_checkoff_date(at)
        )),
        (Some(by), None) => Some(format!("Checked off by {by}")),
        (None, Some(at)) => Some(format!("Checked off on {}", format_checkoff_date(at))),
        (None, None) => None,
    }
}

/// Skills of one course, for a student or for an instructor viewing one student.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillListVm {
    title: String,
    skills: Vec<SkillRecord>,
    status: StatusFilter,
    search: String,
    instructor: bool,
}

impl SkillListVm {
    #[must_use]
    pub fn new(title: impl Into<String>, skills: Vec<SkillRecord>) -> Self {
        Self {
            title: title.into(),
            skills,
            status: StatusFilter::All,
            search: String::new(),
            instructor: false,
        }
    }

    /// The same list as seen by an instructor looking at one student.
    #[must_use]
    pub fn for_instructor(mut self) -> Self {
        self.instructor = true;
        self
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn status(&self) -> StatusFilter {
        self.status
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.status = status;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Counts over all skills, independent of the active filter.
    #[must_use]
    pub fn progress_label(&self) -> String {
        let completed = self.skills.iter().filter(|s| s.checked_off()).count();
        progress_label(completed, self.skills.len())
    }

    #[must_use]
    pub fn visible(&self) -> Vec<SkillRowVm> {
        filter_skills(&self.skills, self.status, &self.search)
            .iter()
            .map(SkillRowVm::from)
            .collect()
    }

    #[must_use]
    pub fn empty_state(&self) -> EmptyState {
        let detail = if !self.search.trim().is_empty() {
            SEARCH_MISS
        } else {
            match self.status {
                StatusFilter::Complete => "No complete skills",
                StatusFilter::Incomplete => "All skills are complete!",
                StatusFilter::All if self.instructor => "No skills in this view",
                StatusFilter::All => "No skills available",
            }
        };
        EmptyState {
            title: "No skills found",
            detail,
        }
    }
}

/// Skills of one of the signed-in student's courses. `Empty` if not enrolled.
pub async fn load_my_course_skills(
    courses: &CourseService,
    course_id: &CourseId,
) -> ViewState<SkillListVm> {
    match courses.my_course(course_id).await {
        Ok(Some(course)) => ViewState::Ready(SkillListVm::new(
            course.course_name(),
            course.skills().to_vec(),
        )),
        Ok(None) => ViewState::Empty,
        Err(err) => ViewState::Error(ViewError::from(err)),
    }
}

/// Skills of one student in a course the instructor teaches.
pub async fn load_student_skills(
    courses: &CourseService,
    course_id: &CourseId,
    email: &str,
) -> ViewState<SkillListVm> {
    ViewState::from_result(courses.student_skills(course_id, email).await, Vec::is_empty)
        .map(|skills| SkillListVm::new(email, skills).for_instructor())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm() -> SkillListVm {
        SkillListVm::new(
            "NRS 210",
            vec![
                SkillRecord::from_parts(
                    "Handwashing",
                    None,
                    true,
                    Some("prof@x.com".into()),
                    Some("2026-02-01".into()),
                ),
                SkillRecord::pending("IV Calc"),
            ],
        )
    }

    #[test]
    fn incomplete_search() {
        let mut vm = vm();
        vm.set_status(StatusFilter::Incomplete);
        vm.set_search("iv");
        let rows = vm.visible();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "IV Calc");
        assert_eq!(rows[0].status_label, "Incomplete");
    }

    #[test]
    fn attribution_is_formatted() {
        let rows = vm().visible();
        assert_eq!(
            rows[0].attribution.as_deref(),
            Some("Checked off by prof@x.com on Feb 1, 2026")
        );
        assert_eq!(rows[1].attribution, None);
    }

    #[test]
    fn empty_messages_follow_the_filter() {
        let mut vm = SkillListVm::new("Done", vec![SkillRecord::completed("a")]);
        vm.set_status(StatusFilter::Incomplete);
        assert!(vm.visible().is_empty());
        assert_eq!(vm.empty_state().detail, "All skills are complete!");

        let mut vm = SkillListVm::new("Fresh", vec![SkillRecord::pending("a")]);
        vm.set_status(StatusFilter::Complete);
        assert_eq!(vm.empty_state().detail, "No complete skills");
        vm.set_search("x");
        assert_eq!(vm.empty_state().detail, "Try adjusting your search");

        let vm = SkillListVm::new("a@x.com", Vec::new()).for_instructor();
        assert_eq!(vm.empty_state().detail, "No skills in this view");
    }

    #[test]
    fn progress_ignores_filter() {
        let mut vm = vm();
        vm.set_status(StatusFilter::Complete);
        assert_eq!(vm.progress_label(), "1/2 skills complete");
    }
}
