use services::CourseService;
use skilltrack_core::model::UserProfile;

use crate::state::ViewState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileVm {
    pub display_name: String,
    pub email: String,
    pub roles_label: String,
    pub is_instructor: bool,
    pub course_count: usize,
    pub percent: u8,
    /// `"3 of 5 skills completed"`.
    pub totals_label: String,
}

impl From<&UserProfile> for ProfileVm {
    fn from(profile: &UserProfile) -> Self {
        let totals = profile.progress();
        Self {
            display_name: profile.display_name(),
            email: profile.email.clone(),
            roles_label: profile
                .roles
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            is_instructor: profile.is_instructor(),
            course_count: profile.courses.len(),
            percent: totals.percent(),
            totals_label: format!("{} of {} skills completed", totals.completed, totals.total),
        }
    }
}

pub async fn load_profile(courses: &CourseService) -> ViewState<ProfileVm> {
    ViewState::from_result(courses.profile().await, |_| false).map(|p| ProfileVm::from(&p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilltrack_core::model::{CourseId, CourseSummary, Role, SkillRecord};

    #[test]
    fn totals_span_courses() {
        let profile = UserProfile {
            email: "a@x.com".into(),
            first_name: Some("Ana".into()),
            last_name: None,
            roles: vec![Role::Student],
            teaching: Vec::new(),
            courses: vec![
                CourseSummary::new(
                    CourseId::new("c1"),
                    None,
                    None,
                    vec![SkillRecord::completed("a"), SkillRecord::pending("b")],
                ),
                CourseSummary::new(
                    CourseId::new("c2"),
                    None,
                    None,
                    vec![SkillRecord::completed("c")],
                ),
            ],
        };
        let vm = ProfileVm::from(&profile);

        assert_eq!(vm.display_name, "Ana");
        assert_eq!(vm.roles_label, "Student");
        assert_eq!(vm.totals_label, "2 of 3 skills completed");
        assert_eq!(vm.percent, 67);
        assert!(!vm.is_instructor);
    }
}
