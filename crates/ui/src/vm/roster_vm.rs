use services::RosterService;
use skilltrack_core::filter_students;
use skilltrack_core::model::StudentRecord;

use crate::state::{EmptyState, SEARCH_MISS, ViewState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudentRowVm {
    pub email: String,
    pub display_name: String,
    pub courses_label: String,
}

impl From<&StudentRecord> for StudentRowVm {
    fn from(student: &StudentRecord) -> Self {
        Self {
            email: student.email().to_owned(),
            display_name: student.display_name(),
            courses_label: format!("{} course(s)", student.courses().len()),
        }
    }
}

/// The instructor's merged student list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RosterVm {
    students: Vec<StudentRecord>,
    search: String,
}

impl RosterVm {
    #[must_use]
    pub fn new(students: Vec<StudentRecord>) -> Self {
        Self {
            students,
            search: String::new(),
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    #[must_use]
    pub fn visible(&self) -> Vec<StudentRowVm> {
        filter_students(&self.students, &self.search)
            .iter()
            .map(StudentRowVm::from)
            .collect()
    }

    #[must_use]
    pub fn empty_state(&self) -> EmptyState {
        EmptyState {
            title: "No students found",
            detail: if self.search.trim().is_empty() {
                "No students enrolled"
            } else {
                SEARCH_MISS
            },
        }
    }
}

pub async fn load_roster(rosters: &RosterService) -> ViewState<RosterVm> {
    ViewState::from_result(rosters.my_students().await, Vec::is_empty).map(RosterVm::new)
}
