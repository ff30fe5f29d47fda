use services::CourseService;
use skilltrack_core::filter_courses;
use skilltrack_core::model::{CourseId, CourseSummary};

use crate::state::{EmptyState, SEARCH_MISS, ViewState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseCardVm {
    pub course_id: CourseId,
    pub name: String,
    pub progress_label: String,
    pub percent: u8,
    pub complete: bool,
}

impl From<&CourseSummary> for CourseCardVm {
    fn from(course: &CourseSummary) -> Self {
        Self {
            course_id: course.course_id().clone(),
            name: course.course_name().to_owned(),
            progress_label: progress_label(course.completed_skills(), course.total_skills()),
            percent: course.progress_percent(),
            complete: course.is_complete(),
        }
    }
}

/// `"3/5 skills complete"`.
#[must_use]
pub fn progress_label(completed: usize, total: usize) -> String {
    format!("{completed}/{total} skills complete")
}

/// The student's course list with search and an optional year filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CourseListVm {
    courses: Vec<CourseSummary>,
    search: String,
    year: Option<u32>,
}

impl CourseListVm {
    #[must_use]
    pub fn new(courses: Vec<CourseSummary>) -> Self {
        Self {
            courses,
            ..Self::default()
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_year(&mut self, year: Option<u32>) {
        self.year = year;
    }

    /// Distinct years present, ascending.
    #[must_use]
    pub fn years(&self) -> Vec<u32> {
        let mut years: Vec<u32> = self.courses.iter().filter_map(CourseSummary::year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    #[must_use]
    pub fn visible(&self) -> Vec<CourseCardVm> {
        filter_courses(&self.courses, &self.search, self.year)
            .iter()
            .map(CourseCardVm::from)
            .collect()
    }

    #[must_use]
    pub fn empty_state(&self) -> EmptyState {
        EmptyState {
            title: "No courses found!",
            detail: if self.search.trim().is_empty() {
                "No courses available"
            } else {
                SEARCH_MISS
            },
        }
    }
}

/// Load the signed-in student's courses.
pub async fn load_course_list(courses: &CourseService) -> ViewState<CourseListVm> {
    ViewState::from_result(courses.my_courses().await, Vec::is_empty).map(CourseListVm::new)
}
