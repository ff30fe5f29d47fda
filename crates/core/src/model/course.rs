use serde::{Deserialize, Serialize};

use crate::model::ids::CourseId;
use crate::model::skill::{SkillDefinition, SkillRecord};
use crate::model::student::StudentRecord;

/// Display name used when the upstream payload has no course name.
pub const UNNAMED_COURSE: &str = "Unnamed Course";

/// Flat view of one enrolled course and the student's skills in it.
///
/// Counts are derived from `skills` on every call, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    course_id: CourseId,
    course_name: String,
    year: Option<u32>,
    skills: Vec<SkillRecord>,
}

impl CourseSummary {
    #[must_use]
    pub fn new(
        course_id: CourseId,
        course_name: Option<String>,
        year: Option<u32>,
        skills: Vec<SkillRecord>,
    ) -> Self {
        let course_name = course_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNNAMED_COURSE.to_owned());
        Self {
            course_id,
            course_name,
            year,
            skills,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    /// Academic year, only known for courses read from the legacy `Years` shape.
    #[must_use]
    pub fn year(&self) -> Option<u32> {
        self.year
    }

    #[must_use]
    pub fn skills(&self) -> &[SkillRecord] {
        &self.skills
    }

    #[must_use]
    pub fn total_skills(&self) -> usize {
        self.skills.len()
    }

    #[must_use]
    pub fn completed_skills(&self) -> usize {
        self.skills.iter().filter(|s| s.checked_off()).count()
    }

    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        percent(self.completed_skills(), self.total_skills())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_skills() > 0 && self.completed_skills() == self.total_skills()
    }
}

/// Skill counts summed across every enrolled course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTotals {
    pub total: usize,
    pub completed: usize,
}

impl ProgressTotals {
    #[must_use]
    pub fn percent(&self) -> u8 {
        percent(self.completed, self.total)
    }
}

/// Instructor-side view of a course: its catalog and its roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetail {
    pub course_id: CourseId,
    pub course_name: String,
    pub skills: Vec<SkillDefinition>,
    pub students: Vec<StudentRecord>,
    pub teachers: Vec<String>,
}

/// One student's skills in one course, as seen by an instructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentProgress {
    pub student: StudentRecord,
    pub skills: Vec<SkillRecord>,
}

impl StudentProgress {
    #[must_use]
    pub fn completed_skills(&self) -> usize {
        self.skills.iter().filter(|s| s.checked_off()).count()
    }

    #[must_use]
    pub fn total_skills(&self) -> usize {
        self.skills.len()
    }

    #[must_use]
    pub fn skill(&self, name: &str) -> Option<&SkillRecord> {
        self.skills.iter().find(|s| s.skill_name() == name)
    }

    pub fn skill_mut(&mut self, name: &str) -> Option<&mut SkillRecord> {
        self.skills.iter_mut().find(|s| s.skill_name() == name)
    }
}

/// Last fetched state of a course, owned by the screen that fetched it.
///
/// Replaced wholesale after every confirmed write; never patched speculatively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSnapshot {
    pub detail: CourseDetail,
    pub progress: Vec<StudentProgress>,
}

impl CourseSnapshot {
    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.detail.course_id
    }

    /// Emails of every student whose progress is held in this snapshot.
    #[must_use]
    pub fn tracked_emails(&self) -> Vec<String> {
        self.progress
            .iter()
            .map(|p| p.student.email().to_owned())
            .collect()
    }

    #[must_use]
    pub fn progress_for(&self, email: &str) -> Option<&StudentProgress> {
        self.progress.iter().find(|p| p.student.email() == email)
    }

    pub fn progress_for_mut(&mut self, email: &str) -> Option<&mut StudentProgress> {
        self.progress.iter_mut().find(|p| p.student.email() == email)
    }
}

/// Whole-number percentage, rounded half away from zero. Zero when `total` is zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    let scaled = (completed as f64 / total as f64) * 100.0;
    scaled.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_name_uses_placeholder() {
        let course = CourseSummary::new(CourseId::new("c1"), None, None, Vec::new());
        assert_eq!(course.course_name(), UNNAMED_COURSE);

        let blank = CourseSummary::new(CourseId::new("c2"), Some("  ".into()), None, Vec::new());
        assert_eq!(blank.course_name(), UNNAMED_COURSE);
    }

    #[test]
    fn counts_are_derived_from_skills() {
        let course = CourseSummary::new(
            CourseId::new("c1"),
            Some("A".into()),
            None,
            vec![
                SkillRecord::completed("s1"),
                SkillRecord::pending("s2"),
                SkillRecord::pending("s3"),
            ],
        );
        assert_eq!(course.total_skills(), 3);
        assert_eq!(course.completed_skills(), 1);
        assert_eq!(course.progress_percent(), 33);
        assert!(!course.is_complete());
    }

    #[test]
    fn percent_rounds_and_handles_empty() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(21, 44), 48);
        assert_eq!(percent(5, 5), 100);
    }
}
