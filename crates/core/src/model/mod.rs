mod checkoff;
mod course;
mod enrollment;
mod ids;
mod profile;
mod skill;
mod student;

pub use ids::{CourseId, ParseIdError, TemplateId};

pub use checkoff::{CheckoffRequest, CheckoffRequestError};
pub use course::{
    CourseDetail, CourseSnapshot, CourseSummary, ProgressTotals, StudentProgress, UNNAMED_COURSE,
    percent,
};
pub use enrollment::{AddStudentRequest, EnrollmentError, require_template};
pub use profile::{CourseTemplate, IdentityToken, Role, UserProfile};
pub use skill::{SkillDefinition, SkillRecord};
pub use student::StudentRecord;
