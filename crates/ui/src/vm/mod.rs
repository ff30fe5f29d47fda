mod checkoff_vm;
mod course_list_vm;
mod profile_vm;
mod roster_vm;
mod skill_list_vm;
mod template_vm;
mod time_fmt;

pub use checkoff_vm::{CheckoffFormVm, CheckoffStudentRowVm, load_checkoff_form};
pub use course_list_vm::{CourseCardVm, CourseListVm, load_course_list, progress_label};
pub use profile_vm::{ProfileVm, load_profile};
pub use roster_vm::{RosterVm, StudentRowVm, load_roster};
pub use skill_list_vm::{SkillListVm, SkillRowVm, load_my_course_skills, load_student_skills};
pub use template_vm::{TemplateOptionVm, TemplatePickerVm, load_templates};
pub use time_fmt::format_checkoff_date;
