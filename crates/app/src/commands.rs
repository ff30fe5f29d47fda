use std::io::{self, Write};

use gateway::ConfigError;
use services::{AppServices, ServiceError};
use skilltrack_core::StatusFilter;
use skilltrack_core::model::{CheckoffRequest, CourseId, TemplateId};
use ui::vm::{
    CourseListVm, RosterVm, SkillListVm, load_checkoff_form, load_course_list,
    load_my_course_skills, load_profile, load_roster, load_student_skills, load_templates,
};
use ui::{EmptyState, ViewError, ViewState};

use crate::cli::{ArgsError, Command};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Args(#[from] ArgsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{}", .0.message())]
    View(ViewError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ViewError> for AppError {
    fn from(err: ViewError) -> Self {
        Self::View(err)
    }
}

impl AppError {
    /// Process exit code: 2 for usage problems, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Args(_) => 2,
            _ => 1,
        }
    }
}

/// `Ready` yields the value, `Empty` yields `None`, `Error` fails.
fn settle<T>(state: ViewState<T>) -> Result<Option<T>, AppError> {
    match state {
        ViewState::Ready(value) => Ok(Some(value)),
        ViewState::Error(err) => Err(AppError::View(err)),
        ViewState::Idle | ViewState::Loading | ViewState::Empty => Ok(None),
    }
}

fn write_empty(out: &mut impl Write, empty: EmptyState) -> io::Result<()> {
    writeln!(out, "{}", empty.title)?;
    writeln!(out, "  {}", empty.detail)
}

/// Run one command against `services`, writing its report to `out`.
///
/// # Errors
///
/// Returns `AppError` when a load or write fails.
pub async fn run(
    command: Command,
    services: &AppServices,
    out: &mut impl Write,
) -> Result<(), AppError> {
    match command {
        Command::Profile => {
            let Some(profile) = settle(load_profile(&services.courses()).await)? else {
                return Ok(());
            };
            writeln!(out, "{} <{}>", profile.display_name, profile.email)?;
            writeln!(out, "Roles: {}", profile.roles_label)?;
            writeln!(
                out,
                "{} across {} course(s) ({}%)",
                profile.totals_label, profile.course_count, profile.percent
            )?;
        }
        Command::Courses { search, year } => {
            let mut list =
                settle(load_course_list(&services.courses()).await)?.unwrap_or_default();
            list.set_search(search);
            list.set_year(year);
            write_courses(out, &list)?;
        }
        Command::Skills {
            course_id,
            status,
            search,
        } => match settle(load_my_course_skills(&services.courses(), &course_id).await)? {
            Some(skills) => write_skills(out, skills, status, search)?,
            None => writeln!(out, "Not enrolled in {course_id}")?,
        },
        Command::Roster { search } => {
            let mut roster = settle(load_roster(&services.rosters()).await)?.unwrap_or_default();
            roster.set_search(search);
            write_roster(out, &roster)?;
        }
        Command::Student {
            course_id,
            email,
            status,
            search,
        } => {
            let state = load_student_skills(&services.courses(), &course_id, &email).await;
            let skills = settle(state)?
                .unwrap_or_else(|| SkillListVm::new(email, Vec::new()).for_instructor());
            write_skills(out, skills, status, search)?;
        }
        Command::Checkoff {
            course_id,
            skill,
            students,
        } => checkoff(services, &course_id, skill, &students, out).await?,
        Command::AddStudent { course_id, email } => {
            let outcome = services.enrollment().add_student(&course_id, &email).await?;
            writeln!(out, "Added {} to {}", outcome.student_email, outcome.course_id)?;
            match outcome.detail {
                Some(detail) => writeln!(out, "{} student(s) enrolled", detail.students.len())?,
                None => writeln!(out, "Roster could not be refreshed")?,
            }
        }
        Command::Templates => {
            let Some(picker) = settle(load_templates(&services.templates()).await)? else {
                return Ok(write_empty(
                    out,
                    EmptyState {
                        title: "No templates found",
                        detail: "No course templates available",
                    },
                )?);
            };
            for option in picker.options() {
                writeln!(out, "{}  {}", option.id, option.label)?;
            }
        }
        Command::CreateCourse { template_id } => create_course(services, &template_id, out).await?,
        Command::Token => {
            let token = services.identity().identity_token().await?;
            writeln!(out, "{}", token.qr_payload())?;
        }
    }
    Ok(())
}

fn write_courses(out: &mut impl Write, list: &CourseListVm) -> io::Result<()> {
    let cards = list.visible();
    if cards.is_empty() {
        return write_empty(out, list.empty_state());
    }
    for card in cards {
        let mark = if card.complete { "*" } else { " " };
        writeln!(
            out,
            "{mark} {} [{}]  {} ({}%)",
            card.name, card.course_id, card.progress_label, card.percent
        )?;
    }
    Ok(())
}

fn write_skills(
    out: &mut impl Write,
    mut skills: SkillListVm,
    status: StatusFilter,
    search: String,
) -> io::Result<()> {
    skills.set_status(status);
    skills.set_search(search);
    writeln!(out, "{}  {}", skills.title(), skills.progress_label())?;

    let rows = skills.visible();
    if rows.is_empty() {
        return write_empty(out, skills.empty_state());
    }
    for row in rows {
        let mark = if row.checked_off { "x" } else { " " };
        writeln!(out, "[{mark}] {}", row.name)?;
        if let Some(attribution) = row.attribution {
            writeln!(out, "      {attribution}")?;
        }
    }
    Ok(())
}

fn write_roster(out: &mut impl Write, roster: &RosterVm) -> io::Result<()> {
    let rows = roster.visible();
    if rows.is_empty() {
        return write_empty(out, roster.empty_state());
    }
    for row in rows {
        writeln!(out, "{} <{}>  {}", row.display_name, row.email, row.courses_label)?;
    }
    Ok(())
}

async fn checkoff(
    services: &AppServices,
    course_id: &CourseId,
    skill: String,
    students: &[String],
    out: &mut impl Write,
) -> Result<(), AppError> {
    let request = CheckoffRequest::new(course_id.clone(), skill, students)
        .map_err(|e| ViewError::Validation(e.to_string()))?;

    let actor = services.courses().profile().await?.email;
    let Some(mut form) = settle(load_checkoff_form(services, course_id, &actor).await)? else {
        return Ok(());
    };

    form.select_skill(request.skill_name());
    for email in request.student_emails() {
        if !form.students().iter().any(|row| &row.email == email) {
            tracing::warn!(%email, course = %course_id, "checking off a student outside the roster");
        }
        form.toggle_student(email);
    }

    let message = form.submit().await?;
    writeln!(out, "{message}")?;
    if let Some(notice) = form.notice() {
        writeln!(out, "{notice}")?;
    }
    Ok(())
}

async fn create_course(
    services: &AppServices,
    template_id: &TemplateId,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let profile = services.templates().create_course(Some(template_id)).await?;
    writeln!(out, "Created course from {template_id}")?;
    match profile {
        Some(profile) => writeln!(out, "Teaching {} course(s)", profile.teaching.len())?,
        None => writeln!(out, "Profile could not be refreshed")?,
    }
    Ok(())
}
