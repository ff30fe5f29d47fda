use std::fmt;

use skilltrack_core::StatusFilter;
use skilltrack_core::model::{CourseId, TemplateId};

use crate::config::Overrides;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingCommand,
    UnknownCommand(String),
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    UnsupportedFlag { flag: &'static str, command: &'static str },
    InvalidValue { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingCommand => write!(f, "missing subcommand"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnsupportedFlag { flag, command } => {
                write!(f, "{flag} is not supported by {command}")
            }
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  skilltrack profile");
    eprintln!("  skilltrack courses [--search <text>] [--year <n>]");
    eprintln!("  skilltrack skills <course-id> [--status all|complete|incomplete] [--search <text>]");
    eprintln!("  skilltrack roster [--search <text>]");
    eprintln!("  skilltrack student <course-id> <email> [--status ...] [--search <text>]");
    eprintln!("  skilltrack checkoff <course-id> <skill> <email>...");
    eprintln!("  skilltrack add-student <course-id> <email>");
    eprintln!("  skilltrack templates");
    eprintln!("  skilltrack create-course <template-id>");
    eprintln!("  skilltrack token");
    eprintln!();
    eprintln!("Global flags:");
    eprintln!("  --base-url <url>   overrides SKILLTRACK_API_BASE_URL");
    eprintln!("  --token <token>    overrides SKILLTRACK_ID_TOKEN");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SKILLTRACK_API_BASE_URL, SKILLTRACK_ID_TOKEN,");
    eprintln!("  SKILLTRACK_REQUEST_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Profile,
    Courses {
        search: String,
        year: Option<u32>,
    },
    Skills {
        course_id: CourseId,
        status: StatusFilter,
        search: String,
    },
    Roster {
        search: String,
    },
    Student {
        course_id: CourseId,
        email: String,
        status: StatusFilter,
        search: String,
    },
    Checkoff {
        course_id: CourseId,
        skill: String,
        students: Vec<String>,
    },
    AddStudent {
        course_id: CourseId,
        email: String,
    },
    Templates,
    CreateCourse {
        template_id: TemplateId,
    },
    Token,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub overrides: Overrides,
}

#[derive(Default)]
struct RawArgs {
    positionals: Vec<String>,
    search: Option<String>,
    year: Option<u32>,
    status: Option<StatusFilter>,
    overrides: Overrides,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_status(raw: &str) -> Option<StatusFilter> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "all" => Some(StatusFilter::All),
        "complete" => Some(StatusFilter::Complete),
        "incomplete" => Some(StatusFilter::Incomplete),
        _ => None,
    }
}

impl RawArgs {
    fn collect(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut raw = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--base-url" => raw.overrides.base_url = Some(require_value(args, "--base-url")?),
                "--token" => raw.overrides.token = Some(require_value(args, "--token")?),
                "--search" => raw.search = Some(require_value(args, "--search")?),
                "--year" => {
                    let value = require_value(args, "--year")?;
                    let year = value.trim().parse().map_err(|_| ArgsError::InvalidValue {
                        flag: "--year",
                        raw: value.clone(),
                    })?;
                    raw.year = Some(year);
                }
                "--status" => {
                    let value = require_value(args, "--status")?;
                    raw.status = Some(parse_status(&value).ok_or(ArgsError::InvalidValue {
                        flag: "--status",
                        raw: value.clone(),
                    })?);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => raw.positionals.push(arg),
            }
        }
        Ok(raw)
    }

    fn reject_unused(
        &self,
        command: &'static str,
        search: bool,
        year: bool,
        status: bool,
    ) -> Result<(), ArgsError> {
        let unused = [
            (self.search.is_some() && !search, "--search"),
            (self.year.is_some() && !year, "--year"),
            (self.status.is_some() && !status, "--status"),
        ];
        match unused.into_iter().find(|(hit, _)| *hit) {
            Some((_, flag)) => Err(ArgsError::UnsupportedFlag { flag, command }),
            None => Ok(()),
        }
    }

    fn take_positional(&mut self, name: &'static str) -> Result<String, ArgsError> {
        if self.positionals.is_empty() {
            return Err(ArgsError::MissingArgument { name });
        }
        Ok(self.positionals.remove(0))
    }

    fn course_id(&mut self) -> Result<CourseId, ArgsError> {
        let raw = self.take_positional("course-id")?;
        raw.parse()
            .map_err(|_| ArgsError::InvalidValue { flag: "<course-id>", raw })
    }

    fn finish(self) -> Result<Overrides, ArgsError> {
        match self.positionals.into_iter().next() {
            Some(extra) => Err(ArgsError::UnknownArg(extra)),
            None => Ok(self.overrides),
        }
    }
}

impl Invocation {
    /// Parse arguments after the program name.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown subcommands or flags, missing values
    /// and malformed ids.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        let name = args.next().ok_or(ArgsError::MissingCommand)?;
        let mut raw = RawArgs::collect(&mut args)?;

        let command = match name.as_str() {
            "profile" => {
                raw.reject_unused("profile", false, false, false)?;
                Command::Profile
            }
            "courses" => {
                raw.reject_unused("courses", true, true, false)?;
                Command::Courses {
                    search: raw.search.take().unwrap_or_default(),
                    year: raw.year,
                }
            }
            "skills" => {
                raw.reject_unused("skills", true, false, true)?;
                Command::Skills {
                    course_id: raw.course_id()?,
                    status: raw.status.unwrap_or_default(),
                    search: raw.search.take().unwrap_or_default(),
                }
            }
            "roster" => {
                raw.reject_unused("roster", true, false, false)?;
                Command::Roster {
                    search: raw.search.take().unwrap_or_default(),
                }
            }
            "student" => {
                raw.reject_unused("student", true, false, true)?;
                Command::Student {
                    course_id: raw.course_id()?,
                    email: raw.take_positional("email")?,
                    status: raw.status.unwrap_or_default(),
                    search: raw.search.take().unwrap_or_default(),
                }
            }
            "checkoff" => {
                raw.reject_unused("checkoff", false, false, false)?;
                let course_id = raw.course_id()?;
                let skill = raw.take_positional("skill")?;
                let students = std::mem::take(&mut raw.positionals);
                Command::Checkoff {
                    course_id,
                    skill,
                    students,
                }
            }
            "add-student" => {
                raw.reject_unused("add-student", false, false, false)?;
                Command::AddStudent {
                    course_id: raw.course_id()?,
                    email: raw.take_positional("email")?,
                }
            }
            "templates" => {
                raw.reject_unused("templates", false, false, false)?;
                Command::Templates
            }
            "create-course" => {
                raw.reject_unused("create-course", false, false, false)?;
                let template = raw.take_positional("template-id")?;
                let template_id = template
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue { flag: "<template-id>", raw: template })?;
                Command::CreateCourse { template_id }
            }
            "token" => {
                raw.reject_unused("token", false, false, false)?;
                Command::Token
            }
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        Ok(Self {
            command,
            overrides: raw.finish()?,
        })
    }
}
