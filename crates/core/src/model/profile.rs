use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::course::{CourseSummary, ProgressTotals};
use crate::model::ids::{CourseId, TemplateId};

/// Role granted to a user by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    Teacher,
    Admin,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Student" => Self::Student,
            "Teacher" => Self::Teacher,
            "Admin" => Self::Admin,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => f.write_str("Student"),
            Role::Teacher => f.write_str("Teacher"),
            Role::Admin => f.write_str("Admin"),
            Role::Other(raw) => f.write_str(raw),
        }
    }
}

/// The signed-in user with their enrolled courses flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<Role>,
    pub teaching: Vec<CourseId>,
    pub courses: Vec<CourseSummary>,
}

impl UserProfile {
    #[must_use]
    pub fn is_instructor(&self) -> bool {
        self.roles
            .iter()
            .any(|role| matches!(role, Role::Teacher | Role::Admin))
    }

    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// `first last`, or the email when neither name is known.
    #[must_use]
    pub fn display_name(&self) -> String {
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self.email.clone()
        } else {
            joined
        }
    }

    #[must_use]
    pub fn progress(&self) -> ProgressTotals {
        crate::aggregate::progress_totals(&self.courses)
    }

    /// Highest academic year among enrolled courses, if any carry one.
    #[must_use]
    pub fn current_year(&self) -> Option<u32> {
        self.courses.iter().filter_map(CourseSummary::year).max()
    }
}

/// A course template an instructor can instantiate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTemplate {
    pub id: TemplateId,
    pub name: String,
    pub skill_count: usize,
    pub year: Option<u32>,
}

/// Short-lived token identifying a student, shown as a QR code.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityToken(String);

impl IdentityToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The exact string to encode in the QR code.
    #[must_use]
    pub fn qr_payload(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructor_roles() {
        let mut profile = UserProfile {
            email: "t@x.com".into(),
            first_name: None,
            last_name: None,
            roles: vec![Role::Student],
            teaching: Vec::new(),
            courses: Vec::new(),
        };
        assert!(!profile.is_instructor());
        profile.roles.push(Role::parse("Teacher"));
        assert!(profile.is_instructor());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let profile = UserProfile {
            email: "t@x.com".into(),
            first_name: Some(" ".into()),
            last_name: None,
            roles: Vec::new(),
            teaching: Vec::new(),
            courses: Vec::new(),
        };
        assert_eq!(profile.display_name(), "t@x.com");
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = IdentityToken::new("abc123");
        assert_eq!(format!("{token:?}"), "IdentityToken(***)");
        assert_eq!(token.qr_payload(), "abc123");
    }
}
