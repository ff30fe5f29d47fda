use serde::{Deserialize, Serialize};

/// A skill's completion state for one student in one course.
///
/// Attribution (`checked_off_by`, `date_checked_off`) only exists on a
/// checked-off skill; the constructors drop it otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    skill_name: String,
    description: Option<String>,
    checked_off: bool,
    checked_off_by: Option<String>,
    date_checked_off: Option<String>,
}

impl SkillRecord {
    /// A skill that has not been checked off yet.
    #[must_use]
    pub fn pending(skill_name: impl Into<String>) -> Self {
        Self {
            skill_name: skill_name.into(),
            description: None,
            checked_off: false,
            checked_off_by: None,
            date_checked_off: None,
        }
    }

    /// A checked-off skill with no known attribution (legacy `true` flag).
    #[must_use]
    pub fn completed(skill_name: impl Into<String>) -> Self {
        Self {
            checked_off: true,
            ..Self::pending(skill_name)
        }
    }

    /// Build a record from its parts, enforcing the attribution invariant.
    #[must_use]
    pub fn from_parts(
        skill_name: impl Into<String>,
        description: Option<String>,
        checked_off: bool,
        checked_off_by: Option<String>,
        date_checked_off: Option<String>,
    ) -> Self {
        let (checked_off_by, date_checked_off) = if checked_off {
            (non_blank(checked_off_by), non_blank(date_checked_off))
        } else {
            (None, None)
        };
        Self {
            skill_name: skill_name.into(),
            description: non_blank(description),
            checked_off,
            checked_off_by,
            date_checked_off,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = non_blank(description);
        self
    }

    #[must_use]
    pub fn skill_name(&self) -> &str {
        &self.skill_name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn checked_off(&self) -> bool {
        self.checked_off
    }

    #[must_use]
    pub fn checked_off_by(&self) -> Option<&str> {
        self.checked_off_by.as_deref()
    }

    #[must_use]
    pub fn date_checked_off(&self) -> Option<&str> {
        self.date_checked_off.as_deref()
    }

    /// True when the skill is checked off but carries no attribution.
    #[must_use]
    pub fn lacks_attribution(&self) -> bool {
        self.checked_off && self.checked_off_by.is_none() && self.date_checked_off.is_none()
    }

    /// Record who approved the skill and when.
    ///
    /// Existing attribution is kept; only missing fields are filled.
    pub fn attribute(&mut self, approver: &str, at: &str) {
        self.checked_off = true;
        if self.checked_off_by.is_none() {
            self.checked_off_by = non_blank(Some(approver.to_owned()));
        }
        if self.date_checked_off.is_none() {
            self.date_checked_off = non_blank(Some(at.to_owned()));
        }
    }
}

/// A skill as defined by a course's catalog, independent of any student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub name: String,
    pub description: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
