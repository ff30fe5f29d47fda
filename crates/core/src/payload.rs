//! Wire shapes returned by the SkillTrack backend.
//!
//! These types are the ingestion boundary: fields whose shape has changed
//! over time (skill values, course containers, role lists) are kept as raw
//! JSON here and normalised by [`crate::aggregate`]. Nothing downstream of the
//! aggregator sees these types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix the backend puts on user row ids.
pub const USER_ID_PREFIX: &str = "USER#";
/// Prefix the backend puts on template row ids.
pub const TEMPLATE_ID_PREFIX: &str = "COURSE_TEMPLATE#";

/// Body of `GET /FetchUserData`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPayload {
    #[serde(rename = "ID", default, skip_serializing_if = "Value::is_null")]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub email: Value,
    #[serde(default)]
    pub first_name: Value,
    #[serde(default)]
    pub last_name: Value,
    #[serde(default)]
    pub roles: Value,
    /// Current shape: `courseId -> course`.
    #[serde(default)]
    pub courses: Value,
    /// Legacy shape: `year -> { Courses: courseId -> course }`.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub years: Value,
    #[serde(default)]
    pub teaching_these_courses: Value,
}

impl UserPayload {
    /// The user's email, from `Email` or from the `USER#` row id.
    #[must_use]
    pub fn resolved_email(&self) -> Option<String> {
        if let Some(email) = text(&self.email) {
            return Some(email.trim().to_owned());
        }
        text(&self.id)
            .map(|id| id.strip_prefix(USER_ID_PREFIX).unwrap_or(id).trim())
            .filter(|e| !e.is_empty())
            .map(str::to_owned)
    }

    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        text(&self.first_name)
    }

    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        text(&self.last_name)
    }
}

/// Body of `GET /GetCourseInformation`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoursePayload {
    #[serde(default)]
    pub course_name: Value,
    /// `skillName -> { Description }`.
    #[serde(default)]
    pub skills: Value,
    /// Either emails or `{ Email, FirstName, LastName }` objects. Omitted for students.
    #[serde(default)]
    pub students: Value,
    /// `email -> { Courses: courseId -> { Skills: skillName -> status } }`.
    #[serde(default)]
    pub students_extended: Value,
    #[serde(default)]
    pub teachers: Value,
    #[serde(default)]
    pub year: Value,
}

impl CoursePayload {
    /// `CourseName` if it is a non-blank string.
    #[must_use]
    pub fn course_name(&self) -> Option<&str> {
        text(&self.course_name)
    }
}

/// One element of `GET /GetListOfTemplates`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplatePayload {
    #[serde(rename = "ID", default)]
    pub id: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub course_name: Value,
    #[serde(default)]
    pub skills: Value,
    #[serde(default)]
    pub year: Value,
}

impl TemplatePayload {
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        text(&self.id).map(str::trim)
    }

    /// `Name`, else `CourseName`, when either is a non-blank string.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        text(&self.name).or_else(|| text(&self.course_name))
    }
}

/// Body of `POST /FetchUserToken`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TokenPayload {
    pub token: String,
}

/// A skill's raw value: a bare flag (legacy) or a status object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillValue {
    Flag(bool),
    Status(SkillStatus),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SkillStatus {
    #[serde(default)]
    pub checked_off: bool,
    #[serde(default)]
    pub checked_off_by: Option<String>,
    #[serde(default)]
    pub date_checked_off: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SkillValue {
    /// Read a raw skill value. Unrecognised shapes count as not checked off.
    ///
    /// Status objects are read field by field: a malformed attribution or
    /// description is dropped without touching `CheckedOff`.
    #[must_use]
    pub fn read(raw: &Value) -> Self {
        match raw {
            Value::Bool(flag) => Self::Flag(*flag),
            Value::Object(object) => Self::Status(SkillStatus {
                checked_off: object
                    .get("CheckedOff")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                checked_off_by: string_field(object, "CheckedOffBy").map(str::to_owned),
                date_checked_off: string_field(object, "DateCheckedOff").map(str::to_owned),
                description: string_field(object, "Description").map(str::to_owned),
            }),
            _ => Self::Flag(false),
        }
    }

    #[must_use]
    pub fn checked_off(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Status(status) => status.checked_off,
        }
    }
}

// ─── Lenient readers ───────────────────────────────────────────────────────────

/// The value as a JSON object, or `None` for any other shape.
#[must_use]
pub fn as_mapping(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()
}

/// A list of strings from an array (non-strings skipped) or a single string.
#[must_use]
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        Value::String(single) if !single.trim().is_empty() => vec![single.clone()],
        _ => Vec::new(),
    }
}

/// The value as a non-blank string.
#[must_use]
pub fn text(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

/// A non-blank string field of an object.
#[must_use]
pub fn string_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// An academic year given as a number or a numeric string.
#[must_use]
pub fn year_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
