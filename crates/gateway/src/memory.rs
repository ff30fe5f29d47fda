//! Backend rows kept in memory, with the access rules and write semantics of
//! the deployed API.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde_json::{Map, Value, json};
use skilltrack_core::model::{AddStudentRequest, CheckoffRequest, CourseId, TemplateId};
use skilltrack_core::payload::{
    CoursePayload, TEMPLATE_ID_PREFIX, TemplatePayload, TokenPayload, USER_ID_PREFIX, UserPayload,
    string_list,
};

use crate::SkillTrackGateway;
use crate::error::GatewayError;

type Row = Map<String, Value>;

#[derive(Default)]
struct Backend {
    signed_in: Option<String>,
    users: HashMap<String, Row>,
    courses: HashMap<String, Row>,
    templates: Vec<(String, Row)>,
    failing_courses: HashSet<String>,
    issued_tokens: Vec<String>,
    year: Option<i32>,
}

/// In-memory gateway for tests and offline runs.
///
/// Clones share state, so a test can keep a handle for seeding and
/// assertions while services own another.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    backend: Arc<Mutex<Backend>>,
    requests: Arc<AtomicUsize>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Act as `email` for subsequent requests.
    pub fn sign_in(&self, email: &str) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.signed_in = Some(email.to_owned());
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.signed_in = None;
        }
    }

    /// Store a user row. `row` must be a JSON object; `ID` is set from `email`.
    pub fn put_user(&self, email: &str, row: Value) {
        let mut row = into_row(row);
        row.insert("ID".into(), json!(format!("{USER_ID_PREFIX}{email}")));
        if let Ok(mut backend) = self.backend.lock() {
            backend.users.insert(email.to_owned(), row);
        }
    }

    /// Store a course row. `row` must be a JSON object.
    pub fn put_course(&self, course_id: &str, row: Value) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.courses.insert(course_id.to_owned(), into_row(row));
        }
    }

    /// Store a template row under `COURSE_TEMPLATE#<template_id>`.
    pub fn put_template(&self, template_id: &str, row: Value) {
        let mut row = into_row(row);
        row.insert("ID".into(), json!(format!("{TEMPLATE_ID_PREFIX}{template_id}")));
        if let Ok(mut backend) = self.backend.lock() {
            backend.templates.retain(|(id, _)| id != template_id);
            backend.templates.push((template_id.to_owned(), row));
        }
    }

    /// Make every `GetCourseInformation` for `course_id` fail with a 500.
    pub fn fail_course(&self, course_id: &str) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.failing_courses.insert(course_id.to_owned());
        }
    }

    /// Year used to suffix course ids created from templates.
    pub fn set_year(&self, year: i32) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.year = Some(year);
        }
    }

    #[must_use]
    pub fn user_row(&self, email: &str) -> Option<Value> {
        let backend = self.backend.lock().ok()?;
        backend.users.get(email).cloned().map(Value::Object)
    }

    #[must_use]
    pub fn course_row(&self, course_id: &str) -> Option<Value> {
        let backend = self.backend.lock().ok()?;
        backend.courses.get(course_id).cloned().map(Value::Object)
    }

    #[must_use]
    pub fn issued_tokens(&self) -> Vec<String> {
        self.backend
            .lock()
            .map(|b| b.issued_tokens.clone())
            .unwrap_or_default()
    }

    /// Requests served so far, failed ones included.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Lock the backend as the signed-in caller and count the request.
    fn serve(&self) -> Result<(MutexGuard<'_, Backend>, String), GatewayError> {
        let backend = self
            .backend
            .lock()
            .map_err(|e| GatewayError::status(500, e.to_string()))?;
        let caller = backend
            .signed_in
            .clone()
            .ok_or(GatewayError::MissingToken)?;
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok((backend, caller))
    }

    fn course_information(
        &self,
        course_id: &CourseId,
        extended_for: Extended<'_>,
    ) -> Result<CoursePayload, GatewayError> {
        let (backend, caller) = self.serve()?;
        let id = course_id.as_str();
        if backend.failing_courses.contains(id) {
            return Err(GatewayError::status(500, "Error reading data from the database"));
        }
        let mut course = backend
            .courses
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::status(500, "Error reading data from the database"))?;

        let instructor = backend.is_admin(&caller)? || backend.is_teacher(&caller)?;
        let enrolled = list_contains(course.get("Students"), &caller);
        if !backend.manages(&caller, id)? && !enrolled {
            return Err(GatewayError::status(
                403,
                "Error: You do not have permission to view class details",
            ));
        }
        if !instructor {
            course.remove("Students");
            return decode(Value::Object(course));
        }

        let emails = match extended_for {
            Extended::Listed(emails) => emails.to_vec(),
            Extended::Roster => course.get("Students").map(string_list).unwrap_or_default(),
        };
        let mut extended = Map::new();
        for email in &emails {
            let mut student = backend.users.get(email).cloned().ok_or_else(|| {
                GatewayError::status(500, format!("Error reading data from the database: {email}"))
            })?;
            if let Some(Value::Object(courses)) = student.get_mut("Courses") {
                courses.retain(|key, _| key == id);
            }
            extended.insert(email.clone(), Value::Object(student));
        }
        course.insert("StudentsExtended".into(), Value::Object(extended));
        decode(Value::Object(course))
    }
}

impl Backend {
    fn caller_row(&self, caller: &str) -> Result<&Row, GatewayError> {
        self.users
            .get(caller)
            .ok_or_else(|| GatewayError::status(500, "Failed to read data from the database"))
    }

    fn is_admin(&self, caller: &str) -> Result<bool, GatewayError> {
        Ok(has_role(self.caller_row(caller)?, "Admin"))
    }

    fn is_teacher(&self, caller: &str) -> Result<bool, GatewayError> {
        Ok(has_role(self.caller_row(caller)?, "Teacher"))
    }

    /// Admin, or a teacher listed as teaching `course_id`.
    fn manages(&self, caller: &str, course_id: &str) -> Result<bool, GatewayError> {
        let row = self.caller_row(caller)?;
        Ok(has_role(row, "Admin")
            || (has_role(row, "Teacher") && list_contains(row.get("TeachingTheseCourses"), course_id)))
    }

    fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}

/// Which students' rows go into `StudentsExtended`.
enum Extended<'a> {
    Listed(&'a [String]),
    Roster,
}

#[async_trait]
impl SkillTrackGateway for InMemoryGateway {
    async fn fetch_user_data(&self) -> Result<UserPayload, GatewayError> {
        let (mut backend, caller) = self.serve()?;
        let row = backend
            .users
            .entry(caller.clone())
            .or_insert_with(|| {
                into_row(json!({
                    "ID": format!("{USER_ID_PREFIX}{caller}"),
                    "FirstName": null,
                    "LastName": null,
                    "Roles": ["Student"],
                    "Courses": {}
                }))
            })
            .clone();
        decode(Value::Object(row))
    }

    async fn get_course_information(
        &self,
        course_id: &CourseId,
        student_emails: &[String],
    ) -> Result<CoursePayload, GatewayError> {
        self.course_information(course_id, Extended::Listed(student_emails))
    }

    async fn get_course_information_for_roster(
        &self,
        course_id: &CourseId,
    ) -> Result<CoursePayload, GatewayError> {
        self.course_information(course_id, Extended::Roster)
    }

    async fn check_student_off(&self, request: &CheckoffRequest) -> Result<(), GatewayError> {
        let (mut backend, caller) = self.serve()?;
        let course_id = request.course_id().as_str();
        if !backend.manages(&caller, course_id)? {
            return Err(GatewayError::status(
                403,
                "error: You do not have permission to check students off",
            ));
        }

        // Students before a failing one stay updated.
        for email in request.student_emails() {
            let skill = backend
                .users
                .get_mut(email)
                .and_then(|row| row.get_mut("Courses"))
                .and_then(|courses| courses.get_mut(course_id))
                .and_then(|course| course.get_mut("Skills"))
                .and_then(|skills| skills.get_mut(request.skill_name()))
                .ok_or_else(|| GatewayError::status(500, "Failed to update one or more skills"))?;
            *skill = Value::Bool(true);
        }
        Ok(())
    }

    async fn add_student_to_course(
        &self,
        request: &AddStudentRequest,
    ) -> Result<(), GatewayError> {
        let (mut backend, caller) = self.serve()?;
        let course_id = request.course_id().as_str();
        let email = request.student_email();
        if !backend.manages(&caller, course_id)? {
            return Err(GatewayError::status(
                403,
                "error: You do not have permission to add students to this course",
            ));
        }

        let failed = || GatewayError::status(500, "failed to fully add student to course");
        let course = backend.courses.get_mut(course_id).ok_or_else(failed)?;
        push_unique(course, "Students", email);
        let seeded = json!({
            "CourseName": course.get("CourseName").cloned().unwrap_or(Value::Null),
            "Skills": course
                .get("Skills")
                .and_then(Value::as_object)
                .map(|skills| skills.keys().map(|k| (k.clone(), Value::Bool(false))).collect::<Map<_, _>>())
                .unwrap_or_default(),
        });

        let student = backend.users.get_mut(email).ok_or_else(failed)?;
        let courses = student
            .entry("Courses")
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(courses) = courses.as_object_mut() else {
            return Err(failed());
        };
        if courses.contains_key(course_id) {
            return Err(GatewayError::status(
                409,
                "student is already enrolled in this course",
            ));
        }
        courses.insert(course_id.to_owned(), seeded);
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<TemplatePayload>, GatewayError> {
        let (backend, caller) = self.serve()?;
        if !backend.is_admin(&caller)? && !backend.is_teacher(&caller)? {
            return Err(GatewayError::status(
                403,
                "Error: You do not have permission to view template details",
            ));
        }
        let rows = backend
            .templates
            .iter()
            .map(|(_, row)| Value::Object(row.clone()))
            .collect();
        decode(Value::Array(rows))
    }

    async fn create_course_from_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<(), GatewayError> {
        let (mut backend, caller) = self.serve()?;
        if !backend.is_admin(&caller)? && !backend.is_teacher(&caller)? {
            return Err(GatewayError::status(
                403,
                "error: you do not have permission to make a course from a template",
            ));
        }
        let template = backend
            .templates
            .iter()
            .find(|(id, _)| id == template_id.as_str())
            .map(|(_, row)| row.clone())
            .ok_or_else(|| GatewayError::status(404, "Failed to find requested template"))?;

        let course_id = format!("{}-{}", template_id.as_str(), backend.year());
        if backend.courses.contains_key(&course_id) {
            return Err(GatewayError::status(
                409,
                "A course with this ID already exists!",
            ));
        }
        let row = into_row(json!({
            "Year": template.get("Year").cloned().unwrap_or(Value::Null),
            "CourseName": template.get("CourseName").cloned().unwrap_or(Value::Null),
            "Skills": template.get("Skills").cloned().unwrap_or_else(|| json!({})),
            "Teachers": [caller.clone()],
            "Students": [],
        }));
        backend.courses.insert(course_id.clone(), row);
        tracing::debug!(%course_id, "course created from template");

        let teacher = backend.users.get_mut(&caller).ok_or_else(|| {
            GatewayError::status(500, "failed to update teacher row with the course")
        })?;
        push_unique(teacher, "TeachingTheseCourses", &course_id);
        Ok(())
    }

    async fn fetch_user_token(&self) -> Result<TokenPayload, GatewayError> {
        let (mut backend, _caller) = self.serve()?;
        let bytes: [u8; 16] = rand::random();
        let token: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        backend.issued_tokens.push(token.clone());
        Ok(TokenPayload { token })
    }
}

fn into_row(value: Value) -> Row {
    match value {
        Value::Object(row) => row,
        _ => Row::new(),
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
}

fn has_role(row: &Row, role: &str) -> bool {
    list_contains(row.get("Roles"), role)
}

fn list_contains(list: Option<&Value>, needle: &str) -> bool {
    match list {
        Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(needle)),
        Some(Value::String(single)) => single == needle,
        _ => false,
    }
}

/// Append `value` to the string list at `key`, creating it, skipping duplicates.
fn push_unique(row: &mut Row, key: &str, value: &str) {
    let list = row
        .entry(key)
        .or_insert_with(|| Value::Array(Vec::new()));
    if !list.is_array() {
        *list = Value::Array(Vec::new());
    }
    if let Value::Array(items) = list {
        if !items.iter().any(|v| v.as_str() == Some(value)) {
            items.push(Value::String(value.to_owned()));
        }
    }
}
