use gateway::{GatewayError, InMemoryGateway, SkillTrackGateway};
use serde_json::json;
use skilltrack_core::aggregate::{aggregate_courses, course_snapshot, course_templates};
use skilltrack_core::model::{AddStudentRequest, CheckoffRequest, CourseId, TemplateId};

fn backend() -> InMemoryGateway {
    let gw = InMemoryGateway::new();
    gw.set_year(2026);
    gw.put_user(
        "admin@x.com",
        json!({"FirstName": "Ada", "Roles": ["Admin"], "Courses": {}}),
    );
    gw.put_user(
        "s1@x.com",
        json!({"FirstName": "Sam", "Roles": ["Student"], "Courses": {}}),
    );
    gw.put_template(
        "NRS-210",
        json!({
            "CourseName": "NRS 210: Foundations",
            "Year": 1,
            "Skills": {
                "Handwashing": {"Description": "Infection prevention"},
                "PPE": {"Description": "Gown and glove"}
            }
        }),
    );
    gw
}

#[tokio::test]
async fn template_to_checkoff_flow() {
    let gw = backend();
    gw.sign_in("admin@x.com");

    let templates = course_templates(&gw.list_templates().await.unwrap());
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].id, TemplateId::new("NRS-210"));

    gw.create_course_from_template(&templates[0].id).await.unwrap();
    let course_id = CourseId::new("NRS-210-2026");
    let admin = gw.user_row("admin@x.com").unwrap();
    assert_eq!(admin["TeachingTheseCourses"], json!(["NRS-210-2026"]));

    let add = AddStudentRequest::new(course_id.clone(), "s1@x.com").unwrap();
    gw.add_student_to_course(&add).await.unwrap();

    let request = CheckoffRequest::new(course_id.clone(), "PPE", ["s1@x.com"]).unwrap();
    gw.check_student_off(&request).await.unwrap();

    let payload = gw
        .get_course_information(&course_id, &["s1@x.com".to_owned()])
        .await
        .unwrap();
    let snapshot = course_snapshot(&course_id, &payload);
    let progress = snapshot.progress_for("s1@x.com").unwrap();
    assert_eq!(progress.student.first_name(), "Sam");
    assert_eq!(progress.total_skills(), 2);
    assert!(progress.skill("PPE").unwrap().checked_off());
    assert!(!progress.skill("Handwashing").unwrap().checked_off());

    gw.sign_in("s1@x.com");
    let courses = aggregate_courses(&gw.fetch_user_data().await.unwrap());
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].course_name(), "NRS 210: Foundations");
    assert_eq!(courses[0].completed_skills(), 1);
}

#[tokio::test]
async fn duplicate_course_and_enrollment_conflict() {
    let gw = backend();
    gw.sign_in("admin@x.com");
    let template = TemplateId::new("NRS-210");
    gw.create_course_from_template(&template).await.unwrap();

    let err = gw.create_course_from_template(&template).await.unwrap_err();
    assert!(matches!(err, GatewayError::HttpStatus { status: 409, .. }));

    let add = AddStudentRequest::new(CourseId::new("NRS-210-2026"), "s1@x.com").unwrap();
    gw.add_student_to_course(&add).await.unwrap();
    let err = gw.add_student_to_course(&add).await.unwrap_err();
    assert!(matches!(err, GatewayError::HttpStatus { status: 409, .. }));

    let course = gw.course_row("NRS-210-2026").unwrap();
    assert_eq!(course["Students"], json!(["s1@x.com"]));
}

#[tokio::test]
async fn unknown_skill_fails_after_earlier_students_update() {
    let gw = backend();
    gw.put_user(
        "s2@x.com",
        json!({"Roles": ["Student"], "Courses": {"c1": {"Skills": {"PPE": false}}}}),
    );
    gw.put_user(
        "s3@x.com",
        json!({"Roles": ["Student"], "Courses": {"c1": {"Skills": {}}}}),
    );
    gw.sign_in("admin@x.com");

    let request = CheckoffRequest::new(CourseId::new("c1"), "PPE", ["s2@x.com", "s3@x.com"]).unwrap();
    let err = gw.check_student_off(&request).await.unwrap_err();
    assert!(matches!(err, GatewayError::HttpStatus { status: 500, .. }));
    assert_eq!(
        gw.user_row("s2@x.com").unwrap()["Courses"]["c1"]["Skills"]["PPE"],
        json!(true)
    );
}

#[tokio::test]
async fn students_cannot_list_templates() {
    let gw = backend();
    gw.sign_in("s1@x.com");
    let err = gw.list_templates().await.unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn new_users_get_a_student_row() {
    let gw = InMemoryGateway::new();
    gw.sign_in("new@x.com");
    let user = gw.fetch_user_data().await.unwrap();
    assert_eq!(user.resolved_email().as_deref(), Some("new@x.com"));
    assert!(aggregate_courses(&user).is_empty());
}
