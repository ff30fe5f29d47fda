use std::io;
use std::sync::{Arc, Mutex};

use gateway::InMemoryGateway;
use serde_json::json;
use services::AppServices;
use skilltrack_core::model::{CourseId, TemplateId};
use skilltrack_core::time::fixed_clock;
use ui::ViewError;
use ui::ViewState;
use ui::vm::{
    load_checkoff_form, load_course_list, load_my_course_skills, load_profile, load_templates,
};

const COURSE: &str = "NRS-210-2026";

fn backend() -> InMemoryGateway {
    let gw = InMemoryGateway::new();
    gw.set_year(2026);
    gw.put_user(
        "prof@x.com",
        json!({"FirstName": "Pat", "Roles": ["Teacher"], "TeachingTheseCourses": [COURSE]}),
    );
    gw.put_user(
        "a@x.com",
        json!({
            "FirstName": "Ana",
            "Roles": ["Student"],
            "Courses": {COURSE: {"CourseName": "NRS 210", "Skills": {
                "Handwashing": false,
                "IV Calc": true
            }}}
        }),
    );
    gw.put_user(
        "b@x.com",
        json!({"Courses": {COURSE: {"Skills": {"Handwashing": false, "IV Calc": false}}}}),
    );
    gw.put_course(
        COURSE,
        json!({
            "CourseName": "NRS 210",
            "Skills": {
                "Handwashing": {"Description": "Infection prevention"},
                "IV Calc": {"Description": "Drip rates"}
            },
            "Students": ["a@x.com", "b@x.com"]
        }),
    );
    gw
}

#[tokio::test]
async fn instructor_checks_off_selected_students() {
    let gw = backend();
    gw.sign_in("prof@x.com");
    let app = AppServices::in_memory(gw.clone(), fixed_clock());

    let ViewState::Ready(mut form) =
        load_checkoff_form(&app, &CourseId::new(COURSE), "prof@x.com").await
    else {
        panic!("checkoff form did not load");
    };
    assert_eq!(form.course_name(), "NRS 210");
    assert_eq!(form.students().len(), 2);

    let before = gw.request_count();
    let err = form.submit().await.unwrap_err();
    assert!(matches!(err, ViewError::Validation(_)));
    assert_eq!(gw.request_count(), before);

    form.select_skill("Handwashing");
    form.set_search("b@");
    form.select_all_visible();
    form.set_search("");
    assert_eq!(form.selected_count(), 1);

    let message = form.submit().await.unwrap();
    assert_eq!(message, "1 student(s) checked off for Handwashing");
    assert_eq!(form.selected_count(), 0);
    assert_eq!(form.notice(), None);
    assert!(!form.is_submitting());

    let rows = form.students();
    let a = rows.iter().find(|r| r.email == "a@x.com").unwrap();
    let b = rows.iter().find(|r| r.email == "b@x.com").unwrap();
    assert!(!a.has_skill);
    assert!(b.has_skill);
}

#[tokio::test]
async fn student_sees_course_progress() {
    let gw = backend();
    gw.sign_in("a@x.com");
    let app = AppServices::in_memory(gw, fixed_clock());

    let courses = load_course_list(&app.courses()).await;
    let cards = courses.ready().unwrap().visible();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].progress_label, "1/2 skills complete");

    let skills = load_my_course_skills(&app.courses(), &CourseId::new(COURSE)).await;
    assert_eq!(skills.ready().unwrap().visible().len(), 2);

    let missing = load_my_course_skills(&app.courses(), &CourseId::new("OTHER")).await;
    assert_eq!(missing, ViewState::Empty);

    let profile = load_profile(&app.courses()).await;
    assert_eq!(
        profile.ready().unwrap().totals_label,
        "1 of 2 skills completed"
    );
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn signed_out_screens_report_auth() {
    let logs = Captured::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);
    let app = AppServices::in_memory(backend(), fixed_clock());

    let profile = load_profile(&app.courses()).await;
    assert_eq!(profile.error(), Some(&ViewError::Auth));
    let form = load_checkoff_form(&app, &CourseId::new(COURSE), "prof@x.com").await;
    assert_eq!(form.error(), Some(&ViewError::Auth));

    assert_eq!(logs.text().matches("view load failed").count(), 2);
}

#[tokio::test]
async fn admin_creates_course_from_template() {
    let gw = backend();
    gw.put_user("admin@x.com", json!({"Roles": ["Admin"]}));
    gw.put_template(
        "PHARM",
        json!({"CourseName": "Pharmacology", "Skills": {"Dosage": {}}}),
    );
    gw.sign_in("admin@x.com");
    let app = AppServices::in_memory(gw.clone(), fixed_clock());
    let templates = app.templates();

    let ViewState::Ready(mut picker) = load_templates(&templates).await else {
        panic!("templates did not load");
    };
    assert_eq!(picker.options()[0].label, "Pharmacology (1 skills)");

    let err = picker.create(&templates).await.unwrap_err();
    assert!(matches!(err, ViewError::Validation(_)));

    picker.select(&TemplateId::new("PHARM"));
    let message = picker.create(&templates).await.unwrap();
    assert_eq!(message, "Created course from Pharmacology");
    assert_eq!(picker.selected(), None);
    assert!(gw.course_row("PHARM-2026").is_some());
}
