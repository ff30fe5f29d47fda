use std::sync::Arc;

use chrono::Duration;
use gateway::InMemoryGateway;
use serde_json::json;
use services::{AppServices, CheckoffPhase, Clock, ErrorKind, ServiceError};
use skilltrack_core::model::{CheckoffRequest, CheckoffRequestError, CourseId};
use skilltrack_core::time::{fixed_clock, fixed_now};

const COURSE: &str = "NRS-210-2026";

fn backend() -> InMemoryGateway {
    let gw = InMemoryGateway::new();
    gw.put_user(
        "prof@x.com",
        json!({"Roles": ["Teacher"], "TeachingTheseCourses": [COURSE]}),
    );
    gw.put_user(
        "a@x.com",
        json!({
            "FirstName": "Ana",
            "LastName": "Diaz",
            "Courses": {COURSE: {"CourseName": "NRS 210", "Skills": {
                "Handwashing": false,
                "IV Calc": {"CheckedOff": true, "CheckedOffBy": "earlier@x.com", "DateCheckedOff": "2026-01-10"}
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
    gw.sign_in("prof@x.com");
    gw
}

fn course_id() -> CourseId {
    CourseId::new(COURSE)
}

#[tokio::test]
async fn empty_student_set_never_reaches_the_backend() {
    let gw = backend();

    let err = CheckoffRequest::new(course_id(), "Handwashing", Vec::<String>::new()).unwrap_err();
    assert_eq!(err, CheckoffRequestError::NoStudents);
    assert_eq!(ServiceError::from(err).kind(), ErrorKind::Validation);
    assert_eq!(gw.request_count(), 0);
}

#[tokio::test]
async fn confirmed_checkoff_replaces_snapshot_and_attributes() {
    let gw = backend();
    let services = AppServices::in_memory(gw.clone(), fixed_clock());
    let mut snapshot = services
        .courses()
        .roster_snapshot(&course_id())
        .await
        .unwrap();
    assert_eq!(snapshot.tracked_emails(), ["a@x.com", "b@x.com"]);
    assert!(!snapshot.progress_for("a@x.com").unwrap().skill("Handwashing").unwrap().checked_off());

    let mut reconciler = services.reconciler("prof@x.com");
    let request = CheckoffRequest::new(course_id(), "Handwashing", ["a@x.com"]).unwrap();
    let before = gw.request_count();
    let outcome = reconciler.submit(&request, &mut snapshot).await.unwrap();

    assert!(outcome.refreshed);
    assert_eq!(gw.request_count(), before + 2);
    assert_eq!(reconciler.phase(), CheckoffPhase::Idle);

    let ana = snapshot.progress_for("a@x.com").unwrap();
    assert_eq!(ana.student.display_name(), "Ana Diaz");
    let handwashing = ana.skill("Handwashing").unwrap();
    assert!(handwashing.checked_off());
    assert_eq!(handwashing.checked_off_by(), Some("prof@x.com"));
    assert_eq!(handwashing.date_checked_off(), Some("2023-11-14T22:13:20Z"));

    // Attribution the backend already had is kept.
    let iv = ana.skill("IV Calc").unwrap();
    assert_eq!(iv.checked_off_by(), Some("earlier@x.com"));

    // Untargeted students are not attributed.
    let b = snapshot.progress_for("b@x.com").unwrap();
    assert!(!b.skill("Handwashing").unwrap().checked_off());
}

#[tokio::test]
async fn repeat_submit_always_reaches_the_backend() {
    let gw = backend();
    let mut clock = Clock::fixed(fixed_now());
    let services = AppServices::in_memory(gw.clone(), clock);
    let mut snapshot = services.courses().roster_snapshot(&course_id()).await.unwrap();
    let request = CheckoffRequest::new(course_id(), "IV Calc", ["b@x.com"]).unwrap();

    let mut reconciler = services.reconciler("prof@x.com");
    reconciler.submit(&request, &mut snapshot).await.unwrap();
    let after_first = gw.request_count();

    clock.advance(Duration::hours(1));
    let mut later = AppServices::in_memory(gw.clone(), clock).reconciler("prof@x.com");
    let outcome = later.submit(&request, &mut snapshot).await.unwrap();

    assert_eq!(gw.request_count(), after_first + 2);
    assert_eq!(outcome.checked_off_at, "2023-11-14T23:13:20Z");
    // The backend stores a bare flag, so each refetch is attributed anew.
    let iv = snapshot.progress_for("b@x.com").unwrap().skill("IV Calc").unwrap();
    assert_eq!(iv.date_checked_off(), Some("2023-11-14T23:13:20Z"));
}

#[tokio::test]
async fn rejected_write_leaves_snapshot_untouched() {
    let gw = backend();
    let services = AppServices::in_memory(gw.clone(), fixed_clock());
    let mut snapshot = services.courses().roster_snapshot(&course_id()).await.unwrap();
    let before = snapshot.clone();

    let request = CheckoffRequest::new(course_id(), "Suturing", ["a@x.com"]).unwrap();
    let err = services
        .reconciler("prof@x.com")
        .submit(&request, &mut snapshot)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(snapshot, before);
}

#[tokio::test]
async fn forbidden_write_is_an_auth_error() {
    let gw = backend();
    gw.put_user("other@x.com", json!({"Roles": ["Teacher"], "TeachingTheseCourses": []}));
    let services = AppServices::in_memory(gw.clone(), fixed_clock());
    let mut snapshot = services.courses().roster_snapshot(&course_id()).await.unwrap();

    gw.sign_in("other@x.com");
    let request = CheckoffRequest::new(course_id(), "Handwashing", ["a@x.com"]).unwrap();
    let err = services
        .reconciler("other@x.com")
        .submit(&request, &mut snapshot)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn failed_refresh_keeps_the_write() {
    let gw = backend();
    let services = AppServices::in_memory(gw.clone(), fixed_clock());
    let mut snapshot = services.courses().roster_snapshot(&course_id()).await.unwrap();
    let before = snapshot.clone();

    gw.fail_course(COURSE);
    let request = CheckoffRequest::new(course_id(), "Handwashing", ["b@x.com"]).unwrap();
    let outcome = services
        .reconciler("prof@x.com")
        .submit(&request, &mut snapshot)
        .await
        .unwrap();

    assert!(!outcome.refreshed);
    assert_eq!(snapshot, before);
    let row = gw.user_row("b@x.com").unwrap();
    assert_eq!(row["Courses"][COURSE]["Skills"]["Handwashing"], json!(true));
}

#[tokio::test]
async fn newly_targeted_student_joins_the_snapshot() {
    let gw = backend();
    let services = AppServices::in_memory(gw.clone(), fixed_clock());
    let mut snapshot = services
        .courses()
        .snapshot(&course_id(), &["a@x.com".to_owned()])
        .await
        .unwrap();
    assert!(snapshot.progress_for("b@x.com").is_none());

    let request = CheckoffRequest::new(course_id(), "Handwashing", ["b@x.com"]).unwrap();
    services
        .reconciler("prof@x.com")
        .submit(&request, &mut snapshot)
        .await
        .unwrap();

    assert_eq!(snapshot.tracked_emails(), ["a@x.com", "b@x.com"]);
    let b = snapshot.progress_for("b@x.com").unwrap();
    assert_eq!(b.skill("Handwashing").unwrap().checked_off_by(), Some("prof@x.com"));
    assert_eq!(b.completed_skills(), 1);
}

#[tokio::test]
async fn services_share_one_backend() {
    let gw = backend();
    let services = AppServices::in_memory(gw.clone(), fixed_clock());
    let clone = services.clone();
    clone.courses().course_detail(&course_id()).await.unwrap();
    services.courses().course_detail(&course_id()).await.unwrap();
    assert_eq!(gw.request_count(), 2);
    assert!(Arc::ptr_eq(&services.courses(), &clone.courses()));
}
