//! Submitting skill checkoffs and reconciling the cached course view.
//!
//! After the backend confirms a write the course is fetched again and the
//! screen's snapshot is replaced with what the backend reports. Nothing is
//! patched locally before the confirmation arrives.

use std::sync::Arc;

use gateway::SkillTrackGateway;
use skilltrack_core::Clock;
use skilltrack_core::aggregate::course_snapshot;
use skilltrack_core::model::{CheckoffRequest, CheckoffRequestError, CourseId, CourseSnapshot};

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoffPhase {
    #[default]
    Idle,
    Submitting,
}

/// What a confirmed checkoff did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoffOutcome {
    pub course_id: CourseId,
    pub skill_name: String,
    pub students: Vec<String>,
    /// Submission time, RFC 3339.
    pub checked_off_at: String,
    /// False when the write succeeded but the follow-up fetch did not; the
    /// snapshot then still shows the pre-write state.
    pub refreshed: bool,
}

/// Per-screen checkoff state machine.
pub struct CheckoffReconciler {
    gateway: Arc<dyn SkillTrackGateway>,
    clock: Clock,
    actor: String,
    phase: CheckoffPhase,
}

impl CheckoffReconciler {
    /// `actor` is the signed-in instructor's email, used to attribute
    /// checkoffs the backend stores without attribution.
    #[must_use]
    pub fn new(gateway: Arc<dyn SkillTrackGateway>, clock: Clock, actor: impl Into<String>) -> Self {
        Self {
            gateway,
            clock,
            actor: actor.into(),
            phase: CheckoffPhase::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> CheckoffPhase {
        self.phase
    }

    #[must_use]
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Submit `request` and, on success, replace `snapshot` with refetched state.
    ///
    /// Every call reaches the backend; repeating a checkoff is not filtered out.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if `request` targets another course
    /// than `snapshot`, and `ServiceError::Gateway` if the backend rejects the
    /// write. `snapshot` is untouched in both cases.
    pub async fn submit(
        &mut self,
        request: &CheckoffRequest,
        snapshot: &mut CourseSnapshot,
    ) -> Result<CheckoffOutcome, ServiceError> {
        if request.course_id() != snapshot.course_id() {
            return Err(CheckoffRequestError::CourseMismatch {
                request: request.course_id().clone(),
                snapshot: snapshot.course_id().clone(),
            }
            .into());
        }

        let _submitting = PhaseGuard::enter(&mut self.phase);
        let checked_off_at = self.clock.timestamp();

        self.gateway.check_student_off(request).await?;
        tracing::info!(
            course_id = %request.course_id(),
            skill = request.skill_name(),
            students = request.student_emails().len(),
            "checkoff confirmed"
        );

        let emails = refetch_emails(snapshot, request);
        let refreshed = match self
            .gateway
            .get_course_information(request.course_id(), &emails)
            .await
        {
            Ok(payload) => {
                let mut fresh = course_snapshot(request.course_id(), &payload);
                attribute_targets(&mut fresh, request, &self.actor, &checked_off_at);
                *snapshot = fresh;
                true
            }
            Err(err) => {
                tracing::warn!(
                    course_id = %request.course_id(),
                    error = %err,
                    "checkoff saved but course refresh failed"
                );
                false
            }
        };

        Ok(CheckoffOutcome {
            course_id: request.course_id().clone(),
            skill_name: request.skill_name().to_owned(),
            students: request.student_emails().to_vec(),
            checked_off_at,
            refreshed,
        })
    }
}

/// Resets the phase to idle when dropped, so a cancelled submit does not
/// leave the screen stuck.
struct PhaseGuard<'a>(&'a mut CheckoffPhase);

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a mut CheckoffPhase) -> Self {
        *phase = CheckoffPhase::Submitting;
        Self(phase)
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.0 = CheckoffPhase::Idle;
    }
}

/// Everyone already shown plus everyone just checked off, in that order.
fn refetch_emails(snapshot: &CourseSnapshot, request: &CheckoffRequest) -> Vec<String> {
    let mut emails = snapshot.tracked_emails();
    for email in request.student_emails() {
        if !emails.contains(email) {
            emails.push(email.clone());
        }
    }
    emails
}

/// Fill in who and when for targeted skills the backend marked done without saying.
fn attribute_targets(
    snapshot: &mut CourseSnapshot,
    request: &CheckoffRequest,
    actor: &str,
    at: &str,
) {
    for email in request.student_emails() {
        let Some(progress) = snapshot.progress_for_mut(email) else {
            continue;
        };
        if let Some(skill) = progress.skill_mut(request.skill_name()) {
            if skill.checked_off() {
                skill.attribute(actor, at);
            }
        }
    }
}
