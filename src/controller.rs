use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{NewLead, ValidationError};
use crate::submission::{SubmissionClient, SubmissionError};
use crate::utils::error_chain_fmt;

/// Mutable field state as typed by the user. Updates made while a submit is
/// in flight land here, not in the record already on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadDraft {
    pub name: String,
    pub email: String,
    pub lead_type: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(SubmitFailure),
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Idle => f.write_str("idle"),
            SubmissionStatus::Submitting => f.write_str("sending"),
            SubmissionStatus::Succeeded => f.write_str("sent"),
            SubmissionStatus::Failed(reason) => write!(f, "error: {reason}"),
        }
    }
}

#[derive(thiserror::Error, Clone, PartialEq)]
pub enum SubmitFailure {
    #[error("validation failed: {}", format_reasons(.0))]
    Validation(Vec<ValidationError>),
    #[error("submission failed")]
    Submission(#[source] SubmissionError),
}

impl std::fmt::Debug for SubmitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

fn format_reasons(reasons: &[ValidationError]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// What the UI layer reads to render the form.
#[derive(Debug, Clone)]
pub struct FormSnapshot {
    pub record: LeadDraft,
    pub status: SubmissionStatus,
}

/// Owns the draft and status for one form instance and orchestrates
/// validation and submission. Constructing the controller is the "mount"
/// hook; `update_field` is the "field change" hook. Nothing runs
/// implicitly.
pub struct FormController {
    state: Mutex<ControllerState>,
    client: SubmissionClient,
}

#[derive(Default)]
struct ControllerState {
    draft: LeadDraft,
    status: SubmissionStatus,
}

impl FormController {
    pub fn new(client: SubmissionClient) -> Self {
        Self {
            state: Mutex::new(ControllerState::default()),
            client,
        }
    }

    /// Updates one of the three known fields (`name`, `email`, `leadType`).
    /// Unknown field names are ignored.
    pub fn update_field(&self, field: &str, value: &str) {
        let mut state = self.lock();
        match field {
            "name" => state.draft.name = value.to_owned(),
            "email" => state.draft.email = value.to_owned(),
            "leadType" => state.draft.lead_type = value.to_owned(),
            unknown => tracing::debug!(field = unknown, "Ignoring update for unknown field"),
        }
    }

    pub fn current_state(&self) -> FormSnapshot {
        let state = self.lock();
        FormSnapshot {
            record: state.draft.clone(),
            status: state.status.clone(),
        }
    }

    /// Validate the draft and post it.
    ///
    /// A call while a submission is in flight is a no-op returning the
    /// current status. The status check, validation, draft snapshot and the
    /// transition to `Submitting` happen under one lock acquisition, so no
    /// intermediate state is observable. The lock is never held across the
    /// network call.
    #[tracing::instrument(
        name = "Accepting a lead submission",
        skip(self),
        fields(lead_email = tracing::field::Empty)
    )]
    pub async fn submit(&self) -> SubmissionStatus {
        let lead = {
            let mut state = self.lock();
            if state.status == SubmissionStatus::Submitting {
                tracing::debug!("A submission is already in flight, ignoring");
                return state.status.clone();
            }
            match NewLead::try_from(state.draft.clone()) {
                Ok(lead) => {
                    state.status = SubmissionStatus::Submitting;
                    lead
                }
                Err(reasons) => {
                    state.status = SubmissionStatus::Failed(SubmitFailure::Validation(reasons));
                    return state.status.clone();
                }
            }
        };
        tracing::Span::current().record("lead_email", &tracing::field::display(&lead.email));

        let outcome = self.client.submit(&lead).await;

        let mut state = self.lock();
        state.status = match outcome {
            Ok(_) => {
                tracing::info!("lead sent");
                SubmissionStatus::Succeeded
            }
            Err(e) => SubmissionStatus::Failed(SubmitFailure::Submission(e)),
        };
        state.status.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
