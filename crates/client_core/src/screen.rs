//! Screen-level state machine: owns the location cascade, the mouza list and
//! the submission status, and turns input events into side effects for the
//! runtime to perform.

use shared::domain::{LocationSelection, MouzaRecord, SubmissionPayload};
use tracing::{debug, info, warn};

use crate::{
    cascade::{CascadeController, LookupOutcome, LookupRequest},
    error::{DirectoryError, FormError, SubmitError},
    mouza::{MouzaField, MouzaListController},
    submission::{build_payload, SubmissionReceipt},
};

pub const SUBMIT_SUCCESS_MESSAGE: &str = "Form submitted successfully!";
pub const SUBMIT_TRANSPORT_FAILURE_MESSAGE: &str = "An error occurred while submitting the form.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Opened,
    DivisionSelected(String),
    DistrictSelected(String),
    UpazilaSelected(String),
    UnionChanged(String),
    MouzaAdded,
    MouzaRemoved(usize),
    MouzaFieldEdited {
        position: usize,
        field: MouzaField,
        value: String,
    },
    SubmitRequested,
    LookupCompleted {
        request: LookupRequest,
        result: Result<Vec<String>, DirectoryError>,
    },
    SubmissionCompleted(Result<SubmissionReceipt, SubmitError>),
}

impl FormEvent {
    /// Field edit addressed by its wire name (`mouzaName`, `surveyType`, `sheetNumber`).
    pub fn edit(
        position: usize,
        field: &str,
        value: impl Into<String>,
    ) -> Result<Self, FormError> {
        Ok(FormEvent::MouzaFieldEdited {
            position,
            field: field.parse()?,
            value: value.into(),
        })
    }

    fn is_user_input(&self) -> bool {
        !matches!(
            self,
            FormEvent::LookupCompleted { .. } | FormEvent::SubmissionCompleted(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEffect {
    Lookup(LookupRequest),
    Submit(SubmissionPayload),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Pending,
    Succeeded {
        message: String,
    },
    Rejected {
        status: u16,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    NetworkFailure,
    ServerRejection,
}

/// User-visible message. Cleared by the next user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Everything a presentation layer needs to render the screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormView {
    pub revision: u64,
    pub divisions: Vec<String>,
    pub districts: Vec<String>,
    pub upazilas: Vec<String>,
    pub selection: LocationSelection,
    pub mouzas: Vec<MouzaRecord>,
    pub submission: SubmissionStatus,
    pub notice: Option<Notice>,
    pub rejection: Option<FormError>,
    pub pending_lookups: usize,
}

impl FormView {
    /// No lookup or submission is outstanding.
    pub fn is_settled(&self) -> bool {
        self.pending_lookups == 0 && self.submission != SubmissionStatus::Pending
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormScreen {
    cascade: CascadeController,
    mouzas: MouzaListController,
    submission: SubmissionStatus,
    notice: Option<Notice>,
    rejection: Option<FormError>,
    in_flight: Vec<LookupRequest>,
    revision: u64,
}

impl FormScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cascade(&self) -> &CascadeController {
        &self.cascade
    }

    pub fn mouzas(&self) -> &MouzaListController {
        &self.mouzas
    }

    pub fn submission(&self) -> &SubmissionStatus {
        &self.submission
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Applies one event. A rejected event leaves the form untouched and is
    /// recorded in the view until the next user input.
    pub fn handle(&mut self, event: FormEvent) -> Result<Option<FormEffect>, FormError> {
        self.revision += 1;
        if event.is_user_input() {
            self.notice = None;
            self.rejection = None;
        }

        let result = self.apply(event);
        if let Err(err) = &result {
            self.rejection = Some(err.clone());
        }
        if let Ok(Some(FormEffect::Lookup(request))) = &result {
            self.in_flight.push(request.clone());
        }
        result
    }

    /// Rolls back the bookkeeping for an effect that was never run.
    pub fn abandon(&mut self, effect: &FormEffect) {
        match effect {
            FormEffect::Lookup(request) => {
                if let Some(index) = self.in_flight.iter().position(|pending| pending == request) {
                    self.in_flight.remove(index);
                }
            }
            FormEffect::Submit(_) => {
                if self.submission == SubmissionStatus::Pending {
                    self.submission = SubmissionStatus::Idle;
                }
            }
        }
    }

    fn apply(&mut self, event: FormEvent) -> Result<Option<FormEffect>, FormError> {
        let effect = match event {
            FormEvent::Opened => Some(FormEffect::Lookup(self.cascade.load_divisions())),
            FormEvent::DivisionSelected(value) => self
                .cascade
                .select_division(&value)?
                .map(FormEffect::Lookup),
            FormEvent::DistrictSelected(value) => self
                .cascade
                .select_district(&value)?
                .map(FormEffect::Lookup),
            FormEvent::UpazilaSelected(value) => {
                self.cascade.select_upazila(&value)?;
                None
            }
            FormEvent::UnionChanged(text) => {
                self.cascade.set_union(text);
                None
            }
            FormEvent::MouzaAdded => {
                let position = self.mouzas.add_mouza();
                debug!(position, "mouza added");
                None
            }
            FormEvent::MouzaRemoved(position) => {
                self.mouzas.remove_mouza(position)?;
                debug!(position, remaining = self.mouzas.len(), "mouza removed");
                None
            }
            FormEvent::MouzaFieldEdited {
                position,
                field,
                value,
            } => {
                self.mouzas.update_field(position, field, &value)?;
                None
            }
            FormEvent::SubmitRequested => self.request_submit(),
            FormEvent::LookupCompleted { request, result } => {
                self.finish_lookup(request, result);
                None
            }
            FormEvent::SubmissionCompleted(result) => {
                self.finish_submit(result);
                None
            }
        };
        Ok(effect)
    }

    fn request_submit(&mut self) -> Option<FormEffect> {
        if self.submission == SubmissionStatus::Pending {
            warn!("submit ignored; previous submission still pending");
            return None;
        }
        let payload = build_payload(self.cascade.selection(), &self.mouzas.snapshot());
        self.submission = SubmissionStatus::Pending;
        Some(FormEffect::Submit(payload))
    }

    fn finish_lookup(&mut self, request: LookupRequest, result: Result<Vec<String>, DirectoryError>) {
        if let Some(index) = self.in_flight.iter().position(|pending| *pending == request) {
            self.in_flight.remove(index);
        }

        match self.cascade.on_lookup_completed(&request, result) {
            LookupOutcome::Applied { level, count } => {
                debug!(%level, count, "lookup applied");
            }
            LookupOutcome::Stale { level } => {
                debug!(%level, ?request, "discarding stale lookup response");
            }
            LookupOutcome::Failed { level, error } => {
                warn!(%level, %error, "lookup failed");
                self.notice = Some(Notice::new(
                    NoticeKind::NetworkFailure,
                    format!("Could not load {level} list; reselect to retry. ({error})"),
                ));
            }
        }
    }

    fn finish_submit(&mut self, result: Result<SubmissionReceipt, SubmitError>) {
        match result {
            Ok(receipt) => {
                info!(status = receipt.status, "form submitted");
                self.submission = SubmissionStatus::Succeeded {
                    message: SUBMIT_SUCCESS_MESSAGE.to_string(),
                };
                self.notice = Some(Notice::new(NoticeKind::Success, SUBMIT_SUCCESS_MESSAGE));
            }
            Err(SubmitError::ServerRejection { status, message }) => {
                self.notice = Some(Notice::new(
                    NoticeKind::ServerRejection,
                    format!("Error submitting form: {message}"),
                ));
                self.submission = SubmissionStatus::Rejected { status, message };
            }
            Err(SubmitError::NetworkFailure(reason)) => {
                warn!(%reason, "submission transport failure");
                self.submission = SubmissionStatus::Idle;
                self.notice = Some(Notice::new(
                    NoticeKind::NetworkFailure,
                    SUBMIT_TRANSPORT_FAILURE_MESSAGE,
                ));
            }
        }
    }

    pub fn view(&self) -> FormView {
        FormView {
            revision: self.revision,
            divisions: self.cascade.division_options().to_vec(),
            districts: self.cascade.district_options().to_vec(),
            upazilas: self.cascade.upazila_options().to_vec(),
            selection: self.cascade.selection().clone(),
            mouzas: self.mouzas.snapshot(),
            submission: self.submission.clone(),
            notice: self.notice.clone(),
            rejection: self.rejection.clone(),
            pending_lookups: self.in_flight.len(),
        }
    }
}

#[cfg(test)]
#[path = "tests/screen_tests.rs"]
mod tests;
