//! The submit lifecycle shared by every form.
//!
//! `Idle -> Pending` when a validated submit starts, `Pending -> Done` once the
//! exchange settles. The submit control is disabled for the whole pending
//! interval and restored by a drop guard, so every exit path re-enables it.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use serde_json::{Map, Value};
use shared::{
    domain::{RawFields, SubmissionRequest},
    protocol::ResponseEnvelope,
};
use tracing::{debug, info, warn};

use crate::{
    error::{FailureMessages, RenderError, SubmitError, TransportError, ValidationError},
    fields::{collect_fields, FieldSpec},
    notify::{BannerNotifier, Notifier},
    schedule::schedule_after,
    surface::{FormSurface, NoticeKind},
    transport::{JsonRequest, Transport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Pending,
    Done,
}

/// Where a form reports validation and submission errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorChannel {
    Notifier,
    /// The surface's error region, hidden again after [`Timings::error_hide`].
    ErrorRegion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub success_reset: Duration,
    pub scroll_delay: Duration,
    pub banner_dismiss: Duration,
    pub error_hide: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            success_reset: Duration::from_millis(3000),
            scroll_delay: Duration::from_millis(400),
            banner_dismiss: Duration::from_millis(5000),
            error_hide: Duration::from_millis(8000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormDefinition {
    pub name: &'static str,
    pub endpoint: &'static str,
    pub fields: Vec<FieldSpec>,
    pub loading_label: String,
    pub accept_json: bool,
    pub error_channel: ErrorChannel,
    pub messages: FailureMessages,
}

/// Everything from a successful response except `success` and `error`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuccessPayload {
    pub body: Map<String, Value>,
    pub recommendations: Vec<String>,
}

impl SuccessPayload {
    pub fn decode<T: serde::de::DeserializeOwned>(
        &self,
        form: &'static str,
    ) -> Result<T, RenderError> {
        serde_json::from_value(Value::Object(self.body.clone())).map_err(|err| RenderError {
            form,
            reason: err.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResult {
    Success(SuccessPayload),
    Failure(String),
}

impl SubmissionResult {
    pub fn from_envelope(envelope: ResponseEnvelope, fallback: &str) -> Self {
        if envelope.success {
            SubmissionResult::Success(SuccessPayload {
                body: envelope.rest,
                recommendations: envelope.recommendations.unwrap_or_default(),
            })
        } else {
            let reason = envelope
                .error
                .filter(|reason| !reason.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            SubmissionResult::Failure(reason)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Rejected(ValidationError),
    /// A submission was already pending; nothing changed.
    Busy,
    Succeeded,
    Failed(SubmitError),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded)
    }
}

pub struct RenderContext<'a> {
    pub surface: &'a Arc<dyn FormSurface>,
    pub notifier: &'a dyn Notifier,
    pub timings: &'a Timings,
}

/// Endpoint-specific success rendering.
pub trait SuccessRenderer: Send + Sync {
    fn render(&self, payload: &SuccessPayload, ctx: &RenderContext<'_>)
        -> Result<(), RenderError>;
}

pub struct FormController {
    definition: FormDefinition,
    transport: Arc<dyn Transport>,
    surface: Arc<dyn FormSurface>,
    renderer: Arc<dyn SuccessRenderer>,
    notifier: Option<Arc<dyn Notifier>>,
    timings: Timings,
    state: Mutex<ControllerState>,
    error_generation: Arc<AtomicU64>,
}

impl FormController {
    pub fn new(
        definition: FormDefinition,
        transport: Arc<dyn Transport>,
        surface: Arc<dyn FormSurface>,
        renderer: Arc<dyn SuccessRenderer>,
    ) -> Self {
        Self {
            definition,
            transport,
            surface,
            renderer,
            notifier: None,
            timings: Timings::default(),
            state: Mutex::new(ControllerState::Idle),
            error_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn state(&self) -> ControllerState {
        *self.lock_state()
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notifier(&self) -> Arc<dyn Notifier> {
        match &self.notifier {
            Some(notifier) => Arc::clone(notifier),
            None => Arc::new(BannerNotifier::new(
                Arc::clone(&self.surface),
                self.timings.banner_dismiss,
            )),
        }
    }

    /// Handles one user-initiated submit.
    pub async fn submit(&self, raw: &RawFields) -> SubmitOutcome {
        let form = self.definition.name;
        if self.state() == ControllerState::Pending {
            warn!(form, "form: submit ignored while a request is pending");
            return SubmitOutcome::Busy;
        }
        debug!(form, "form: submit received");

        if self.definition.error_channel == ErrorChannel::ErrorRegion {
            self.hide_error();
        }

        let request = match collect_fields(&self.definition.fields, raw) {
            Ok(request) => request,
            Err(err) => {
                info!(form, field = %err.field, "form: validation rejected submit");
                self.report(&err.message);
                return SubmitOutcome::Rejected(err);
            }
        };

        let Some(_pending) = PendingGuard::begin(self) else {
            return SubmitOutcome::Busy;
        };

        let notifier = self.notifier();
        let settled = match self.exchange(&request).await {
            Ok(SubmissionResult::Success(payload)) => {
                let ctx = RenderContext {
                    surface: &self.surface,
                    notifier: notifier.as_ref(),
                    timings: &self.timings,
                };
                self.renderer
                    .render(&payload, &ctx)
                    .map_err(|err| SubmitError::from(TransportError::from(err)))
            }
            Ok(SubmissionResult::Failure(reason)) => Err(SubmitError::Application(reason)),
            Err(err) => Err(err),
        };

        match settled {
            Ok(()) => {
                info!(form, "form: submission succeeded");
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                warn!(form, kind = ?err.kind(), error = %err, "form: submission failed");
                self.report(&err.user_message(&self.definition.messages));
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn exchange(&self, request: &SubmissionRequest) -> Result<SubmissionResult, SubmitError> {
        let body = serde_json::to_value(request)
            .map_err(|err| TransportError::Request(format!("cannot encode request: {err}")))?;
        let reply = self
            .transport
            .send(
                JsonRequest::post(self.definition.endpoint, body)
                    .accept_json(self.definition.accept_json),
            )
            .await?;
        info!(
            form = self.definition.name,
            status = reply.status,
            "form: response received"
        );

        let envelope = reply.into_envelope()?;
        Ok(SubmissionResult::from_envelope(
            envelope,
            &self.definition.messages.application_fallback,
        ))
    }

    fn report(&self, message: &str) {
        match self.definition.error_channel {
            ErrorChannel::Notifier => self.notifier().notify(message, NoticeKind::Error),
            ErrorChannel::ErrorRegion => self.show_error(message),
        }
    }

    fn show_error(&self, message: &str) {
        let generation = self.error_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.surface.show_error(message);

        let current = Arc::clone(&self.error_generation);
        let surface = Arc::clone(&self.surface);
        schedule_after(self.timings.error_hide, move || {
            if current.load(Ordering::SeqCst) == generation {
                surface.hide_error();
            }
        });
    }

    fn hide_error(&self) {
        self.error_generation.fetch_add(1, Ordering::SeqCst);
        self.surface.hide_error();
    }
}

/// Holds the submit control locked while a request is in flight.
struct PendingGuard<'a> {
    controller: &'a FormController,
    original_label: String,
}

impl<'a> PendingGuard<'a> {
    fn begin(controller: &'a FormController) -> Option<Self> {
        {
            let mut state = controller.lock_state();
            if *state == ControllerState::Pending {
                return None;
            }
            *state = ControllerState::Pending;
        }

        let surface = &controller.surface;
        let original_label = surface.submit_label();
        surface.set_submit_label(&controller.definition.loading_label);
        surface.set_submit_enabled(false);
        Some(Self {
            controller,
            original_label,
        })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let surface = &self.controller.surface;
        surface.set_submit_label(&self.original_label);
        surface.set_submit_enabled(true);
        *self.controller.lock_state() = ControllerState::Done;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
