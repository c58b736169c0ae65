//! Client side of the deal finder: form submission controllers for the
//! contact, prediction and account endpoints.

pub mod catalog;
pub mod controller;
pub mod error;
pub mod fields;
pub mod forms;
pub mod notify;
mod schedule;
pub mod surface;
pub mod transport;

pub use controller::{
    ControllerState, ErrorChannel, FormController, FormDefinition, RenderContext,
    SubmissionResult, SubmitOutcome, SuccessPayload, SuccessRenderer, Timings,
};
pub use error::{FailureKind, FailureMessages, SubmitError, TransportError, ValidationError};
pub use notify::{BannerNotifier, Notifier};
pub use surface::{BannerId, FormSurface, NoticeKind};
pub use transport::{HttpReply, HttpTransport, JsonRequest, Method, Transport};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
