use std::sync::Arc;

use shared::protocol::CONTACT_PATH;

use crate::{
    controller::{
        ErrorChannel, FormController, FormDefinition, RenderContext, SuccessPayload,
        SuccessRenderer,
    },
    error::{FailureMessages, RenderError},
    fields::{FieldSpec, Rule},
    schedule::schedule_after,
    surface::{FormSurface, NoticeKind},
    transport::Transport,
};

pub const FORM_REGION: &str = "contact_form";
pub const SUCCESS_PANEL: &str = "success_message";

pub fn definition() -> FormDefinition {
    FormDefinition {
        name: "contact",
        endpoint: CONTACT_PATH,
        fields: vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::text("email", "Email").required().rule(Rule::Email),
            FieldSpec::text("message", "Message").required(),
        ],
        loading_label: "Sending...".into(),
        accept_json: false,
        error_channel: ErrorChannel::Notifier,
        messages: FailureMessages {
            application_fallback: "Failed to send message. Please try again.".into(),
            ..FailureMessages::default()
        },
    }
}

/// Swaps the form for the success panel, then swaps back and clears the
/// fields once `success_reset` elapses.
pub struct ContactSuccess;

impl SuccessRenderer for ContactSuccess {
    fn render(
        &self,
        _payload: &SuccessPayload,
        ctx: &RenderContext<'_>,
    ) -> Result<(), RenderError> {
        ctx.surface.set_visible(FORM_REGION, false);
        ctx.surface.set_visible(SUCCESS_PANEL, true);
        ctx.notifier
            .notify("Message sent successfully!", NoticeKind::Success);

        let surface = Arc::clone(ctx.surface);
        schedule_after(ctx.timings.success_reset, move || {
            surface.set_visible(FORM_REGION, true);
            surface.set_visible(SUCCESS_PANEL, false);
            surface.reset_fields();
        });
        Ok(())
    }
}

pub fn controller(transport: Arc<dyn Transport>, surface: Arc<dyn FormSurface>) -> FormController {
    FormController::new(definition(), transport, surface, Arc::new(ContactSuccess))
}
