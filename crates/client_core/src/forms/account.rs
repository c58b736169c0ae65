//! Login and signup. The prediction endpoint only answers for a signed-in
//! session, so these share the transport (and its cookie store) with it.

use std::sync::Arc;

use shared::protocol::{LoginResponse, LOGIN_PATH, SIGNUP_PATH};

use crate::{
    controller::{
        ErrorChannel, FormController, FormDefinition, RenderContext, SuccessPayload,
        SuccessRenderer,
    },
    error::{FailureMessages, RenderError},
    fields::{FieldKind, FieldSpec, Rule},
    surface::{FormSurface, NoticeKind},
    transport::Transport,
};

pub const SIGNED_IN_USER: &str = "signed_in_user";

pub fn login_definition() -> FormDefinition {
    FormDefinition {
        name: "login",
        endpoint: LOGIN_PATH,
        fields: vec![
            FieldSpec::text("email", "Email").required().rule(Rule::Email),
            FieldSpec::new("password", "Password", FieldKind::Secret).required(),
            FieldSpec::new("remember", "Remember me", FieldKind::Flag),
        ],
        loading_label: "Signing in...".into(),
        accept_json: true,
        error_channel: ErrorChannel::Notifier,
        messages: FailureMessages {
            application_fallback: "Login failed. Please try again.".into(),
            ..FailureMessages::default()
        },
    }
}

pub fn signup_definition() -> FormDefinition {
    FormDefinition {
        name: "signup",
        endpoint: SIGNUP_PATH,
        fields: vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::text("email", "Email").required().rule(Rule::Email),
            FieldSpec::new("password", "Password", FieldKind::Secret).required(),
        ],
        loading_label: "Creating account...".into(),
        accept_json: true,
        error_channel: ErrorChannel::Notifier,
        messages: FailureMessages {
            application_fallback: "Signup failed. Please try again.".into(),
            ..FailureMessages::default()
        },
    }
}

pub struct LoginSuccess;

impl SuccessRenderer for LoginSuccess {
    fn render(&self, payload: &SuccessPayload, ctx: &RenderContext<'_>) -> Result<(), RenderError> {
        let login: LoginResponse = payload.decode("login")?;
        ctx.surface.set_text(SIGNED_IN_USER, &login.user.email);
        ctx.notifier
            .notify(&format!("Signed in as {}", login.user.email), NoticeKind::Success);
        Ok(())
    }
}

pub struct SignupSuccess;

impl SuccessRenderer for SignupSuccess {
    fn render(&self, payload: &SuccessPayload, ctx: &RenderContext<'_>) -> Result<(), RenderError> {
        let message = payload
            .body
            .get("message")
            .and_then(|value| value.as_str())
            .unwrap_or("Account created successfully");
        ctx.notifier.notify(message, NoticeKind::Success);
        Ok(())
    }
}

pub fn login_controller(
    transport: Arc<dyn Transport>,
    surface: Arc<dyn FormSurface>,
) -> FormController {
    FormController::new(login_definition(), transport, surface, Arc::new(LoginSuccess))
}

pub fn signup_controller(
    transport: Arc<dyn Transport>,
    surface: Arc<dyn FormSurface>,
) -> FormController {
    FormController::new(signup_definition(), transport, surface, Arc::new(SignupSuccess))
}
