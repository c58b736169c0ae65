use std::sync::Arc;

use shared::protocol::{PredictionResponse, PREDICT_PATH};

use crate::{
    controller::{
        ErrorChannel, FormController, FormDefinition, RenderContext, SuccessPayload,
        SuccessRenderer,
    },
    error::{FailureMessages, RenderError},
    fields::{FieldKind, FieldSpec, Rule},
    schedule::schedule_after,
    surface::FormSurface,
    transport::Transport,
};

pub const RESULTS_SECTION: &str = "results_section";
pub const DISCOUNT_VALUE: &str = "discount_value";
pub const PLATFORM_BADGE: &str = "platform_badge";
pub const CONFIDENCE_VALUE: &str = "confidence_value";
pub const ORIGINAL_PRICE: &str = "original_price";
pub const DISCOUNTED_PRICE: &str = "discounted_price";
pub const SAVINGS_AMOUNT: &str = "savings_amount";
pub const MODEL_NAME: &str = "model_name";
pub const RECOMMENDATIONS_LIST: &str = "recommendations_list";

const DEFAULT_MODEL_NAME: &str = "ML Model";

pub fn definition() -> FormDefinition {
    FormDefinition {
        name: "prediction",
        endpoint: PREDICT_PATH,
        fields: vec![
            FieldSpec::text("category", "Category").required(),
            FieldSpec::new("budget", "Budget", FieldKind::Number)
                .required()
                .rule(Rule::PositiveNumber),
            FieldSpec::new("platform", "Platform", FieldKind::OptionalText),
        ],
        loading_label: "Analyzing...".into(),
        accept_json: true,
        error_channel: ErrorChannel::ErrorRegion,
        messages: FailureMessages {
            server_error: "Server error. Please check if models are loaded correctly.".into(),
            application_fallback: "Prediction failed. Please try again.".into(),
            ..FailureMessages::default()
        },
    }
}

fn percent(value: f64) -> String {
    format!("{value}%")
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

pub struct PredictionSuccess;

impl SuccessRenderer for PredictionSuccess {
    fn render(&self, payload: &SuccessPayload, ctx: &RenderContext<'_>) -> Result<(), RenderError> {
        let prediction: PredictionResponse = payload.decode("prediction")?;
        let surface = ctx.surface;

        surface.set_visible(RESULTS_SECTION, true);
        surface.set_text(DISCOUNT_VALUE, &percent(prediction.predicted_discount));
        surface.set_text(PLATFORM_BADGE, &prediction.best_platform);
        surface.set_text(CONFIDENCE_VALUE, &percent(prediction.platform_confidence));
        surface.set_text(ORIGINAL_PRICE, &money(prediction.estimated_price));
        surface.set_text(DISCOUNTED_PRICE, &money(prediction.discounted_price));
        surface.set_text(SAVINGS_AMOUNT, &money(prediction.savings));
        surface.set_text(
            MODEL_NAME,
            prediction
                .model_used
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_MODEL_NAME),
        );
        surface.set_list(RECOMMENDATIONS_LIST, &payload.recommendations);

        let surface = Arc::clone(surface);
        schedule_after(ctx.timings.scroll_delay, move || {
            surface.scroll_to(RESULTS_SECTION);
        });
        Ok(())
    }
}

pub fn controller(transport: Arc<dyn Transport>, surface: Arc<dyn FormSurface>) -> FormController {
    FormController::new(definition(), transport, surface, Arc::new(PredictionSuccess))
}
