//! Choice lists for the prediction form.

use serde::de::DeserializeOwned;
use shared::protocol::{
    CategoriesResponse, PlatformsResponse, CATEGORIES_PATH, PLATFORMS_PATH,
};
use tracing::debug;

use crate::{
    controller::{SubmissionResult, SuccessPayload},
    error::{SubmitError, TransportError},
    transport::{JsonRequest, Transport},
};

const LOOKUP_FALLBACK: &str = "Failed to load options. Please try again.";

pub async fn fetch_categories(transport: &dyn Transport) -> Result<Vec<String>, SubmitError> {
    let response: CategoriesResponse = fetch(transport, CATEGORIES_PATH, "categories").await?;
    Ok(response.categories)
}

pub async fn fetch_platforms(transport: &dyn Transport) -> Result<Vec<String>, SubmitError> {
    let response: PlatformsResponse = fetch(transport, PLATFORMS_PATH, "platforms").await?;
    Ok(response.platforms)
}

async fn fetch<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: &str,
    lookup: &'static str,
) -> Result<T, SubmitError> {
    let envelope = transport.send(JsonRequest::get(path)).await?.into_envelope()?;
    let payload: SuccessPayload = match SubmissionResult::from_envelope(envelope, LOOKUP_FALLBACK) {
        SubmissionResult::Success(payload) => payload,
        SubmissionResult::Failure(reason) => return Err(SubmitError::Application(reason)),
    };
    debug!(lookup, "catalog: options received");
    payload
        .decode(lookup)
        .map_err(|err| SubmitError::from(TransportError::from(err)))
}
