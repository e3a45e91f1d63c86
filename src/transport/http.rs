use {
    super::errors::ApiError,
    crate::{
        domain::{
            provider::PaymentProvider,
            webhook::{HeaderValue, WebhookEvent, WebhookRequest},
        },
        services::orchestrator::PaymentOrchestrator,
    },
    axum::{
        Json, Router,
        extract::{DefaultBodyLimit, Path, State},
        http::HeaderMap,
        routing::post,
    },
    std::sync::Arc,
};

/// Gateway events are typically well under 20 KB.
pub const MAX_WEBHOOK_BODY_BYTES: usize = 64 * 1024;

pub fn webhook_router(orchestrator: Arc<PaymentOrchestrator>) -> Router {
    Router::new()
        .route("/webhooks/{provider}", post(webhook_handler))
        .layer(DefaultBodyLimit::max(MAX_WEBHOOK_BODY_BYTES))
        .with_state(orchestrator)
}

async fn webhook_handler(
    State(orchestrator): State<Arc<PaymentOrchestrator>>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookEvent>, ApiError> {
    let provider: PaymentProvider = provider.parse()?;
    let request = webhook_request(&headers, body);
    let event = orchestrator.handle_webhook(provider, &request)?;
    Ok(Json(event))
}

/// Copies headers verbatim; values that are not valid UTF-8 are dropped.
pub fn webhook_request(headers: &HeaderMap, body: String) -> WebhookRequest {
    let mut request = WebhookRequest::new(body);
    for name in headers.keys() {
        let mut values: Vec<String> = headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let value = match values.len() {
            0 => continue,
            1 => HeaderValue::Single(values.remove(0)),
            _ => HeaderValue::Multiple(values),
        };
        request.insert_header(name.as_str(), value);
    }
    request
}
