use {
    super::{
        WebhookCodec,
        payload::{
            EventTypeMap, coerce_amount, coerce_i64, currency_at, parse_json_body, string_at,
            timestamp_or_now,
        },
        payment_status_for, refund_status_for,
        signature::verify_timestamped_signature,
    },
    crate::domain::{
        error::UnipayError,
        id::UnipayId,
        provider::PaymentProvider,
        webhook::{
            PaymentEventData, RefundEventData, WebhookConfig, WebhookEvent, WebhookEventType,
            WebhookPayload, WebhookRequest, WebhookVerification, WebhookVerificationError,
        },
    },
    serde_json::Value,
};

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

pub const EVENT_TYPES: EventTypeMap = EventTypeMap::new(&[
    ("payment_intent.created", WebhookEventType::PaymentCreated),
    ("payment_intent.requires_action", WebhookEventType::PaymentPending),
    ("payment_intent.processing", WebhookEventType::PaymentProcessing),
    ("payment_intent.succeeded", WebhookEventType::PaymentSucceeded),
    ("payment_intent.payment_failed", WebhookEventType::PaymentFailed),
    ("payment_intent.canceled", WebhookEventType::PaymentCancelled),
    ("checkout.session.completed", WebhookEventType::PaymentSucceeded),
    ("checkout.session.async_payment_succeeded", WebhookEventType::PaymentSucceeded),
    ("checkout.session.async_payment_failed", WebhookEventType::PaymentFailed),
    ("checkout.session.expired", WebhookEventType::PaymentExpired),
    ("charge.refunded", WebhookEventType::RefundSucceeded),
    ("refund.created", WebhookEventType::RefundCreated),
    ("refund.failed", WebhookEventType::RefundFailed),
]);

#[derive(Debug, Clone, Copy, Default)]
pub struct StripeWebhookCodec;

impl WebhookCodec for StripeWebhookCodec {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Stripe
    }

    fn signature_header(&self) -> &'static str {
        SIGNATURE_HEADER
    }

    fn verify(&self, request: &WebhookRequest, config: &WebhookConfig) -> WebhookVerification {
        let Some(header) = request.header(SIGNATURE_HEADER) else {
            return WebhookVerification::invalid(WebhookVerificationError::MissingSignature {
                header: SIGNATURE_HEADER,
            });
        };
        verify_timestamped_signature(
            request.raw_body(),
            header,
            config.signing_secret(),
            config.timestamp_tolerance_seconds(),
        )
    }

    fn parse(&self, request: &WebhookRequest) -> Result<WebhookEvent, UnipayError> {
        let provider = PaymentProvider::Stripe;
        let raw = parse_json_body(provider, request.raw_body())?;

        let event_id = string_at(&raw, "/id").ok_or_else(|| missing(provider, "id"))?;
        let provider_event_type =
            string_at(&raw, "/type").ok_or_else(|| missing(provider, "type"))?;
        let event_type = match EVENT_TYPES.map(&provider_event_type) {
            // Delayed payment methods complete the session before the money moves.
            WebhookEventType::PaymentSucceeded
                if provider_event_type == CHECKOUT_COMPLETED
                    && string_at(&raw, "/data/object/payment_status").as_deref() == Some("unpaid") =>
            {
                WebhookEventType::PaymentPending
            }
            mapped => mapped,
        };

        let payload = match event_type {
            WebhookEventType::Unknown => WebhookPayload::Unknown,
            known => {
                let object = raw
                    .pointer("/data/object")
                    .ok_or_else(|| missing(provider, "data.object"))?;
                if known.is_refund() {
                    WebhookPayload::Refund(refund_data(object, known))
                } else {
                    WebhookPayload::Payment(payment_data(object, known))
                }
            }
        };

        Ok(WebhookEvent {
            provider,
            event_type,
            provider_event_id: event_id,
            provider_event_type,
            timestamp: timestamp_or_now(coerce_i64(raw.get("created"))),
            payload,
            raw,
        })
    }
}

fn missing(provider: PaymentProvider, field: &str) -> UnipayError {
    UnipayError::WebhookParsing {
        provider,
        message: format!("event is missing `{field}`"),
        source: None,
    }
}

fn payment_data(object: &Value, event_type: WebhookEventType) -> PaymentEventData {
    let provider_payment_id = string_at(object, "/id");
    // Checkout sessions report `amount_total`, payment intents `amount`.
    let amount = object
        .get("amount_total")
        .filter(|v| !v.is_null())
        .or_else(|| object.get("amount"));

    PaymentEventData {
        unipay_id: provider_payment_id
            .as_deref()
            .and_then(|id| UnipayId::encode(PaymentProvider::Stripe, id).ok()),
        provider_payment_id,
        status: payment_status_for(event_type),
        amount: coerce_amount(amount),
        currency: currency_at(object, "/currency"),
        order_id: string_at(object, "/client_reference_id")
            .or_else(|| string_at(object, "/metadata/order_id")),
        failure_reason: string_at(object, "/last_payment_error/message"),
    }
}

fn refund_data(object: &Value, event_type: WebhookEventType) -> RefundEventData {
    let is_charge = object.get("object").and_then(Value::as_str) == Some("charge");

    let (provider_refund_id, amount) = if is_charge {
        (
            string_at(object, "/refunds/data/0/id"),
            coerce_amount(object.get("amount_refunded")),
        )
    } else {
        (string_at(object, "/id"), coerce_amount(object.get("amount")))
    };
    let provider_payment_id = string_at(object, "/payment_intent");

    RefundEventData {
        unipay_id: provider_refund_id
            .as_deref()
            .and_then(|id| UnipayId::encode(PaymentProvider::Stripe, id).ok()),
        provider_refund_id,
        unipay_payment_id: provider_payment_id
            .as_deref()
            .and_then(|id| UnipayId::encode(PaymentProvider::Stripe, id).ok()),
        provider_payment_id,
        status: refund_status_for(event_type),
        amount,
        currency: currency_at(object, "/currency"),
        reason: string_at(object, "/reason"),
    }
}
