use {
    super::{
        WebhookCodec,
        payload::{
            EventTypeMap, coerce_amount, coerce_i64, currency_at, parse_json_body, string_at,
            timestamp_or_now,
        },
        payment_status_for, refund_status_for,
        signature::verify_hmac_signature,
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

pub const SIGNATURE_HEADER: &str = "X-Razorpay-Signature";
pub const EVENT_ID_HEADER: &str = "X-Razorpay-Event-Id";

pub const EVENT_TYPES: EventTypeMap = EventTypeMap::new(&[
    ("order.paid", WebhookEventType::PaymentSucceeded),
    ("payment.authorized", WebhookEventType::PaymentProcessing),
    ("payment.captured", WebhookEventType::PaymentSucceeded),
    ("payment.failed", WebhookEventType::PaymentFailed),
    ("refund.created", WebhookEventType::RefundCreated),
    ("refund.processed", WebhookEventType::RefundSucceeded),
    ("refund.failed", WebhookEventType::RefundFailed),
]);

#[derive(Debug, Clone, Copy, Default)]
pub struct RazorpayWebhookCodec;

impl WebhookCodec for RazorpayWebhookCodec {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Razorpay
    }

    fn signature_header(&self) -> &'static str {
        SIGNATURE_HEADER
    }

    fn verify(&self, request: &WebhookRequest, config: &WebhookConfig) -> WebhookVerification {
        match request.header(SIGNATURE_HEADER) {
            Some(signature) => verify_hmac_signature(
                request.raw_body().as_bytes(),
                signature,
                config.signing_secret(),
            ),
            None => WebhookVerification::invalid(WebhookVerificationError::MissingSignature {
                header: SIGNATURE_HEADER,
            }),
        }
    }

    fn parse(&self, request: &WebhookRequest) -> Result<WebhookEvent, UnipayError> {
        let provider = PaymentProvider::Razorpay;
        let raw = parse_json_body(provider, request.raw_body())?;

        let provider_event_type = string_at(&raw, "/event").ok_or_else(|| UnipayError::WebhookParsing {
            provider,
            message: "event is missing `event`".into(),
            source: None,
        })?;
        let event_type = EVENT_TYPES.map(&provider_event_type);
        let created_at = coerce_i64(raw.get("created_at"));

        let payload = match event_type {
            WebhookEventType::Unknown => WebhookPayload::Unknown,
            known if known.is_refund() => WebhookPayload::Refund(refund_data(&raw, known)),
            known => WebhookPayload::Payment(payment_data(&raw, known)),
        };

        // Razorpay sends the event id as a header; bodies replayed without it
        // still get a stable id.
        let provider_event_id = request
            .header(EVENT_ID_HEADER)
            .map(str::to_string)
            .or_else(|| string_at(&raw, "/id"))
            .unwrap_or_else(|| {
                format!(
                    "{provider_event_type}:{}",
                    created_at.map(|t| t.to_string()).unwrap_or_default()
                )
            });

        Ok(WebhookEvent {
            provider,
            event_type,
            provider_event_id,
            provider_event_type,
            timestamp: timestamp_or_now(created_at),
            payload,
            raw,
        })
    }
}

fn payment_data(raw: &Value, event_type: WebhookEventType) -> PaymentEventData {
    let payment = raw.pointer("/payload/payment/entity");
    let order = raw.pointer("/payload/order/entity");

    // Payments are tracked by their order id; a bare payment id is the fallback.
    let order_id = order
        .and_then(|o| string_at(o, "/id"))
        .or_else(|| payment.and_then(|p| string_at(p, "/order_id")));
    let provider_payment_id = order_id
        .clone()
        .or_else(|| payment.and_then(|p| string_at(p, "/id")));

    let source = payment.or(order);
    PaymentEventData {
        unipay_id: provider_payment_id
            .as_deref()
            .and_then(|id| UnipayId::encode(PaymentProvider::Razorpay, id).ok()),
        provider_payment_id,
        status: payment_status_for(event_type),
        amount: coerce_amount(source.and_then(|s| s.get("amount"))),
        currency: source.and_then(|s| currency_at(s, "/currency")),
        order_id: order
            .and_then(|o| string_at(o, "/receipt"))
            .or_else(|| payment.and_then(|p| string_at(p, "/notes/order_id"))),
        failure_reason: payment.and_then(|p| string_at(p, "/error_description")),
    }
}

fn refund_data(raw: &Value, event_type: WebhookEventType) -> RefundEventData {
    let refund = raw.pointer("/payload/refund/entity");
    let provider_refund_id = refund.and_then(|r| string_at(r, "/id"));
    let provider_payment_id = refund.and_then(|r| string_at(r, "/payment_id"));

    RefundEventData {
        unipay_id: provider_refund_id
            .as_deref()
            .and_then(|id| UnipayId::encode(PaymentProvider::Razorpay, id).ok()),
        provider_refund_id,
        unipay_payment_id: provider_payment_id
            .as_deref()
            .and_then(|id| UnipayId::encode(PaymentProvider::Razorpay, id).ok()),
        provider_payment_id,
        status: refund_status_for(event_type),
        amount: coerce_amount(refund.and_then(|r| r.get("amount"))),
        currency: refund.and_then(|r| currency_at(r, "/currency")),
        reason: refund.and_then(|r| string_at(r, "/notes/reason")),
    }
}
