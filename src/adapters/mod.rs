//! Gateway-side building blocks adapters delegate to: signature schemes,
//! payload coercion and the webhook codecs of the gateways the crate knows
//! how to normalize.

pub mod payload;
pub mod razorpay_webhook;
pub mod signature;
pub mod stripe_webhook;

use crate::domain::{
    error::UnipayError,
    payment::{PaymentStatus, RefundStatus},
    provider::PaymentProvider,
    webhook::{WebhookConfig, WebhookEvent, WebhookEventType, WebhookRequest, WebhookVerification},
};

/// Verifies and normalizes one gateway's webhooks.
pub trait WebhookCodec: Send + Sync {
    fn provider(&self) -> PaymentProvider;

    fn signature_header(&self) -> &'static str;

    fn verify(&self, request: &WebhookRequest, config: &WebhookConfig) -> WebhookVerification;

    fn parse(&self, request: &WebhookRequest) -> Result<WebhookEvent, UnipayError>;
}

pub(crate) fn payment_status_for(event_type: WebhookEventType) -> PaymentStatus {
    match event_type {
        WebhookEventType::PaymentCreated => PaymentStatus::Created,
        WebhookEventType::PaymentProcessing => PaymentStatus::Processing,
        WebhookEventType::PaymentSucceeded => PaymentStatus::Succeeded,
        WebhookEventType::PaymentFailed => PaymentStatus::Failed,
        WebhookEventType::PaymentCancelled => PaymentStatus::Cancelled,
        WebhookEventType::PaymentExpired => PaymentStatus::Expired,
        _ => PaymentStatus::Pending,
    }
}

pub(crate) fn refund_status_for(event_type: WebhookEventType) -> RefundStatus {
    match event_type {
        WebhookEventType::RefundSucceeded => RefundStatus::Succeeded,
        WebhookEventType::RefundFailed => RefundStatus::Failed,
        _ => RefundStatus::Pending,
    }
}
