//! Provider-agnostic payment orchestration: one API over many gateways,
//! with provider resolution, capability checks, UniPay IDs and verified
//! webhook normalization.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod services;
pub mod transport;

pub use {
    config::UnipaySettings,
    domain::{
        capability::{AdapterCapabilities, AdapterCapability, CapabilityLimits},
        error::{ErrorCategory, Result, UnipayError},
        id::{UnipayId, decode_unipay_id, encode_unipay_id, try_get_provider},
        money::{CurrencyCode, Money, MoneyAmount},
        payment::{
            Checkout, CheckoutMode, CreatePaymentInput, CreateRefundInput, CustomerInfo, Payment,
            PaymentSession, PaymentStatus, Refund, RefundList, RefundStatus,
        },
        provider::{PaymentAdapter, PaymentProvider},
        webhook::{WebhookConfig, WebhookEvent, WebhookEventType, WebhookPayload, WebhookRequest},
    },
    services::{
        orchestrator::{OrchestratorConfig, PaymentOrchestrator},
        resolution::{AmountRoute, ResolutionConfig, ResolutionStrategy},
    },
};
