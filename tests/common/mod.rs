#![allow(dead_code)]

use {
    std::{
        collections::HashMap,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    },
    unipay::{
        adapters::{
            WebhookCodec, razorpay_webhook::RazorpayWebhookCodec,
            signature::{hmac_sha256_hex, sign_timestamped},
            stripe_webhook::StripeWebhookCodec,
        },
        domain::{
            capability::{AdapterCapabilities, AdapterCapability, CapabilityLimits},
            error::UnipayError,
            money::{CurrencyCode, Money},
            payment::{
                Checkout, CheckoutMode, CreatePaymentInput, CreateRefundInput, PaymentMethodType,
                PaymentStatus, ProviderCheckout, ProviderPayment, ProviderRefund, ProviderRefundList,
                RefundStatus,
            },
            provider::{BoxFuture, PaymentAdapter, PaymentProvider},
            webhook::{
                WebhookConfig, WebhookEvent, WebhookRequest, WebhookVerification,
                WebhookVerificationError,
            },
        },
        services::{
            orchestrator::{OrchestratorConfig, PaymentOrchestrator},
            resolution::ResolutionConfig,
        },
    },
};

pub const STRIPE_SECRET: &str = "whsec_test_secret";
pub const RAZORPAY_SECRET: &str = "rzp_webhook_secret";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn currency(code: &str) -> CurrencyCode {
    CurrencyCode::new(code).unwrap()
}

pub fn payment_input(amount: u64, code: &str) -> CreatePaymentInput {
    CreatePaymentInput::builder()
        .money(Money::of(amount, code).unwrap())
        .success_url("https://shop.test/success")
        .cancel_url("https://shop.test/cancel")
        .build()
}

/// Every call that reached an adapter, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreatePayment {
        amount: u64,
        methods: Vec<PaymentMethodType>,
    },
    GetPayment(String),
    CreateRefund { payment: String, amount: Option<u64> },
    GetRefund(String),
    ListRefunds(String),
}

/// In-memory adapter that records calls. Webhooks go through the crate's
/// real codec for the provider when one exists.
pub struct MockAdapter {
    provider: PaymentProvider,
    capabilities: AdapterCapabilities,
    codec: Option<Box<dyn WebhookCodec>>,
    calls: Mutex<Vec<Call>>,
    sequence: AtomicUsize,
    payments: Mutex<HashMap<String, Money>>,
    refunds: Mutex<HashMap<String, ProviderRefund>>,
    fail_creation: bool,
}

impl MockAdapter {
    pub fn new(provider: PaymentProvider, capabilities: AdapterCapabilities) -> Self {
        let codec: Option<Box<dyn WebhookCodec>> = match provider {
            PaymentProvider::Stripe => Some(Box::new(StripeWebhookCodec)),
            PaymentProvider::Razorpay => Some(Box::new(RazorpayWebhookCodec)),
            _ => None,
        };
        Self {
            provider,
            capabilities,
            codec,
            calls: Mutex::new(Vec::new()),
            sequence: AtomicUsize::new(0),
            payments: Mutex::new(HashMap::new()),
            refunds: Mutex::new(HashMap::new()),
            fail_creation: false,
        }
    }

    /// Gateway that rejects every payment creation.
    pub fn failing(mut self) -> Self {
        self.fail_creation = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}_{n}")
    }
}

pub fn stripe() -> MockAdapter {
    MockAdapter::new(
        PaymentProvider::Stripe,
        AdapterCapabilities::new(
            PaymentProvider::Stripe,
            [
                AdapterCapability::HostedCheckout,
                AdapterCapability::PartialRefund,
                AdapterCapability::FullRefund,
                AdapterCapability::MultipleRefunds,
                AdapterCapability::RefundListing,
                AdapterCapability::Webhooks,
                AdapterCapability::Metadata,
                AdapterCapability::Cards,
            ],
            ["USD", "EUR", "GBP", "INR"].map(currency),
        )
        .with_limits(CapabilityLimits::builder().max_metadata_keys(2).build()),
    )
}

pub fn razorpay() -> MockAdapter {
    MockAdapter::new(
        PaymentProvider::Razorpay,
        AdapterCapabilities::new(
            PaymentProvider::Razorpay,
            [
                AdapterCapability::HostedCheckout,
                AdapterCapability::SdkCheckout,
                AdapterCapability::PartialRefund,
                AdapterCapability::FullRefund,
                AdapterCapability::Webhooks,
                AdapterCapability::Upi,
                AdapterCapability::Cards,
            ],
            ["INR"].map(currency),
        )
        .with_limits(CapabilityLimits::builder().min_amount(100).build()),
    )
}

/// SDK-only gateway without partial refunds.
pub fn paytm() -> MockAdapter {
    MockAdapter::new(
        PaymentProvider::Paytm,
        AdapterCapabilities::new(
            PaymentProvider::Paytm,
            [
                AdapterCapability::SdkCheckout,
                AdapterCapability::FullRefund,
                AdapterCapability::Upi,
                AdapterCapability::Wallets,
            ],
            ["INR"].map(currency),
        ),
    )
}

impl PaymentAdapter for MockAdapter {
    fn provider(&self) -> PaymentProvider {
        self.provider
    }

    fn capabilities(&self) -> &AdapterCapabilities {
        &self.capabilities
    }

    fn create_payment<'a>(
        &'a self,
        input: &'a CreatePaymentInput,
    ) -> BoxFuture<'a, Result<ProviderCheckout, UnipayError>> {
        Box::pin(async move {
            self.record(Call::CreatePayment {
                amount: input.money.amount().minor_units(),
                methods: input.payment_methods.clone(),
            });
            if self.fail_creation {
                return Err(UnipayError::PaymentCreationFailed {
                    provider: self.provider,
                    message: "card_declined".into(),
                    provider_code: Some("card_declined".into()),
                    source: None,
                });
            }

            let id = self.next_id("pay");
            self.payments
                .lock()
                .unwrap()
                .insert(id.clone(), input.money.clone());

            let sdk_preferred = input.preferred_checkout_mode == Some(CheckoutMode::Sdk)
                || !self.capabilities.supports(AdapterCapability::HostedCheckout);
            let checkout = if sdk_preferred {
                Checkout::Sdk {
                    sdk_payload: serde_json::json!({ "order_id": id }),
                }
            } else {
                Checkout::Hosted {
                    checkout_url: format!("https://{}.test/checkout/{id}", self.provider),
                    expires_at: None,
                }
            };

            Ok(ProviderCheckout {
                provider_payment_id: id,
                status: PaymentStatus::Created,
                money: input.money.clone(),
                checkout,
                raw: serde_json::json!({}),
            })
        })
    }

    fn get_payment<'a>(
        &'a self,
        provider_payment_id: &'a str,
    ) -> BoxFuture<'a, Result<ProviderPayment, UnipayError>> {
        Box::pin(async move {
            self.record(Call::GetPayment(provider_payment_id.to_string()));
            let money = self
                .payments
                .lock()
                .unwrap()
                .get(provider_payment_id)
                .cloned()
                .ok_or_else(|| UnipayError::PaymentNotFound {
                    provider: self.provider,
                    provider_payment_id: provider_payment_id.to_string(),
                })?;
            Ok(ProviderPayment {
                provider_payment_id: provider_payment_id.to_string(),
                status: PaymentStatus::Succeeded,
                money,
                metadata: Default::default(),
                created_at: None,
                raw: serde_json::json!({}),
            })
        })
    }

    fn create_refund<'a>(
        &'a self,
        provider_payment_id: &'a str,
        input: Option<&'a CreateRefundInput>,
    ) -> BoxFuture<'a, Result<ProviderRefund, UnipayError>> {
        Box::pin(async move {
            let amount = input.and_then(|i| i.amount);
            self.record(Call::CreateRefund {
                payment: provider_payment_id.to_string(),
                amount,
            });
            let paid = self
                .payments
                .lock()
                .unwrap()
                .get(provider_payment_id)
                .cloned()
                .ok_or_else(|| UnipayError::PaymentNotFound {
                    provider: self.provider,
                    provider_payment_id: provider_payment_id.to_string(),
                })?;

            let available = paid.amount().minor_units();
            let requested = amount.unwrap_or(available);
            if requested > available {
                return Err(UnipayError::RefundExceedsAmount {
                    provider: self.provider,
                    requested,
                    available,
                });
            }

            let refund = ProviderRefund {
                provider_refund_id: self.next_id("rfnd"),
                provider_payment_id: provider_payment_id.to_string(),
                status: RefundStatus::Pending,
                money: Money::new(requested, paid.currency().clone()),
                reason: input.and_then(|i| i.reason.clone()),
                created_at: None,
                raw: serde_json::json!({}),
            };
            self.refunds
                .lock()
                .unwrap()
                .insert(refund.provider_refund_id.clone(), refund.clone());
            Ok(refund)
        })
    }

    fn get_refund<'a>(
        &'a self,
        provider_refund_id: &'a str,
    ) -> BoxFuture<'a, Result<ProviderRefund, UnipayError>> {
        Box::pin(async move {
            self.record(Call::GetRefund(provider_refund_id.to_string()));
            self.refunds
                .lock()
                .unwrap()
                .get(provider_refund_id)
                .cloned()
                .ok_or_else(|| UnipayError::RefundNotFound {
                    provider: self.provider,
                    provider_refund_id: provider_refund_id.to_string(),
                })
        })
    }

    fn list_refunds<'a>(
        &'a self,
        provider_payment_id: &'a str,
    ) -> BoxFuture<'a, Result<ProviderRefundList, UnipayError>> {
        Box::pin(async move {
            self.record(Call::ListRefunds(provider_payment_id.to_string()));
            let mut refunds: Vec<ProviderRefund> = self
                .refunds
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.provider_payment_id == provider_payment_id)
                .cloned()
                .collect();
            refunds.sort_by(|a, b| a.provider_refund_id.cmp(&b.provider_refund_id));
            Ok(ProviderRefundList {
                refunds,
                has_more: false,
            })
        })
    }

    fn verify_webhook_signature(
        &self,
        request: &WebhookRequest,
        config: &WebhookConfig,
    ) -> WebhookVerification {
        match &self.codec {
            Some(codec) => codec.verify(request, config),
            None => WebhookVerification::invalid(WebhookVerificationError::MalformedSignature {
                reason: "webhooks not supported".into(),
            }),
        }
    }

    fn parse_webhook_event(&self, request: &WebhookRequest) -> Result<WebhookEvent, UnipayError> {
        match &self.codec {
            Some(codec) => codec.parse(request),
            None => Err(UnipayError::WebhookParsing {
                provider: self.provider,
                message: "webhooks not supported".into(),
                source: None,
            }),
        }
    }
}

/// Registers the given adapters and webhook secrets for both mock codecs.
pub fn orchestrator(
    adapters: &[Arc<MockAdapter>],
    resolution: ResolutionConfig,
) -> Result<PaymentOrchestrator, UnipayError> {
    let webhooks = adapters
        .iter()
        .filter_map(|a| match a.provider() {
            PaymentProvider::Stripe => Some(WebhookConfig::new(PaymentProvider::Stripe, STRIPE_SECRET)),
            PaymentProvider::Razorpay => {
                Some(WebhookConfig::new(PaymentProvider::Razorpay, RAZORPAY_SECRET))
            }
            _ => None,
        })
        .collect::<Vec<_>>();

    PaymentOrchestrator::new(
        OrchestratorConfig::new(
            adapters
                .iter()
                .map(|a| Arc::clone(a) as Arc<dyn PaymentAdapter>),
        )
        .with_resolution(resolution)
        .with_webhooks(webhooks),
    )
}

pub fn stripe_request(body: &str, secret: &str, timestamp: i64) -> WebhookRequest {
    let header = sign_timestamped(secret, timestamp, body).unwrap();
    WebhookRequest::new(body).with_header("Stripe-Signature", header)
}

pub fn razorpay_request(body: &str, secret: &str) -> WebhookRequest {
    let signature = hmac_sha256_hex(secret, body.as_bytes()).unwrap();
    WebhookRequest::new(body)
        .with_header("X-Razorpay-Signature", signature)
        .with_header("X-Razorpay-Event-Id", "evt_rzp_1")
}

pub fn stripe_payment_succeeded(payment_intent: &str, created: i64) -> String {
    serde_json::json!({
        "id": "evt_stripe_1",
        "type": "payment_intent.succeeded",
        "created": created,
        "data": {"object": {
            "id": payment_intent,
            "object": "payment_intent",
            "amount": 4200,
            "currency": "usd",
            "metadata": {"order_id": "order_7"}
        }}
    })
    .to_string()
}
