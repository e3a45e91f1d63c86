use {
    super::{
        capability::AdapterCapabilities,
        error::UnipayError,
        payment::{
            CreatePaymentInput, CreateRefundInput, ProviderCheckout, ProviderPayment,
            ProviderRefund, ProviderRefundList,
        },
        webhook::{WebhookConfig, WebhookEvent, WebhookRequest, WebhookVerification},
    },
    serde::{Deserialize, Serialize},
    std::{fmt, future::Future, pin::Pin, str::FromStr},
};

/// Known payment gateway tags. The tag is the provider segment of a UniPay ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Razorpay,
    Payu,
    Paytm,
    Phonepe,
    Cashfree,
    Paypal,
}

impl PaymentProvider {
    pub const ALL: [PaymentProvider; 7] = [
        Self::Stripe,
        Self::Razorpay,
        Self::Payu,
        Self::Paytm,
        Self::Phonepe,
        Self::Cashfree,
        Self::Paypal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Razorpay => "razorpay",
            Self::Payu => "payu",
            Self::Paytm => "paytm",
            Self::Phonepe => "phonepe",
            Self::Cashfree => "cashfree",
            Self::Paypal => "paypal",
        }
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment provider: {0:?}")]
pub struct UnknownProvider(pub String);

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Contract every gateway-specific adapter exposes to the orchestrator.
///
/// The orchestrator only calls the async methods after resolution and
/// capability validation succeed. Ids passed in and returned are the
/// provider's own ids; wrapping into UniPay IDs happens in the core.
pub trait PaymentAdapter: Send + Sync {
    fn provider(&self) -> PaymentProvider;

    fn capabilities(&self) -> &AdapterCapabilities;

    fn create_payment<'a>(
        &'a self,
        input: &'a CreatePaymentInput,
    ) -> BoxFuture<'a, Result<ProviderCheckout, UnipayError>>;

    fn get_payment<'a>(
        &'a self,
        provider_payment_id: &'a str,
    ) -> BoxFuture<'a, Result<ProviderPayment, UnipayError>>;

    fn create_refund<'a>(
        &'a self,
        provider_payment_id: &'a str,
        input: Option<&'a CreateRefundInput>,
    ) -> BoxFuture<'a, Result<ProviderRefund, UnipayError>>;

    fn get_refund<'a>(
        &'a self,
        provider_refund_id: &'a str,
    ) -> BoxFuture<'a, Result<ProviderRefund, UnipayError>>;

    fn list_refunds<'a>(
        &'a self,
        provider_payment_id: &'a str,
    ) -> BoxFuture<'a, Result<ProviderRefundList, UnipayError>>;

    /// Must not fail: every outcome is reported through the returned value.
    fn verify_webhook_signature(
        &self,
        request: &WebhookRequest,
        config: &WebhookConfig,
    ) -> WebhookVerification;

    fn parse_webhook_event(&self, request: &WebhookRequest) -> Result<WebhookEvent, UnipayError>;
}
