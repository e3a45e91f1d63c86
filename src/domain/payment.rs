use {
    super::{error::UnipayError, id::UnipayId, money::Money, provider::PaymentProvider},
    bon::Builder,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, fmt},
};

pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    /// Customer is redirected to a gateway-hosted page.
    Hosted,
    /// Frontend completes the payment with the gateway's SDK.
    Sdk,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hosted => "hosted",
            Self::Sdk => "sdk",
        }
    }
}

impl fmt::Display for CheckoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment method family a caller would like offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    Cards,
    Upi,
    NetBanking,
    Wallets,
    BankTransfer,
    PayLater,
    Emi,
}

impl PaymentMethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cards => "cards",
            Self::Upi => "upi",
            Self::NetBanking => "net_banking",
            Self::Wallets => "wallets",
            Self::BankTransfer => "bank_transfer",
            Self::PayLater => "pay_later",
            Self::Emi => "emi",
        }
    }
}

impl fmt::Display for PaymentMethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Builder, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[builder(into)]
    pub email: Option<String>,
    #[builder(into)]
    pub phone: Option<String>,
    #[builder(into)]
    pub name: Option<String>,
    /// Customer id already known to the gateway.
    #[builder(into)]
    pub customer_id: Option<String>,
}

/// Request to start a payment. Built once, then only read.
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentInput {
    pub money: Money,
    #[builder(into)]
    pub success_url: String,
    #[builder(into)]
    pub cancel_url: String,
    pub customer: Option<CustomerInfo>,
    #[builder(into)]
    pub order_id: Option<String>,
    #[builder(into)]
    pub description: Option<String>,
    #[builder(default)]
    pub metadata: Metadata,
    #[builder(into)]
    pub idempotency_key: Option<String>,
    pub expires_in_seconds: Option<u64>,
    pub preferred_checkout_mode: Option<CheckoutMode>,
    /// Preferred method families. Families the resolved provider does not
    /// declare are dropped before delegation.
    #[builder(default)]
    pub payment_methods: Vec<PaymentMethodType>,
}

/// Refund request. An absent `amount` refunds whatever remains.
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRefundInput {
    pub amount: Option<u64>,
    #[builder(into)]
    pub reason: Option<String>,
    #[builder(into)]
    pub idempotency_key: Option<String>,
    #[builder(default)]
    pub metadata: Metadata,
}

impl CreateRefundInput {
    pub fn is_partial(&self) -> bool {
        self.amount.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Created,
    Pending,
    RequiresAction,
    Processing,
    Succeeded,
    Failed,
    Cancelled,
    Expired,
    PartiallyRefunded,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Pending => "pending",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::PartiallyRefunded => "partially_refunded",
            Self::Refunded => "refunded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Cancelled | Self::Expired | Self::Refunded
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
    Cancelled,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the customer completes a newly created payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "checkout_mode", rename_all = "lowercase")]
pub enum Checkout {
    Hosted {
        checkout_url: String,
        expires_at: Option<DateTime<Utc>>,
    },
    Sdk {
        /// Opaque payload handed to the gateway's frontend SDK.
        sdk_payload: serde_json::Value,
    },
}

impl Checkout {
    pub fn mode(&self) -> CheckoutMode {
        match self {
            Self::Hosted { .. } => CheckoutMode::Hosted,
            Self::Sdk { .. } => CheckoutMode::Sdk,
        }
    }
}

// ── adapter-facing results (provider ids) ──────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCheckout {
    pub provider_payment_id: String,
    pub status: PaymentStatus,
    pub money: Money,
    pub checkout: Checkout,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPayment {
    pub provider_payment_id: String,
    pub status: PaymentStatus,
    pub money: Money,
    pub metadata: Metadata,
    pub created_at: Option<DateTime<Utc>>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRefund {
    pub provider_refund_id: String,
    pub provider_payment_id: String,
    pub status: RefundStatus,
    pub money: Money,
    pub reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderRefundList {
    pub refunds: Vec<ProviderRefund>,
    pub has_more: bool,
}

// ── caller-facing results (UniPay ids) ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSession {
    pub unipay_id: UnipayId,
    pub provider: PaymentProvider,
    pub provider_payment_id: String,
    pub status: PaymentStatus,
    pub money: Money,
    #[serde(flatten)]
    pub checkout: Checkout,
    pub raw: serde_json::Value,
}

impl PaymentSession {
    pub fn from_provider(
        provider: PaymentProvider,
        created: ProviderCheckout,
    ) -> Result<Self, UnipayError> {
        Ok(Self {
            unipay_id: UnipayId::encode(provider, created.provider_payment_id.as_str())?,
            provider,
            provider_payment_id: created.provider_payment_id,
            status: created.status,
            money: created.money,
            checkout: created.checkout,
            raw: created.raw,
        })
    }

    pub fn checkout_mode(&self) -> CheckoutMode {
        self.checkout.mode()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub unipay_id: UnipayId,
    pub provider: PaymentProvider,
    pub provider_payment_id: String,
    pub status: PaymentStatus,
    pub money: Money,
    pub metadata: Metadata,
    pub created_at: Option<DateTime<Utc>>,
    pub raw: serde_json::Value,
}

impl Payment {
    pub fn from_provider(
        provider: PaymentProvider,
        payment: ProviderPayment,
    ) -> Result<Self, UnipayError> {
        Ok(Self {
            unipay_id: UnipayId::encode(provider, payment.provider_payment_id.as_str())?,
            provider,
            provider_payment_id: payment.provider_payment_id,
            status: payment.status,
            money: payment.money,
            metadata: payment.metadata,
            created_at: payment.created_at,
            raw: payment.raw,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Refund {
    pub unipay_id: UnipayId,
    pub unipay_payment_id: UnipayId,
    pub provider: PaymentProvider,
    pub provider_refund_id: String,
    pub status: RefundStatus,
    pub money: Money,
    pub reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub raw: serde_json::Value,
}

impl Refund {
    pub fn from_provider(
        provider: PaymentProvider,
        refund: ProviderRefund,
    ) -> Result<Self, UnipayError> {
        Ok(Self {
            unipay_id: UnipayId::encode(provider, refund.provider_refund_id.as_str())?,
            unipay_payment_id: UnipayId::encode(provider, refund.provider_payment_id)?,
            provider,
            provider_refund_id: refund.provider_refund_id,
            status: refund.status,
            money: refund.money,
            reason: refund.reason,
            created_at: refund.created_at,
            raw: refund.raw,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefundList {
    pub refunds: Vec<Refund>,
    pub has_more: bool,
}

impl RefundList {
    pub fn from_provider(
        provider: PaymentProvider,
        list: ProviderRefundList,
    ) -> Result<Self, UnipayError> {
        let refunds = list
            .refunds
            .into_iter()
            .map(|r| Refund::from_provider(provider, r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            refunds,
            has_more: list.has_more,
        })
    }
}
