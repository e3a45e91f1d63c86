use {
    super::{
        money::CurrencyCode,
        payment::{CheckoutMode, PaymentMethodType},
        provider::PaymentProvider,
    },
    bon::Builder,
    serde::{Deserialize, Serialize},
    std::collections::BTreeSet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterCapability {
    HostedCheckout,
    SdkCheckout,
    PartialRefund,
    FullRefund,
    MultipleRefunds,
    RefundListing,
    Webhooks,
    IdempotencyKey,
    PaymentExpiry,
    Metadata,
    // payment method families
    Cards,
    Upi,
    NetBanking,
    Wallets,
    BankTransfer,
    PayLater,
    Emi,
}

impl From<CheckoutMode> for AdapterCapability {
    fn from(mode: CheckoutMode) -> Self {
        match mode {
            CheckoutMode::Hosted => Self::HostedCheckout,
            CheckoutMode::Sdk => Self::SdkCheckout,
        }
    }
}

impl From<PaymentMethodType> for AdapterCapability {
    fn from(method: PaymentMethodType) -> Self {
        match method {
            PaymentMethodType::Cards => Self::Cards,
            PaymentMethodType::Upi => Self::Upi,
            PaymentMethodType::NetBanking => Self::NetBanking,
            PaymentMethodType::Wallets => Self::Wallets,
            PaymentMethodType::BankTransfer => Self::BankTransfer,
            PaymentMethodType::PayLater => Self::PayLater,
            PaymentMethodType::Emi => Self::Emi,
        }
    }
}

/// Numeric limits a gateway enforces. `None` means unbounded.
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityLimits {
    pub min_amount: Option<u64>,
    pub max_amount: Option<u64>,
    pub max_metadata_keys: Option<usize>,
    pub max_metadata_value_length: Option<usize>,
}

/// Static description of what an adapter can do. Supplied once at
/// registration and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterCapabilities {
    provider: PaymentProvider,
    capabilities: BTreeSet<AdapterCapability>,
    supported_currencies: BTreeSet<CurrencyCode>,
    limits: CapabilityLimits,
}

impl AdapterCapabilities {
    pub fn new(
        provider: PaymentProvider,
        capabilities: impl IntoIterator<Item = AdapterCapability>,
        supported_currencies: impl IntoIterator<Item = CurrencyCode>,
    ) -> Self {
        Self {
            provider,
            capabilities: capabilities.into_iter().collect(),
            supported_currencies: supported_currencies.into_iter().collect(),
            limits: CapabilityLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: CapabilityLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn provider(&self) -> PaymentProvider {
        self.provider
    }

    pub fn limits(&self) -> &CapabilityLimits {
        &self.limits
    }

    pub fn capabilities(&self) -> impl Iterator<Item = AdapterCapability> + '_ {
        self.capabilities.iter().copied()
    }

    pub fn supported_currencies(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.supported_currencies.iter()
    }

    pub fn supports(&self, capability: AdapterCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn supports_currency(&self, currency: &CurrencyCode) -> bool {
        self.supported_currencies.contains(currency)
    }

    pub fn supports_checkout_mode(&self, mode: CheckoutMode) -> bool {
        self.supports(mode.into())
    }

    pub fn supports_payment_method(&self, method: PaymentMethodType) -> bool {
        self.supports(method.into())
    }
}
