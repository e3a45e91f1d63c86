use {
    super::{payment::CheckoutMode, provider::PaymentProvider},
    thiserror::Error,
};

/// Boxed cause attached to errors that wrap an adapter or parser failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = UnipayError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    ProviderResolution,
    Payment,
    Refund,
    Webhook,
    Validation,
}

#[derive(Debug, Error)]
pub enum UnipayError {
    // ── configuration ─────────────────────────────────────────────────────
    #[error("at least one payment adapter must be configured")]
    MissingProvider,

    #[error("an adapter for provider `{provider}` is already registered")]
    DuplicateProvider { provider: PaymentProvider },

    #[error("invalid resolution strategy `{strategy}`: {reason}")]
    InvalidResolutionStrategy { strategy: String, reason: String },

    #[error("invalid configuration value for {key}: {reason}")]
    InvalidConfiguration { key: String, reason: String },

    // ── provider resolution ───────────────────────────────────────────────
    #[error("no payment provider available: {reason}")]
    NoProviderAvailable { reason: String },

    #[error("payment provider `{provider}` is not configured")]
    ProviderNotFound { provider: PaymentProvider },

    #[error("provider `{provider}` does not support currency {currency}")]
    UnsupportedCurrency {
        provider: PaymentProvider,
        currency: String,
    },

    #[error("provider `{provider}` does not support {mode} checkout")]
    UnsupportedCheckoutMode {
        provider: PaymentProvider,
        mode: CheckoutMode,
    },

    // ── payment ───────────────────────────────────────────────────────────
    #[error("payment creation failed on `{provider}`: {message}")]
    PaymentCreationFailed {
        provider: PaymentProvider,
        message: String,
        provider_code: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("payment `{provider_payment_id}` not found on `{provider}`")]
    PaymentNotFound {
        provider: PaymentProvider,
        provider_payment_id: String,
    },

    #[error("payment retrieval failed on `{provider}`: {message}")]
    PaymentRetrievalFailed {
        provider: PaymentProvider,
        message: String,
        provider_code: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    // ── refund ────────────────────────────────────────────────────────────
    #[error("refund creation failed on `{provider}`: {message}")]
    RefundCreationFailed {
        provider: PaymentProvider,
        message: String,
        provider_code: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("refund `{provider_refund_id}` not found on `{provider}`")]
    RefundNotFound {
        provider: PaymentProvider,
        provider_refund_id: String,
    },

    #[error("refund retrieval failed on `{provider}`: {message}")]
    RefundRetrievalFailed {
        provider: PaymentProvider,
        message: String,
        provider_code: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("refund of {requested} exceeds refundable amount {available} on `{provider}`")]
    RefundExceedsAmount {
        provider: PaymentProvider,
        requested: u64,
        available: u64,
    },

    #[error("provider `{provider}` does not support partial refunds")]
    PartialRefundNotSupported { provider: PaymentProvider },

    // ── webhook ───────────────────────────────────────────────────────────
    #[error("invalid webhook signature from `{provider}`: {reason}")]
    WebhookSignatureInvalid {
        provider: PaymentProvider,
        reason: String,
    },

    #[error(
        "webhook timestamp from `{provider}` is {age_seconds}s away from now (tolerance {tolerance_seconds}s)"
    )]
    WebhookTimestampExpired {
        provider: PaymentProvider,
        age_seconds: i64,
        tolerance_seconds: u64,
    },

    #[error("failed to parse `{provider}` webhook: {message}")]
    WebhookParsing {
        provider: PaymentProvider,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("no webhook configuration for provider `{provider}`")]
    WebhookProviderNotConfigured { provider: PaymentProvider },

    // ── validation ────────────────────────────────────────────────────────
    #[error("invalid amount: {reason}")]
    InvalidAmount { amount: u64, reason: String },

    #[error("invalid currency code: {currency:?}")]
    InvalidCurrency { currency: String },

    #[error("invalid {field} {url:?}: {reason}")]
    InvalidUrl {
        field: &'static str,
        url: String,
        reason: String,
    },

    #[error("invalid UniPay ID {value:?}: {reason}")]
    InvalidUnipayId { value: String, reason: String },

    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("invalid metadata: {reason}")]
    InvalidMetadata { reason: String },
}

impl UnipayError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingProvider => "MISSING_PROVIDER",
            Self::DuplicateProvider { .. } => "DUPLICATE_PROVIDER",
            Self::InvalidResolutionStrategy { .. } => "INVALID_RESOLUTION_STRATEGY",
            Self::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            Self::NoProviderAvailable { .. } => "NO_PROVIDER_AVAILABLE",
            Self::ProviderNotFound { .. } => "PROVIDER_NOT_FOUND",
            Self::UnsupportedCurrency { .. } => "UNSUPPORTED_CURRENCY",
            Self::UnsupportedCheckoutMode { .. } => "UNSUPPORTED_CHECKOUT_MODE",
            Self::PaymentCreationFailed { .. } => "PAYMENT_CREATION_FAILED",
            Self::PaymentNotFound { .. } => "PAYMENT_NOT_FOUND",
            Self::PaymentRetrievalFailed { .. } => "PAYMENT_RETRIEVAL_FAILED",
            Self::RefundCreationFailed { .. } => "REFUND_CREATION_FAILED",
            Self::RefundNotFound { .. } => "REFUND_NOT_FOUND",
            Self::RefundRetrievalFailed { .. } => "REFUND_RETRIEVAL_FAILED",
            Self::RefundExceedsAmount { .. } => "REFUND_EXCEEDS_AMOUNT",
            Self::PartialRefundNotSupported { .. } => "PARTIAL_REFUND_NOT_SUPPORTED",
            Self::WebhookSignatureInvalid { .. } => "WEBHOOK_SIGNATURE_INVALID",
            Self::WebhookTimestampExpired { .. } => "WEBHOOK_TIMESTAMP_EXPIRED",
            Self::WebhookParsing { .. } => "WEBHOOK_PARSING_FAILED",
            Self::WebhookProviderNotConfigured { .. } => "WEBHOOK_PROVIDER_NOT_CONFIGURED",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::InvalidCurrency { .. } => "INVALID_CURRENCY",
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::InvalidUnipayId { .. } => "INVALID_UNIPAY_ID",
            Self::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            Self::InvalidMetadata { .. } => "INVALID_METADATA",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingProvider
            | Self::DuplicateProvider { .. }
            | Self::InvalidResolutionStrategy { .. }
            | Self::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            Self::NoProviderAvailable { .. }
            | Self::ProviderNotFound { .. }
            | Self::UnsupportedCurrency { .. }
            | Self::UnsupportedCheckoutMode { .. } => ErrorCategory::ProviderResolution,
            Self::PaymentCreationFailed { .. }
            | Self::PaymentNotFound { .. }
            | Self::PaymentRetrievalFailed { .. } => ErrorCategory::Payment,
            Self::RefundCreationFailed { .. }
            | Self::RefundNotFound { .. }
            | Self::RefundRetrievalFailed { .. }
            | Self::RefundExceedsAmount { .. }
            | Self::PartialRefundNotSupported { .. } => ErrorCategory::Refund,
            Self::WebhookSignatureInvalid { .. }
            | Self::WebhookTimestampExpired { .. }
            | Self::WebhookParsing { .. }
            | Self::WebhookProviderNotConfigured { .. } => ErrorCategory::Webhook,
            Self::InvalidAmount { .. }
            | Self::InvalidCurrency { .. }
            | Self::InvalidUrl { .. }
            | Self::InvalidUnipayId { .. }
            | Self::MissingRequiredField { .. }
            | Self::InvalidMetadata { .. } => ErrorCategory::Validation,
        }
    }

    /// Provider the failure is attributed to, when there is one.
    pub fn provider(&self) -> Option<PaymentProvider> {
        match self {
            Self::DuplicateProvider { provider }
            | Self::ProviderNotFound { provider }
            | Self::UnsupportedCurrency { provider, .. }
            | Self::UnsupportedCheckoutMode { provider, .. }
            | Self::PaymentCreationFailed { provider, .. }
            | Self::PaymentNotFound { provider, .. }
            | Self::PaymentRetrievalFailed { provider, .. }
            | Self::RefundCreationFailed { provider, .. }
            | Self::RefundNotFound { provider, .. }
            | Self::RefundRetrievalFailed { provider, .. }
            | Self::RefundExceedsAmount { provider, .. }
            | Self::PartialRefundNotSupported { provider }
            | Self::WebhookSignatureInvalid { provider, .. }
            | Self::WebhookTimestampExpired { provider, .. }
            | Self::WebhookParsing { provider, .. }
            | Self::WebhookProviderNotConfigured { provider } => Some(*provider),
            _ => None,
        }
    }

    /// Vendor error code reported by the gateway, if the adapter captured one.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::PaymentCreationFailed { provider_code, .. }
            | Self::PaymentRetrievalFailed { provider_code, .. }
            | Self::RefundCreationFailed { provider_code, .. }
            | Self::RefundRetrievalFailed { provider_code, .. } => provider_code.as_deref(),
            _ => None,
        }
    }

    pub fn webhook_parsing(
        provider: PaymentProvider,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::WebhookParsing {
            provider,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn invalid_unipay_id(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUnipayId {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
