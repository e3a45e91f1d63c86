use {
    super::{
        error::UnipayError,
        id::UnipayId,
        money::{CurrencyCode, MoneyAmount},
        payment::{PaymentStatus, RefundStatus},
        provider::PaymentProvider,
    },
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, fmt},
};

pub const DEFAULT_TIMESTAMP_TOLERANCE_SECONDS: u64 = 300;

/// Per-provider webhook settings, looked up at dispatch time.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    provider: PaymentProvider,
    signing_secret: String,
    timestamp_tolerance_seconds: Option<u64>,
}

impl WebhookConfig {
    pub fn new(provider: PaymentProvider, signing_secret: impl Into<String>) -> Self {
        Self {
            provider,
            signing_secret: signing_secret.into(),
            timestamp_tolerance_seconds: None,
        }
    }

    pub fn with_timestamp_tolerance(mut self, seconds: u64) -> Self {
        self.timestamp_tolerance_seconds = Some(seconds);
        self
    }

    pub fn provider(&self) -> PaymentProvider {
        self.provider
    }

    pub fn signing_secret(&self) -> &str {
        &self.signing_secret
    }

    pub fn timestamp_tolerance_seconds(&self) -> u64 {
        self.timestamp_tolerance_seconds
            .unwrap_or(DEFAULT_TIMESTAMP_TOLERANCE_SECONDS)
    }
}

// Secrets never reach logs.
impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("provider", &self.provider)
            .field("signing_secret", &"[redacted]")
            .field(
                "timestamp_tolerance_seconds",
                &self.timestamp_tolerance_seconds,
            )
            .finish()
    }
}

/// Frameworks expose headers either as plain strings or as lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(v) => Some(v.as_str()),
            Self::Multiple(values) => values.first().map(String::as_str),
        }
    }
}

/// Inbound webhook exactly as received. `raw_body` must be the bytes the
/// gateway signed, never a re-serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookRequest {
    raw_body: String,
    headers: BTreeMap<String, HeaderValue>,
}

impl WebhookRequest {
    pub fn new(raw_body: impl Into<String>) -> Self {
        Self {
            raw_body: raw_body.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert_header(name, HeaderValue::Single(value.into()));
        self
    }

    pub fn with_header_values(mut self, name: &str, values: Vec<String>) -> Self {
        self.insert_header(name, HeaderValue::Multiple(values));
        self
    }

    pub fn insert_header(&mut self, name: &str, value: HeaderValue) {
        self.headers.insert(name.to_ascii_lowercase(), value);
    }

    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Case-insensitive lookup; list-valued headers yield their first entry.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(HeaderValue::first)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookVerificationError {
    MissingSignature { header: &'static str },
    MalformedSignature { reason: String },
    SignatureMismatch,
    TimestampExpired { age_seconds: i64, tolerance_seconds: u64 },
}

impl fmt::Display for WebhookVerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSignature { header } => write!(f, "missing {header} header"),
            Self::MalformedSignature { reason } => write!(f, "malformed signature: {reason}"),
            Self::SignatureMismatch => write!(f, "signature mismatch"),
            Self::TimestampExpired {
                age_seconds,
                tolerance_seconds,
            } => write!(
                f,
                "timestamp {age_seconds}s away from now exceeds tolerance of {tolerance_seconds}s"
            ),
        }
    }
}

/// Outcome of a signature check. Verification reports, it never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookVerification {
    pub is_valid: bool,
    pub error: Option<WebhookVerificationError>,
}

impl WebhookVerification {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: WebhookVerificationError) -> Self {
        Self {
            is_valid: false,
            error: Some(error),
        }
    }

    /// Turns a failed check into the matching typed error. Expired timestamps
    /// stay distinguishable from bad signatures.
    pub fn into_result(self, provider: PaymentProvider) -> Result<(), UnipayError> {
        if self.is_valid {
            return Ok(());
        }
        match self.error {
            Some(WebhookVerificationError::TimestampExpired {
                age_seconds,
                tolerance_seconds,
            }) => Err(UnipayError::WebhookTimestampExpired {
                provider,
                age_seconds,
                tolerance_seconds,
            }),
            Some(other) => Err(UnipayError::WebhookSignatureInvalid {
                provider,
                reason: other.to_string(),
            }),
            None => Err(UnipayError::WebhookSignatureInvalid {
                provider,
                reason: "verification failed".into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "payment.created")]
    PaymentCreated,
    #[serde(rename = "payment.pending")]
    PaymentPending,
    #[serde(rename = "payment.processing")]
    PaymentProcessing,
    #[serde(rename = "payment.succeeded")]
    PaymentSucceeded,
    #[serde(rename = "payment.failed")]
    PaymentFailed,
    #[serde(rename = "payment.cancelled")]
    PaymentCancelled,
    #[serde(rename = "payment.expired")]
    PaymentExpired,
    #[serde(rename = "refund.created")]
    RefundCreated,
    #[serde(rename = "refund.succeeded")]
    RefundSucceeded,
    #[serde(rename = "refund.failed")]
    RefundFailed,
    #[serde(rename = "unknown")]
    Unknown,
}

impl WebhookEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentCreated => "payment.created",
            Self::PaymentPending => "payment.pending",
            Self::PaymentProcessing => "payment.processing",
            Self::PaymentSucceeded => "payment.succeeded",
            Self::PaymentFailed => "payment.failed",
            Self::PaymentCancelled => "payment.cancelled",
            Self::PaymentExpired => "payment.expired",
            Self::RefundCreated => "refund.created",
            Self::RefundSucceeded => "refund.succeeded",
            Self::RefundFailed => "refund.failed",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_refund(&self) -> bool {
        matches!(
            self,
            Self::RefundCreated | Self::RefundSucceeded | Self::RefundFailed
        )
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEventData {
    pub unipay_id: Option<UnipayId>,
    pub provider_payment_id: Option<String>,
    pub status: PaymentStatus,
    pub amount: MoneyAmount,
    pub currency: Option<CurrencyCode>,
    pub order_id: Option<String>,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundEventData {
    pub unipay_id: Option<UnipayId>,
    pub provider_refund_id: Option<String>,
    pub unipay_payment_id: Option<UnipayId>,
    pub provider_payment_id: Option<String>,
    pub status: RefundStatus,
    pub amount: MoneyAmount,
    pub currency: Option<CurrencyCode>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WebhookPayload {
    Payment(PaymentEventData),
    Refund(RefundEventData),
    Unknown,
}

/// Provider-agnostic envelope for an inbound notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub provider: PaymentProvider,
    pub event_type: WebhookEventType,
    pub provider_event_id: String,
    /// Raw provider event name, kept for audit.
    pub provider_event_type: String,
    pub timestamp: DateTime<Utc>,
    pub payload: WebhookPayload,
    pub raw: serde_json::Value,
}
