use {
    super::{error::UnipayError, provider::PaymentProvider},
    derive_more::Display,
    serde::{Deserialize, Serialize},
    std::str::FromStr,
};

pub const SEPARATOR: char = ':';

/// Self-describing payment or refund handle: `<provider>:<providerPaymentId>`.
///
/// Vendor ids are assumed never to contain `:`. Decoding splits on the first
/// separator, so an id that does contain one still round-trips, but the
/// provider segment can never hold it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("{provider}:{provider_payment_id}")]
#[serde(try_from = "String", into = "String")]
pub struct UnipayId {
    provider: PaymentProvider,
    provider_payment_id: String,
}

impl UnipayId {
    pub fn encode(
        provider: PaymentProvider,
        provider_payment_id: impl Into<String>,
    ) -> Result<Self, UnipayError> {
        let provider_payment_id = provider_payment_id.into();
        if provider_payment_id.trim().is_empty() {
            return Err(UnipayError::invalid_unipay_id(
                &format!("{provider}{SEPARATOR}{provider_payment_id}"),
                "provider payment id must not be blank",
            ));
        }
        Ok(Self {
            provider,
            provider_payment_id,
        })
    }

    pub fn decode(value: &str) -> Result<Self, UnipayError> {
        let (provider, provider_payment_id) = value
            .split_once(SEPARATOR)
            .ok_or_else(|| UnipayError::invalid_unipay_id(value, "missing `:` separator"))?;

        let provider = provider.parse::<PaymentProvider>().map_err(|_| {
            UnipayError::invalid_unipay_id(value, format!("unknown provider {provider:?}"))
        })?;

        if provider_payment_id.trim().is_empty() {
            return Err(UnipayError::invalid_unipay_id(
                value,
                "provider payment id is blank",
            ));
        }

        Ok(Self {
            provider,
            provider_payment_id: provider_payment_id.to_string(),
        })
    }

    /// Best-effort variant of [`UnipayId::decode`] that only extracts the provider.
    pub fn try_get_provider(value: &str) -> Option<PaymentProvider> {
        Self::decode(value).ok().map(|id| id.provider)
    }

    pub fn provider(&self) -> PaymentProvider {
        self.provider
    }

    pub fn provider_payment_id(&self) -> &str {
        &self.provider_payment_id
    }

    pub fn into_parts(self) -> (PaymentProvider, String) {
        (self.provider, self.provider_payment_id)
    }
}

impl FromStr for UnipayId {
    type Err = UnipayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl TryFrom<String> for UnipayId {
    type Error = UnipayError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::decode(&s)
    }
}

impl From<UnipayId> for String {
    fn from(id: UnipayId) -> Self {
        id.to_string()
    }
}

/// String form of [`UnipayId::encode`].
pub fn encode_unipay_id(
    provider: PaymentProvider,
    provider_payment_id: &str,
) -> Result<String, UnipayError> {
    UnipayId::encode(provider, provider_payment_id).map(|id| id.to_string())
}

pub fn decode_unipay_id(value: &str) -> Result<(PaymentProvider, String), UnipayError> {
    UnipayId::decode(value).map(UnipayId::into_parts)
}

pub fn try_get_provider(value: &str) -> Option<PaymentProvider> {
    UnipayId::try_get_provider(value)
}
