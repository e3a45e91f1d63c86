use {
    super::error::UnipayError,
    derive_more::Display,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Amount in the smallest currency unit (paise, cents, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoneyAmount(u64);

impl MoneyAmount {
    pub fn new(minor_units: u64) -> Self {
        Self(minor_units)
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: MoneyAmount) -> Option<MoneyAmount> {
        self.0.checked_add(other.0).map(MoneyAmount)
    }

    pub fn checked_sub(self, other: MoneyAmount) -> Option<MoneyAmount> {
        self.0.checked_sub(other.0).map(MoneyAmount)
    }
}

impl From<u64> for MoneyAmount {
    fn from(minor_units: u64) -> Self {
        Self(minor_units)
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO-4217 alphabetic code, always stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, UnipayError> {
        let code = code.as_ref().trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(UnipayError::InvalidCurrency {
                currency: code.to_string(),
            });
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = UnipayError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = UnipayError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl PartialEq<&str> for CurrencyCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: MoneyAmount,
    currency: CurrencyCode,
}

impl Money {
    pub fn new(amount: impl Into<MoneyAmount>, currency: CurrencyCode) -> Self {
        Self {
            amount: amount.into(),
            currency,
        }
    }

    /// Convenience constructor validating the currency code.
    pub fn of(amount: u64, currency: &str) -> Result<Self, UnipayError> {
        Ok(Self::new(amount, CurrencyCode::new(currency)?))
    }

    pub fn amount(&self) -> MoneyAmount {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
