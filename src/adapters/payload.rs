use {
    crate::domain::{
        error::UnipayError,
        money::{CurrencyCode, MoneyAmount},
        provider::PaymentProvider,
        webhook::WebhookEventType,
    },
    chrono::{DateTime, Utc},
    serde_json::Value,
};

/// Total mapping from a gateway's event names to [`WebhookEventType`].
#[derive(Debug, Clone, Copy)]
pub struct EventTypeMap(&'static [(&'static str, WebhookEventType)]);

impl EventTypeMap {
    pub const fn new(entries: &'static [(&'static str, WebhookEventType)]) -> Self {
        Self(entries)
    }

    /// Names without an entry map to `Unknown`.
    pub fn map(&self, provider_event_type: &str) -> WebhookEventType {
        self.0
            .iter()
            .find(|(name, _)| *name == provider_event_type)
            .map(|(_, event_type)| *event_type)
            .unwrap_or(WebhookEventType::Unknown)
    }

    pub fn is_known(&self, provider_event_type: &str) -> bool {
        self.map(provider_event_type) != WebhookEventType::Unknown
    }
}

pub fn parse_json_body(provider: PaymentProvider, raw_body: &str) -> Result<Value, UnipayError> {
    let value: Value = serde_json::from_str(raw_body)
        .map_err(|e| UnipayError::webhook_parsing(provider, "body is not valid JSON", e))?;
    if !value.is_object() {
        return Err(UnipayError::WebhookParsing {
            provider,
            message: "body is not a JSON object".into(),
            source: None,
        });
    }
    Ok(value)
}

/// Amounts arrive as numbers or numeric strings; anything absent or
/// unreadable counts as zero.
pub fn coerce_amount(value: Option<&Value>) -> MoneyAmount {
    let minor_units = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f >= 0.0)
                        .map(|f| f as u64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    };
    MoneyAmount::new(minor_units)
}

pub fn coerce_i64(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn string_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Unparseable codes are dropped rather than failing the event.
pub fn currency_at(value: &Value, pointer: &str) -> Option<CurrencyCode> {
    string_at(value, pointer).and_then(|c| CurrencyCode::new(c).ok())
}

pub fn timestamp_or_now(unix_seconds: Option<i64>) -> DateTime<Utc> {
    unix_seconds
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
}
