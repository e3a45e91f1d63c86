//! Environment bootstrap for deployments that configure the orchestrator
//! from `UNIPAY_*` variables instead of code.

use {
    crate::{
        domain::{
            error::UnipayError,
            money::CurrencyCode,
            provider::{PaymentAdapter, PaymentProvider},
            webhook::WebhookConfig,
        },
        services::{
            orchestrator::OrchestratorConfig,
            resolution::{AmountRoute, ResolutionConfig, ResolutionStrategy},
        },
    },
    std::{env, sync::Arc},
};

pub const RESOLUTION_STRATEGY_VAR: &str = "UNIPAY_RESOLUTION_STRATEGY";
pub const DEFAULT_PROVIDER_VAR: &str = "UNIPAY_DEFAULT_PROVIDER";
pub const AMOUNT_ROUTES_VAR: &str = "UNIPAY_AMOUNT_ROUTES";

pub fn webhook_secret_var(provider: PaymentProvider) -> String {
    format!("UNIPAY_{}_WEBHOOK_SECRET", provider.as_str().to_ascii_uppercase())
}

pub fn webhook_tolerance_var(provider: PaymentProvider) -> String {
    format!(
        "UNIPAY_{}_WEBHOOK_TOLERANCE_SECS",
        provider.as_str().to_ascii_uppercase()
    )
}

#[derive(Debug, Clone, Default)]
pub struct UnipaySettings {
    pub resolution: ResolutionConfig,
    pub webhooks: Vec<WebhookConfig>,
}

impl UnipaySettings {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, UnipayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, UnipayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let strategy = match get(RESOLUTION_STRATEGY_VAR) {
            Some(raw) => raw.parse::<ResolutionStrategy>()?,
            None => ResolutionStrategy::default(),
        };
        let mut resolution = ResolutionConfig::new(strategy);

        if let Some(raw) = get(DEFAULT_PROVIDER_VAR) {
            let provider = parse_provider(DEFAULT_PROVIDER_VAR, &raw)?;
            resolution = resolution.with_default_provider(provider);
        }
        if let Some(raw) = get(AMOUNT_ROUTES_VAR) {
            resolution = resolution.with_amount_routes(parse_amount_routes(&raw)?);
        }

        let mut webhooks = Vec::new();
        for provider in PaymentProvider::ALL {
            let tolerance_var = webhook_tolerance_var(provider);
            let tolerance = get(&tolerance_var)
                .map(|raw| {
                    raw.parse::<u64>().map_err(|e| invalid(&tolerance_var, e.to_string()))
                })
                .transpose()?;

            let Some(secret) = get(&webhook_secret_var(provider)) else {
                if tolerance.is_some() {
                    return Err(invalid(
                        &tolerance_var,
                        format!("set without {}", webhook_secret_var(provider)),
                    ));
                }
                continue;
            };

            let mut config = WebhookConfig::new(provider, secret);
            if let Some(seconds) = tolerance {
                config = config.with_timestamp_tolerance(seconds);
            }
            webhooks.push(config);
        }

        tracing::debug!(
            strategy = %resolution.strategy(),
            webhook_providers = webhooks.len(),
            "loaded settings"
        );
        Ok(Self {
            resolution,
            webhooks,
        })
    }

    /// Combines the settings with the adapters the caller constructed.
    pub fn into_config(
        self,
        adapters: impl IntoIterator<Item = Arc<dyn PaymentAdapter>>,
    ) -> OrchestratorConfig {
        OrchestratorConfig::new(adapters)
            .with_resolution(self.resolution)
            .with_webhooks(self.webhooks)
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> UnipayError {
    UnipayError::InvalidConfiguration {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_provider(key: &str, raw: &str) -> Result<PaymentProvider, UnipayError> {
    raw.parse::<PaymentProvider>()
        .map_err(|e| invalid(key, e.to_string()))
}

/// `CUR:MAX:provider` entries separated by commas; `MAX` of `*` is unbounded.
fn parse_amount_routes(raw: &str) -> Result<Vec<AmountRoute>, UnipayError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let (Some(currency), Some(max), Some(provider)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid(
                    AMOUNT_ROUTES_VAR,
                    format!("`{entry}` is not CUR:MAX:provider"),
                ));
            };

            let currency = CurrencyCode::new(currency)
                .map_err(|e| invalid(AMOUNT_ROUTES_VAR, e.to_string()))?;
            let provider = parse_provider(AMOUNT_ROUTES_VAR, provider)?;
            match max {
                "*" => Ok(AmountRoute::unbounded(currency, provider)),
                max => max
                    .parse::<u64>()
                    .map(|max| AmountRoute::new(currency, max, provider))
                    .map_err(|e| invalid(AMOUNT_ROUTES_VAR, format!("`{max}`: {e}"))),
            }
        })
        .collect()
}
