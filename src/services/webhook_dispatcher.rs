use {
    super::registry::ProviderRegistry,
    crate::domain::{
        error::UnipayError,
        provider::PaymentProvider,
        webhook::{WebhookConfig, WebhookEvent, WebhookEventType, WebhookRequest},
    },
    std::collections::HashMap,
};

/// Verifies and normalizes inbound webhooks. Stateless between calls:
/// received → secret looked up → signature verified → payload parsed.
#[derive(Debug, Clone, Default)]
pub struct WebhookDispatcher {
    configs: HashMap<PaymentProvider, WebhookConfig>,
}

impl WebhookDispatcher {
    pub fn new(
        configs: impl IntoIterator<Item = WebhookConfig>,
        registry: &ProviderRegistry,
    ) -> Result<Self, UnipayError> {
        let mut by_provider = HashMap::new();
        for config in configs {
            let provider = config.provider();
            if !registry.contains(provider) {
                return Err(UnipayError::ProviderNotFound { provider });
            }
            if by_provider.insert(provider, config).is_some() {
                return Err(UnipayError::DuplicateProvider { provider });
            }
        }
        Ok(Self {
            configs: by_provider,
        })
    }

    pub fn config(&self, provider: PaymentProvider) -> Option<&WebhookConfig> {
        self.configs.get(&provider)
    }

    pub fn is_configured(&self, provider: PaymentProvider) -> bool {
        self.configs.contains_key(&provider)
    }

    pub fn dispatch(
        &self,
        registry: &ProviderRegistry,
        provider: PaymentProvider,
        request: &WebhookRequest,
    ) -> Result<WebhookEvent, UnipayError> {
        let config = self
            .config(provider)
            .ok_or(UnipayError::WebhookProviderNotConfigured { provider })?;
        let adapter = registry.require(provider)?;

        let verification = adapter.verify_webhook_signature(request, config);
        if let Some(reason) = verification.error.as_ref().filter(|_| !verification.is_valid) {
            tracing::warn!(%provider, %reason, "webhook rejected");
        }
        verification.into_result(provider)?;

        let event = adapter
            .parse_webhook_event(request)
            .map_err(|e| match e {
                UnipayError::WebhookParsing { .. } => e,
                other => UnipayError::webhook_parsing(provider, "adapter could not parse event", other),
            })?;

        if event.provider != provider {
            return Err(UnipayError::WebhookParsing {
                provider,
                message: format!("adapter produced an event for `{}`", event.provider),
                source: None,
            });
        }

        if event.event_type == WebhookEventType::Unknown {
            tracing::warn!(%provider, provider_event_type = %event.provider_event_type, "unmapped webhook event");
        }

        Ok(event)
    }
}
