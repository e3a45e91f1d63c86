use {
    super::{
        registry::ProviderRegistry,
        resolution::{ProviderResolver, ResolutionConfig},
        validation::{
            narrow_payment_methods, validate_payment_input, validate_provider,
            validate_refund_capabilities, validate_refund_input,
        },
        webhook_dispatcher::WebhookDispatcher,
    },
    crate::domain::{
        capability::AdapterCapabilities,
        error::UnipayError,
        id::UnipayId,
        money::CurrencyCode,
        payment::{
            CreatePaymentInput, CreateRefundInput, Payment, PaymentSession, Refund, RefundList,
        },
        provider::{PaymentAdapter, PaymentProvider},
        webhook::{WebhookConfig, WebhookEvent, WebhookRequest},
    },
    std::sync::Arc,
    tracing::field,
};

pub struct OrchestratorConfig {
    pub adapters: Vec<Arc<dyn PaymentAdapter>>,
    pub resolution: ResolutionConfig,
    pub webhooks: Vec<WebhookConfig>,
}

impl OrchestratorConfig {
    pub fn new(adapters: impl IntoIterator<Item = Arc<dyn PaymentAdapter>>) -> Self {
        Self {
            adapters: adapters.into_iter().collect(),
            resolution: ResolutionConfig::default(),
            webhooks: Vec::new(),
        }
    }

    pub fn with_resolution(mut self, resolution: ResolutionConfig) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_webhook(mut self, webhook: WebhookConfig) -> Self {
        self.webhooks.push(webhook);
        self
    }

    pub fn with_webhooks(mut self, webhooks: impl IntoIterator<Item = WebhookConfig>) -> Self {
        self.webhooks.extend(webhooks);
        self
    }
}

/// Single entry point for payments, refunds and webhooks across gateways.
///
/// Every configuration problem surfaces from [`PaymentOrchestrator::new`];
/// afterwards the instance is shared read-only except for the round-robin
/// cursor, so it can sit behind an `Arc` and serve concurrent callers.
#[derive(Debug)]
pub struct PaymentOrchestrator {
    registry: ProviderRegistry,
    resolver: ProviderResolver,
    dispatcher: WebhookDispatcher,
}

impl PaymentOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Result<Self, UnipayError> {
        let registry = ProviderRegistry::new(config.adapters)?;
        let resolver = ProviderResolver::new(config.resolution, &registry)?;
        let dispatcher = WebhookDispatcher::new(config.webhooks, &registry)?;

        tracing::info!(
            providers = ?registry.providers(),
            strategy = %resolver.config().strategy(),
            "payment orchestrator configured"
        );

        Ok(Self {
            registry,
            resolver,
            dispatcher,
        })
    }

    #[tracing::instrument(
        name = "create_payment",
        skip_all,
        fields(provider = tracing::field::Empty, unipay_id = tracing::field::Empty)
    )]
    pub async fn create_payment(
        &self,
        input: &CreatePaymentInput,
        provider: Option<PaymentProvider>,
    ) -> Result<PaymentSession, UnipayError> {
        validate_payment_input(input)?;
        let provider = self.resolver.resolve(&self.registry, input, provider)?;
        tracing::Span::current().record("provider", field::display(provider));

        let adapter = validate_provider(&self.registry, provider, input)?;
        let input = narrow_payment_methods(adapter.capabilities(), input);
        let created = adapter.create_payment(&input).await?;
        let session = PaymentSession::from_provider(provider, created)?;

        tracing::Span::current().record("unipay_id", field::display(&session.unipay_id));
        tracing::info!(mode = %session.checkout_mode(), status = %session.status, "payment created");
        Ok(session)
    }

    #[tracing::instrument(name = "get_payment", skip(self))]
    pub async fn get_payment(&self, unipay_id: &str) -> Result<Payment, UnipayError> {
        let id = UnipayId::decode(unipay_id)?;
        let adapter = self.registry.require(id.provider())?;
        let payment = adapter.get_payment(id.provider_payment_id()).await?;
        Payment::from_provider(id.provider(), payment)
    }

    #[tracing::instrument(name = "create_refund", skip(self, input))]
    pub async fn create_refund(
        &self,
        unipay_payment_id: &str,
        input: Option<&CreateRefundInput>,
    ) -> Result<Refund, UnipayError> {
        let id = UnipayId::decode(unipay_payment_id)?;
        let adapter = self.registry.require(id.provider())?;
        if let Some(input) = input {
            validate_refund_input(input)?;
        }
        validate_refund_capabilities(adapter.as_ref(), input)?;

        let refund = adapter
            .create_refund(id.provider_payment_id(), input)
            .await?;
        let refund = Refund::from_provider(id.provider(), refund)?;
        tracing::info!(refund_id = %refund.unipay_id, status = %refund.status, "refund created");
        Ok(refund)
    }

    #[tracing::instrument(name = "get_refund", skip(self))]
    pub async fn get_refund(&self, unipay_refund_id: &str) -> Result<Refund, UnipayError> {
        let id = UnipayId::decode(unipay_refund_id)?;
        let adapter = self.registry.require(id.provider())?;
        let refund = adapter.get_refund(id.provider_payment_id()).await?;
        Refund::from_provider(id.provider(), refund)
    }

    #[tracing::instrument(name = "list_refunds", skip(self))]
    pub async fn list_refunds(&self, unipay_payment_id: &str) -> Result<RefundList, UnipayError> {
        let id = UnipayId::decode(unipay_payment_id)?;
        let adapter = self.registry.require(id.provider())?;
        let list = adapter.list_refunds(id.provider_payment_id()).await?;
        RefundList::from_provider(id.provider(), list)
    }

    /// Verifies the signature with the provider's configured secret, then
    /// normalizes the body. No I/O happens here.
    #[tracing::instrument(
        name = "webhook",
        skip(self, request),
        fields(event_id = tracing::field::Empty, event_type = tracing::field::Empty)
    )]
    pub fn handle_webhook(
        &self,
        provider: PaymentProvider,
        request: &WebhookRequest,
    ) -> Result<WebhookEvent, UnipayError> {
        let event = self.dispatcher.dispatch(&self.registry, provider, request)?;
        tracing::Span::current()
            .record("event_id", field::display(&event.provider_event_id))
            .record("event_type", field::display(event.event_type));
        Ok(event)
    }

    pub fn resolve_provider(
        &self,
        input: &CreatePaymentInput,
        explicit: Option<PaymentProvider>,
    ) -> Result<PaymentProvider, UnipayError> {
        self.resolver.resolve(&self.registry, input, explicit)
    }

    pub fn providers(&self) -> Vec<PaymentProvider> {
        self.registry.providers()
    }

    pub fn adapter(&self, provider: PaymentProvider) -> Option<Arc<dyn PaymentAdapter>> {
        self.registry.get(provider).cloned()
    }

    pub fn capabilities(&self, provider: PaymentProvider) -> Option<&AdapterCapabilities> {
        self.registry.get(provider).map(|a| a.capabilities())
    }

    /// Registered providers accepting `currency`, in registration order.
    pub fn providers_for_currency(&self, currency: &CurrencyCode) -> Vec<PaymentProvider> {
        self.registry
            .adapters()
            .filter(|a| a.capabilities().supports_currency(currency))
            .map(|a| a.provider())
            .collect()
    }

    pub fn is_configured(&self, provider: PaymentProvider) -> bool {
        self.registry.contains(provider)
    }

    pub fn accepts_webhooks(&self, provider: PaymentProvider) -> bool {
        self.dispatcher.is_configured(provider)
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}
