use {
    super::registry::ProviderRegistry,
    crate::domain::{
        error::UnipayError,
        money::{CurrencyCode, Money},
        payment::CreatePaymentInput,
        provider::PaymentProvider,
    },
    std::{
        fmt,
        str::FromStr,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResolutionStrategy {
    #[default]
    FirstAvailable,
    RoundRobin,
    ByCurrency,
    ByAmount,
    Custom,
}

impl ResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstAvailable => "first-available",
            Self::RoundRobin => "round-robin",
            Self::ByCurrency => "by-currency",
            Self::ByAmount => "by-amount",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResolutionStrategy {
    type Err = UnipayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-available" => Ok(Self::FirstAvailable),
            "round-robin" => Ok(Self::RoundRobin),
            "by-currency" => Ok(Self::ByCurrency),
            "by-amount" => Ok(Self::ByAmount),
            "custom" => Ok(Self::Custom),
            other => Err(UnipayError::InvalidResolutionStrategy {
                strategy: other.to_string(),
                reason: "unknown strategy".into(),
            }),
        }
    }
}

/// Caller-supplied picker. Receives the registered providers in
/// registration order; `None` defers to the default provider.
pub type CustomResolver =
    Arc<dyn Fn(&CreatePaymentInput, &[PaymentProvider]) -> Option<PaymentProvider> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountRoute {
    pub currency: CurrencyCode,
    /// Inclusive upper bound in minor units.
    pub max_amount: u64,
    pub provider: PaymentProvider,
}

impl AmountRoute {
    pub fn new(currency: CurrencyCode, max_amount: u64, provider: PaymentProvider) -> Self {
        Self {
            currency,
            max_amount,
            provider,
        }
    }

    pub fn unbounded(currency: CurrencyCode, provider: PaymentProvider) -> Self {
        Self::new(currency, u64::MAX, provider)
    }

    pub fn matches(&self, money: &Money) -> bool {
        self.currency == *money.currency() && money.amount().minor_units() <= self.max_amount
    }
}

#[derive(Clone, Default)]
pub struct ResolutionConfig {
    strategy: ResolutionStrategy,
    default_provider: Option<PaymentProvider>,
    custom_resolver: Option<CustomResolver>,
    amount_routes: Vec<AmountRoute>,
}

impl ResolutionConfig {
    pub fn new(strategy: ResolutionStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn first_available() -> Self {
        Self::new(ResolutionStrategy::FirstAvailable)
    }

    pub fn round_robin() -> Self {
        Self::new(ResolutionStrategy::RoundRobin)
    }

    pub fn by_currency() -> Self {
        Self::new(ResolutionStrategy::ByCurrency)
    }

    pub fn by_amount(routes: impl IntoIterator<Item = AmountRoute>) -> Self {
        Self::new(ResolutionStrategy::ByAmount).with_amount_routes(routes)
    }

    pub fn custom<F>(resolver: F) -> Self
    where
        F: Fn(&CreatePaymentInput, &[PaymentProvider]) -> Option<PaymentProvider>
            + Send
            + Sync
            + 'static,
    {
        Self::new(ResolutionStrategy::Custom).with_custom_resolver(Arc::new(resolver))
    }

    pub fn with_default_provider(mut self, provider: PaymentProvider) -> Self {
        self.default_provider = Some(provider);
        self
    }

    pub fn with_custom_resolver(mut self, resolver: CustomResolver) -> Self {
        self.custom_resolver = Some(resolver);
        self
    }

    /// Routes are matched first-match-wins in the order given.
    pub fn with_amount_routes(mut self, routes: impl IntoIterator<Item = AmountRoute>) -> Self {
        self.amount_routes = routes.into_iter().collect();
        self
    }

    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    pub fn default_provider(&self) -> Option<PaymentProvider> {
        self.default_provider
    }

    pub fn amount_routes(&self) -> &[AmountRoute] {
        &self.amount_routes
    }

    fn invalid(&self, reason: impl Into<String>) -> UnipayError {
        UnipayError::InvalidResolutionStrategy {
            strategy: self.strategy.to_string(),
            reason: reason.into(),
        }
    }

    /// Checks the combination against the registered providers.
    pub fn validate(&self, registry: &ProviderRegistry) -> Result<(), UnipayError> {
        match self.strategy {
            ResolutionStrategy::Custom if self.custom_resolver.is_none() => {
                return Err(self.invalid("custom strategy requires a resolver function"));
            }
            ResolutionStrategy::ByAmount if self.amount_routes.is_empty() => {
                return Err(self.invalid("by-amount strategy requires at least one amount route"));
            }
            _ => {}
        }

        if let Some(route) = self
            .amount_routes
            .iter()
            .find(|r| !registry.contains(r.provider))
        {
            return Err(self.invalid(format!(
                "amount route for {} targets unregistered provider `{}`",
                route.currency, route.provider
            )));
        }

        if let Some(default) = self.default_provider
            && !registry.contains(default)
        {
            tracing::warn!(provider = %default, "default provider is not registered, it will be skipped");
        }

        Ok(())
    }
}

impl fmt::Debug for ResolutionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionConfig")
            .field("strategy", &self.strategy)
            .field("default_provider", &self.default_provider)
            .field("custom_resolver", &self.custom_resolver.as_ref().map(|_| "<fn>"))
            .field("amount_routes", &self.amount_routes)
            .finish()
    }
}

/// Picks exactly one registered provider per payment request.
pub struct ProviderResolver {
    config: ResolutionConfig,
    // The only shared mutable state of the orchestrator.
    cursor: AtomicUsize,
}

impl ProviderResolver {
    pub fn new(config: ResolutionConfig, registry: &ProviderRegistry) -> Result<Self, UnipayError> {
        config.validate(registry)?;
        Ok(Self {
            config,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// An explicit provider always wins and is returned verbatim; whether it
    /// is registered and capable is checked by the validator afterwards.
    pub fn resolve(
        &self,
        registry: &ProviderRegistry,
        input: &CreatePaymentInput,
        explicit: Option<PaymentProvider>,
    ) -> Result<PaymentProvider, UnipayError> {
        if let Some(provider) = explicit {
            return Ok(provider);
        }

        let strategy = self.config.strategy;
        let resolved = match strategy {
            ResolutionStrategy::FirstAvailable => self.first_available(registry),
            ResolutionStrategy::RoundRobin => self.next_round_robin(registry),
            ResolutionStrategy::ByCurrency => registry
                .adapters()
                .find(|a| a.capabilities().supports_currency(input.money.currency()))
                .map(|a| a.provider())
                .or_else(|| self.registered_default(registry)),
            ResolutionStrategy::ByAmount => self
                .config
                .amount_routes
                .iter()
                .find(|route| route.matches(&input.money))
                .map(|route| route.provider)
                .or_else(|| self.registered_default(registry)),
            ResolutionStrategy::Custom => self
                .config
                .custom_resolver
                .as_ref()
                .and_then(|resolver| resolver(input, &registry.providers()))
                .or_else(|| self.first_available(registry)),
        };

        match resolved {
            Some(provider) if registry.contains(provider) => {
                tracing::info!(%strategy, %provider, "provider resolved");
                Ok(provider)
            }
            Some(provider) => Err(UnipayError::NoProviderAvailable {
                reason: format!("{strategy} selected unregistered provider `{provider}`"),
            }),
            None => Err(UnipayError::NoProviderAvailable {
                reason: format!("{strategy} found no provider for {}", input.money),
            }),
        }
    }

    fn registered_default(&self, registry: &ProviderRegistry) -> Option<PaymentProvider> {
        self.config
            .default_provider
            .filter(|p| registry.contains(*p))
    }

    fn first_available(&self, registry: &ProviderRegistry) -> Option<PaymentProvider> {
        self.registered_default(registry)
            .or_else(|| registry.providers().first().copied())
    }

    fn next_round_robin(&self, registry: &ProviderRegistry) -> Option<PaymentProvider> {
        let providers = registry.providers();
        // fetch_add hands every concurrent caller a distinct ticket.
        let ticket = self.cursor.fetch_add(1, Ordering::Relaxed);
        ticket
            .checked_rem(providers.len())
            .and_then(|idx| providers.get(idx).copied())
    }
}

impl fmt::Debug for ProviderResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderResolver")
            .field("config", &self.config)
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}
