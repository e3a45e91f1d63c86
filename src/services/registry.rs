use {
    crate::domain::{
        error::UnipayError,
        provider::{PaymentAdapter, PaymentProvider},
    },
    std::{fmt, sync::Arc},
};

/// Configured adapters in registration order. Immutable once built.
#[derive(Clone)]
pub struct ProviderRegistry {
    adapters: Vec<Arc<dyn PaymentAdapter>>,
}

impl ProviderRegistry {
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    pub fn new(
        adapters: impl IntoIterator<Item = Arc<dyn PaymentAdapter>>,
    ) -> Result<Self, UnipayError> {
        adapters
            .into_iter()
            .try_fold(Self::builder(), |builder, adapter| builder.register(adapter))?
            .build()
    }

    pub fn get(&self, provider: PaymentProvider) -> Option<&Arc<dyn PaymentAdapter>> {
        self.adapters.iter().find(|a| a.provider() == provider)
    }

    pub fn require(&self, provider: PaymentProvider) -> Result<&Arc<dyn PaymentAdapter>, UnipayError> {
        self.get(provider)
            .ok_or(UnipayError::ProviderNotFound { provider })
    }

    pub fn contains(&self, provider: PaymentProvider) -> bool {
        self.get(provider).is_some()
    }

    /// Registered tags, in registration order.
    pub fn providers(&self) -> Vec<PaymentProvider> {
        self.adapters.iter().map(|a| a.provider()).collect()
    }

    pub fn adapters(&self) -> impl Iterator<Item = &Arc<dyn PaymentAdapter>> {
        self.adapters.iter()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}

#[derive(Default)]
pub struct ProviderRegistryBuilder {
    adapters: Vec<Arc<dyn PaymentAdapter>>,
}

impl ProviderRegistryBuilder {
    pub fn register(mut self, adapter: Arc<dyn PaymentAdapter>) -> Result<Self, UnipayError> {
        let provider = adapter.provider();
        if self.adapters.iter().any(|a| a.provider() == provider) {
            return Err(UnipayError::DuplicateProvider { provider });
        }
        self.adapters.push(adapter);
        Ok(self)
    }

    pub fn build(self) -> Result<ProviderRegistry, UnipayError> {
        if self.adapters.is_empty() {
            return Err(UnipayError::MissingProvider);
        }
        Ok(ProviderRegistry {
            adapters: self.adapters,
        })
    }
}
