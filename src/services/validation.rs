use {
    super::registry::ProviderRegistry,
    crate::domain::{
        capability::{AdapterCapabilities, AdapterCapability},
        error::UnipayError,
        payment::{CreatePaymentInput, CreateRefundInput, Metadata, PaymentMethodType},
        provider::{PaymentAdapter, PaymentProvider},
    },
    std::{borrow::Cow, sync::Arc},
    url::Url,
};

/// Shape checks that need no provider: run before resolution.
pub fn validate_payment_input(input: &CreatePaymentInput) -> Result<(), UnipayError> {
    let amount = input.money.amount().minor_units();
    if amount == 0 {
        return Err(UnipayError::InvalidAmount {
            amount,
            reason: "amount must be greater than zero".into(),
        });
    }

    validate_redirect_url("success_url", &input.success_url)?;
    validate_redirect_url("cancel_url", &input.cancel_url)?;
    validate_metadata_keys(&input.metadata)
}

pub fn validate_refund_input(input: &CreateRefundInput) -> Result<(), UnipayError> {
    if input.amount == Some(0) {
        return Err(UnipayError::InvalidAmount {
            amount: 0,
            reason: "refund amount must be greater than zero".into(),
        });
    }
    validate_metadata_keys(&input.metadata)
}

fn validate_redirect_url(field: &'static str, value: &str) -> Result<(), UnipayError> {
    if value.trim().is_empty() {
        return Err(UnipayError::MissingRequiredField { field });
    }
    let url = Url::parse(value).map_err(|e| UnipayError::InvalidUrl {
        field,
        url: value.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(UnipayError::InvalidUrl {
            field,
            url: value.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    Ok(())
}

fn validate_metadata_keys(metadata: &Metadata) -> Result<(), UnipayError> {
    if metadata.keys().any(|k| k.trim().is_empty()) {
        return Err(UnipayError::InvalidMetadata {
            reason: "metadata keys must not be blank".into(),
        });
    }
    Ok(())
}

/// Confirms `provider` is registered and can serve `input`. Runs after
/// resolution and before any call into the adapter.
pub fn validate_provider<'r>(
    registry: &'r ProviderRegistry,
    provider: PaymentProvider,
    input: &CreatePaymentInput,
) -> Result<&'r Arc<dyn PaymentAdapter>, UnipayError> {
    let adapter = registry.require(provider)?;
    validate_capabilities(adapter.as_ref(), input)?;
    Ok(adapter)
}

pub fn validate_capabilities(
    adapter: &dyn PaymentAdapter,
    input: &CreatePaymentInput,
) -> Result<(), UnipayError> {
    let provider = adapter.provider();
    let capabilities = adapter.capabilities();

    let currency = input.money.currency();
    if !capabilities.supports_currency(currency) {
        return Err(UnipayError::UnsupportedCurrency {
            provider,
            currency: currency.to_string(),
        });
    }

    // Without a stated preference the adapter picks its own default mode.
    if let Some(mode) = input.preferred_checkout_mode
        && !capabilities.supports_checkout_mode(mode)
    {
        return Err(UnipayError::UnsupportedCheckoutMode { provider, mode });
    }

    let limits = capabilities.limits();
    let amount = input.money.amount().minor_units();
    if let Some(min) = limits.min_amount
        && amount < min
    {
        return Err(UnipayError::InvalidAmount {
            amount,
            reason: format!("below the {provider} minimum of {min}"),
        });
    }
    if let Some(max) = limits.max_amount
        && amount > max
    {
        return Err(UnipayError::InvalidAmount {
            amount,
            reason: format!("above the {provider} maximum of {max}"),
        });
    }

    if let Some(max_keys) = limits.max_metadata_keys
        && input.metadata.len() > max_keys
    {
        return Err(UnipayError::InvalidMetadata {
            reason: format!(
                "{} keys exceed the {provider} limit of {max_keys}",
                input.metadata.len()
            ),
        });
    }
    if let Some(max_len) = limits.max_metadata_value_length
        && let Some((key, _)) = input.metadata.iter().find(|(_, v)| v.chars().count() > max_len)
    {
        return Err(UnipayError::InvalidMetadata {
            reason: format!("value of `{key}` exceeds the {provider} limit of {max_len} characters"),
        });
    }

    Ok(())
}

/// Keeps only the preferred method families `capabilities` declares. The
/// input is cloned only when something has to be dropped; an empty result
/// leaves the method choice to the gateway.
pub fn narrow_payment_methods<'a>(
    capabilities: &AdapterCapabilities,
    input: &'a CreatePaymentInput,
) -> Cow<'a, CreatePaymentInput> {
    let (supported, dropped): (Vec<PaymentMethodType>, Vec<PaymentMethodType>) = input
        .payment_methods
        .iter()
        .copied()
        .partition(|method| capabilities.supports_payment_method(*method));
    if dropped.is_empty() {
        return Cow::Borrowed(input);
    }

    tracing::warn!(
        provider = %capabilities.provider(),
        ?dropped,
        "dropping payment methods the provider does not support"
    );
    let mut narrowed = input.clone();
    narrowed.payment_methods = supported;
    Cow::Owned(narrowed)
}

/// A refund with an explicit amount is partial and needs the capability.
pub fn validate_refund_capabilities(
    adapter: &dyn PaymentAdapter,
    input: Option<&CreateRefundInput>,
) -> Result<(), UnipayError> {
    if input.is_some_and(CreateRefundInput::is_partial)
        && !adapter.capabilities().supports(AdapterCapability::PartialRefund)
    {
        return Err(UnipayError::PartialRefundNotSupported {
            provider: adapter.provider(),
        });
    }
    Ok(())
}
