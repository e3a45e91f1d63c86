mod common;

use {
    common::*,
    std::sync::Arc,
    unipay::{
        domain::{
            capability::AdapterCapability,
            error::ErrorCategory,
            payment::{
                Checkout, CheckoutMode, CreateRefundInput, PaymentMethodType, PaymentStatus,
                RefundStatus,
            },
            provider::{PaymentAdapter, PaymentProvider},
        },
        services::resolution::ResolutionConfig,
    },
};

// ── payment creation ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_payment_wraps_provider_id() {
    init_tracing();
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();

    let session = orch
        .create_payment(&payment_input(2500, "USD"), None)
        .await
        .unwrap();

    assert_eq!(session.provider, PaymentProvider::Stripe);
    assert_eq!(session.provider_payment_id, "pay_1");
    assert_eq!(session.unipay_id.to_string(), "stripe:pay_1");
    assert_eq!(session.status, PaymentStatus::Created);
    assert_eq!(session.checkout_mode(), CheckoutMode::Hosted);
    assert!(matches!(session.checkout, Checkout::Hosted { .. }));
    assert_eq!(
        stripe.calls(),
        vec![Call::CreatePayment {
            amount: 2500,
            methods: vec![]
        }]
    );
}

#[tokio::test]
async fn unsupported_currency_never_reaches_adapter() {
    let razorpay = Arc::new(razorpay());
    let orch = orchestrator(&[razorpay.clone()], ResolutionConfig::first_available()).unwrap();

    let err = orch
        .create_payment(&payment_input(2500, "USD"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "UNSUPPORTED_CURRENCY");
    assert_eq!(err.category(), ErrorCategory::ProviderResolution);
    assert_eq!(err.provider(), Some(PaymentProvider::Razorpay));
    assert_eq!(razorpay.call_count(), 0);
}

#[tokio::test]
async fn unsupported_checkout_mode_never_reaches_adapter() {
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();

    let mut input = payment_input(2500, "USD");
    input.preferred_checkout_mode = Some(CheckoutMode::Sdk);
    let err = orch.create_payment(&input, None).await.unwrap_err();

    assert_eq!(err.code(), "UNSUPPORTED_CHECKOUT_MODE");
    assert_eq!(stripe.call_count(), 0);
}

#[tokio::test]
async fn sdk_checkout_returns_payload() {
    let paytm = Arc::new(paytm());
    let orch = orchestrator(&[paytm.clone()], ResolutionConfig::first_available()).unwrap();

    let session = orch
        .create_payment(&payment_input(10_000, "INR"), None)
        .await
        .unwrap();

    let Checkout::Sdk { sdk_payload } = &session.checkout else {
        panic!("expected sdk checkout, got {:?}", session.checkout);
    };
    assert_eq!(sdk_payload["order_id"], "pay_1");
    assert_eq!(session.unipay_id.to_string(), "paytm:pay_1");
}

#[tokio::test]
async fn explicit_unregistered_provider_is_not_found() {
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();

    let err = orch
        .create_payment(&payment_input(2500, "USD"), Some(PaymentProvider::Paypal))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "PROVIDER_NOT_FOUND");
    assert_eq!(stripe.call_count(), 0);
}

#[tokio::test]
async fn amount_limits_are_enforced_before_delegation() {
    let razorpay = Arc::new(razorpay());
    let orch = orchestrator(&[razorpay.clone()], ResolutionConfig::first_available()).unwrap();

    let err = orch
        .create_payment(&payment_input(99, "INR"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INVALID_AMOUNT");
    assert_eq!(razorpay.call_count(), 0);

    orch.create_payment(&payment_input(100, "INR"), None)
        .await
        .unwrap();
    assert_eq!(razorpay.call_count(), 1);
}

#[tokio::test]
async fn unsupported_payment_methods_are_dropped_before_delegation() {
    init_tracing();
    let razorpay = Arc::new(razorpay());
    let orch = orchestrator(&[razorpay.clone()], ResolutionConfig::first_available()).unwrap();

    let mut input = payment_input(500, "INR");
    input.payment_methods = vec![
        PaymentMethodType::Upi,
        PaymentMethodType::Wallets,
        PaymentMethodType::Cards,
    ];
    orch.create_payment(&input, None).await.unwrap();

    input.payment_methods = vec![PaymentMethodType::PayLater];
    orch.create_payment(&input, None).await.unwrap();

    assert_eq!(
        razorpay.calls(),
        vec![
            Call::CreatePayment {
                amount: 500,
                methods: vec![PaymentMethodType::Upi, PaymentMethodType::Cards],
            },
            Call::CreatePayment {
                amount: 500,
                methods: vec![],
            },
        ]
    );
}

#[tokio::test]
async fn metadata_limits_are_enforced() {
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();

    let mut input = payment_input(2500, "USD");
    for key in ["a", "b", "c"] {
        input.metadata.insert(key.into(), "v".into());
    }
    let err = orch.create_payment(&input, None).await.unwrap_err();

    assert_eq!(err.code(), "INVALID_METADATA");
    assert_eq!(stripe.call_count(), 0);
}

#[tokio::test]
async fn input_shape_is_checked_first() {
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();

    let err = orch
        .create_payment(&payment_input(0, "USD"), None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_AMOUNT");

    let mut input = payment_input(2500, "USD");
    input.success_url = "ftp://shop.test/success".into();
    let err = orch.create_payment(&input, None).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_URL");

    let mut input = payment_input(2500, "USD");
    input.cancel_url = "  ".into();
    let err = orch.create_payment(&input, None).await.unwrap_err();
    assert_eq!(err.code(), "MISSING_REQUIRED_FIELD");

    assert_eq!(stripe.call_count(), 0);
}

#[tokio::test]
async fn adapter_failures_propagate_with_provider_code() {
    let stripe = Arc::new(stripe().failing());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();

    let err = orch
        .create_payment(&payment_input(2500, "USD"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "PAYMENT_CREATION_FAILED");
    assert_eq!(err.provider_code(), Some("card_declined"));
    assert_eq!(stripe.call_count(), 1);
}

// ── retrieval and refunds by UniPay ID ─────────────────────────────────────

#[tokio::test]
async fn get_payment_routes_by_unipay_id() {
    let stripe = Arc::new(stripe());
    let razorpay = Arc::new(razorpay());
    let orch = orchestrator(
        &[stripe.clone(), razorpay.clone()],
        ResolutionConfig::first_available(),
    )
    .unwrap();

    let session = orch
        .create_payment(&payment_input(50_000, "INR"), Some(PaymentProvider::Razorpay))
        .await
        .unwrap();
    let payment = orch.get_payment(&session.unipay_id.to_string()).await.unwrap();

    assert_eq!(payment.unipay_id, session.unipay_id);
    assert_eq!(payment.provider, PaymentProvider::Razorpay);
    assert_eq!(payment.money.amount().minor_units(), 50_000);
    assert_eq!(stripe.call_count(), 0);
    assert_eq!(
        razorpay.calls().last(),
        Some(&Call::GetPayment("pay_1".into()))
    );
}

#[tokio::test]
async fn malformed_unipay_ids_are_rejected() {
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();

    for id in ["pay_1", "venmo:pay_1", "stripe:", ""] {
        let err = orch.get_payment(id).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_UNIPAY_ID", "{id:?}");
    }
    assert_eq!(stripe.call_count(), 0);
}

#[tokio::test]
async fn unipay_id_for_unregistered_provider_is_not_found() {
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();

    let err = orch.get_payment("razorpay:order_1").await.unwrap_err();
    assert_eq!(err.code(), "PROVIDER_NOT_FOUND");

    let err = orch.create_refund("razorpay:order_1", None).await.unwrap_err();
    assert_eq!(err.code(), "PROVIDER_NOT_FOUND");
}

#[tokio::test]
async fn payment_id_after_first_separator_is_passed_verbatim() {
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();

    let err = orch.get_payment("stripe:cs:with:colons").await.unwrap_err();
    assert_eq!(err.code(), "PAYMENT_NOT_FOUND");
    assert_eq!(
        stripe.calls(),
        vec![Call::GetPayment("cs:with:colons".into())]
    );
}

#[tokio::test]
async fn full_and_partial_refunds() {
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();
    let session = orch
        .create_payment(&payment_input(5000, "USD"), None)
        .await
        .unwrap();
    let payment_id = session.unipay_id.to_string();

    let partial = CreateRefundInput::builder()
        .amount(1500)
        .reason("requested_by_customer")
        .build();
    let refund = orch.create_refund(&payment_id, Some(&partial)).await.unwrap();
    assert_eq!(refund.unipay_payment_id, session.unipay_id);
    assert_eq!(refund.money.amount().minor_units(), 1500);
    assert_eq!(refund.status, RefundStatus::Pending);
    assert_eq!(refund.unipay_id.to_string(), format!("stripe:{}", refund.provider_refund_id));

    let full = orch.create_refund(&payment_id, None).await.unwrap();
    assert_eq!(full.money.amount().minor_units(), 5000);

    let fetched = orch.get_refund(&refund.unipay_id.to_string()).await.unwrap();
    assert_eq!(fetched, refund);

    let list = orch.list_refunds(&payment_id).await.unwrap();
    assert_eq!(list.refunds.len(), 2);
    assert!(!list.has_more);
    assert!(
        list.refunds
            .iter()
            .all(|r| r.unipay_payment_id == session.unipay_id)
    );
}

#[tokio::test]
async fn partial_refund_requires_capability() {
    let paytm = Arc::new(paytm());
    let orch = orchestrator(&[paytm.clone()], ResolutionConfig::first_available()).unwrap();
    let session = orch
        .create_payment(&payment_input(5000, "INR"), None)
        .await
        .unwrap();
    let payment_id = session.unipay_id.to_string();

    let partial = CreateRefundInput::builder().amount(100).build();
    let err = orch
        .create_refund(&payment_id, Some(&partial))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PARTIAL_REFUND_NOT_SUPPORTED");
    assert_eq!(paytm.call_count(), 1);

    // A full refund is still allowed.
    orch.create_refund(&payment_id, None).await.unwrap();
    assert_eq!(paytm.call_count(), 2);
}

#[tokio::test]
async fn zero_refund_amount_is_invalid() {
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();

    let zero = CreateRefundInput::builder().amount(0).build();
    let err = orch.create_refund("stripe:pay_1", Some(&zero)).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_AMOUNT");
    assert_eq!(stripe.call_count(), 0);
}

#[tokio::test]
async fn refund_over_amount_surfaces_adapter_error() {
    let stripe = Arc::new(stripe());
    let orch = orchestrator(&[stripe.clone()], ResolutionConfig::first_available()).unwrap();
    let session = orch
        .create_payment(&payment_input(1000, "USD"), None)
        .await
        .unwrap();

    let input = CreateRefundInput::builder().amount(1001).build();
    let err = orch
        .create_refund(&session.unipay_id.to_string(), Some(&input))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFUND_EXCEEDS_AMOUNT");
}

// ── introspection ──────────────────────────────────────────────────────────

#[tokio::test]
async fn introspection_reflects_registration() {
    let orch = orchestrator(
        &[Arc::new(razorpay()), Arc::new(stripe()), Arc::new(paytm())],
        ResolutionConfig::first_available(),
    )
    .unwrap();

    assert_eq!(
        orch.providers(),
        vec![
            PaymentProvider::Razorpay,
            PaymentProvider::Stripe,
            PaymentProvider::Paytm
        ]
    );
    assert!(orch.is_configured(PaymentProvider::Stripe));
    assert!(!orch.is_configured(PaymentProvider::Paypal));
    assert!(orch.adapter(PaymentProvider::Paypal).is_none());
    assert_eq!(
        orch.adapter(PaymentProvider::Paytm).map(|a| a.provider()),
        Some(PaymentProvider::Paytm)
    );

    let caps = orch.capabilities(PaymentProvider::Razorpay).unwrap();
    assert!(caps.supports(AdapterCapability::SdkCheckout));
    assert!(orch.capabilities(PaymentProvider::Cashfree).is_none());

    assert_eq!(
        orch.providers_for_currency(&currency("INR")),
        vec![
            PaymentProvider::Razorpay,
            PaymentProvider::Stripe,
            PaymentProvider::Paytm
        ]
    );
    assert_eq!(
        orch.providers_for_currency(&currency("EUR")),
        vec![PaymentProvider::Stripe]
    );
    assert!(orch.providers_for_currency(&currency("JPY")).is_empty());

    assert!(orch.accepts_webhooks(PaymentProvider::Stripe));
    assert!(!orch.accepts_webhooks(PaymentProvider::Paytm));
}
