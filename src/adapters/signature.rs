//! HMAC-SHA256 webhook signature schemes shared by the gateway codecs.
//!
//! Two shapes are in use across gateways:
//! - plain: `hex(HMAC-SHA256(secret, raw_body))` sent as-is in a header;
//! - timestamped: `t=<unix>,v1=<hex(HMAC-SHA256(secret, "<unix>.<raw_body>"))>`,
//!   checked against a staleness tolerance.
//!
//! Verification never fails; it reports through [`WebhookVerification`].

use {
    crate::domain::webhook::{WebhookVerification, WebhookVerificationError},
    chrono::{DateTime, Utc},
    hmac::{Hmac, Mac, digest::InvalidLength},
    sha2::Sha256,
    subtle::ConstantTimeEq,
};

type HmacSha256 = Hmac<Sha256>;

pub fn hmac_sha256_hex(secret: &str, payload: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn digests_match(expected_hex: &str, provided_hex: &str) -> bool {
    let provided = provided_hex.trim().to_ascii_lowercase();
    expected_hex.as_bytes().ct_eq(provided.as_bytes()).into()
}

fn invalid_secret() -> WebhookVerification {
    WebhookVerification::invalid(WebhookVerificationError::MalformedSignature {
        reason: "signing secret is not usable as an HMAC key".into(),
    })
}

/// Plain scheme: the header carries the hex digest of the raw body.
pub fn verify_hmac_signature(raw_body: &[u8], signature: &str, secret: &str) -> WebhookVerification {
    if signature.trim().is_empty() {
        return WebhookVerification::invalid(WebhookVerificationError::MalformedSignature {
            reason: "empty signature".into(),
        });
    }
    let Ok(expected) = hmac_sha256_hex(secret, raw_body) else {
        return invalid_secret();
    };
    if digests_match(&expected, signature) {
        WebhookVerification::valid()
    } else {
        WebhookVerification::invalid(WebhookVerificationError::SignatureMismatch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedSignature {
    pub timestamp: i64,
    raw_timestamp: String,
    pub signatures: Vec<String>,
}

/// Parses `t=<timestamp>,v1=<sig>[,v1=<sig>...]`. Unknown keys are skipped.
pub fn parse_timestamped_header(header: &str) -> Result<TimestampedSignature, WebhookVerificationError> {
    let mut raw_timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => raw_timestamp = Some(value.to_string()),
            "v1" if !value.is_empty() => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let raw_timestamp = raw_timestamp.ok_or_else(|| WebhookVerificationError::MalformedSignature {
        reason: "missing timestamp".into(),
    })?;
    let timestamp = raw_timestamp
        .parse::<i64>()
        .map_err(|_| WebhookVerificationError::MalformedSignature {
            reason: format!("timestamp is not an integer: {raw_timestamp:?}"),
        })?;
    if signatures.is_empty() {
        return Err(WebhookVerificationError::MalformedSignature {
            reason: "missing v1 signature".into(),
        });
    }

    Ok(TimestampedSignature {
        timestamp,
        raw_timestamp,
        signatures,
    })
}

/// Builds a timestamped signature header for `raw_body`.
pub fn sign_timestamped(secret: &str, timestamp: i64, raw_body: &str) -> Result<String, InvalidLength> {
    let signed_payload = format!("{timestamp}.{raw_body}");
    let digest = hmac_sha256_hex(secret, signed_payload.as_bytes())?;
    Ok(format!("t={timestamp},v1={digest}"))
}

pub fn verify_timestamped_signature(
    raw_body: &str,
    header: &str,
    secret: &str,
    tolerance_seconds: u64,
) -> WebhookVerification {
    verify_timestamped_signature_at(raw_body, header, secret, tolerance_seconds, Utc::now())
}

/// Signature is checked before staleness, so only authentic payloads can
/// produce a `TimestampExpired` outcome. Timestamps within tolerance on
/// either side of `now` are accepted, the boundary included.
pub fn verify_timestamped_signature_at(
    raw_body: &str,
    header: &str,
    secret: &str,
    tolerance_seconds: u64,
    now: DateTime<Utc>,
) -> WebhookVerification {
    let parsed = match parse_timestamped_header(header) {
        Ok(parsed) => parsed,
        Err(e) => return WebhookVerification::invalid(e),
    };

    let signed_payload = format!("{}.{}", parsed.raw_timestamp, raw_body);
    let Ok(expected) = hmac_sha256_hex(secret, signed_payload.as_bytes()) else {
        return invalid_secret();
    };
    if !parsed.signatures.iter().any(|sig| digests_match(&expected, sig)) {
        return WebhookVerification::invalid(WebhookVerificationError::SignatureMismatch);
    }

    let age_seconds = now.timestamp().saturating_sub(parsed.timestamp);
    if age_seconds.unsigned_abs() > tolerance_seconds {
        return WebhookVerification::invalid(WebhookVerificationError::TimestampExpired {
            age_seconds,
            tolerance_seconds,
        });
    }

    WebhookVerification::valid()
}
