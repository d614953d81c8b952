//! Order identifiers and payment payload codec.
//!
//! Order ids are generated client-side without a central counter:
//! `{user_id}_{unix_timestamp}_{random_suffix}` is unique under
//! concurrent creation as long as the suffix does not collide within a
//! single second for a single user.
//!
//! The payment payload binds an external gateway callback to an internal
//! ledger row: `"{user_external_id}&&&{payment_id}"`.

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::error::CoreError;
use crate::types::{DbId, ExternalId};

/// Length of the random order-id suffix.
const ORDER_SUFFIX_LEN: usize = 6;

/// Separator between the user and payment parts of an invoice payload.
const PAYLOAD_SEPARATOR: &str = "&&&";

/// Generate a globally unique order id for a user.
pub fn generate_order_id(user_id: DbId) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_SUFFIX_LEN)
        .map(char::from)
        .collect();
    order_id_with(user_id, chrono::Utc::now().timestamp(), &suffix)
}

/// Deterministic order-id assembly, split out for tests.
pub fn order_id_with(user_id: DbId, unix_ts: i64, suffix: &str) -> String {
    format!("{user_id}_{unix_ts}_{suffix}")
}

/// Encode the invoice payload carried through the payment gateway.
pub fn encode_payload(user_external_id: ExternalId, payment_id: DbId) -> String {
    format!("{user_external_id}{PAYLOAD_SEPARATOR}{payment_id}")
}

/// Decode a gateway callback payload back into `(user_external_id, payment_id)`.
pub fn parse_payload(payload: &str) -> Result<(ExternalId, DbId), CoreError> {
    let (user_part, payment_part) = payload
        .split_once(PAYLOAD_SEPARATOR)
        .ok_or_else(|| CoreError::Validation(format!("Malformed payment payload: {payload}")))?;

    let user_external_id: ExternalId = user_part
        .parse()
        .map_err(|_| CoreError::Validation(format!("Malformed payment payload: {payload}")))?;
    let payment_id: DbId = payment_part
        .parse()
        .map_err(|_| CoreError::Validation(format!("Malformed payment payload: {payload}")))?;

    Ok((user_external_id, payment_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_shape() {
        assert_eq!(order_id_with(42, 1_700_000_000, "a1b2c3"), "42_1700000000_a1b2c3");
    }

    #[test]
    fn test_generated_order_ids_differ() {
        let a = generate_order_id(7);
        let b = generate_order_id(7);
        assert!(a.starts_with("7_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_payload_roundtrip() {
        let payload = encode_payload(123456789, 55);
        assert_eq!(payload, "123456789&&&55");
        assert_eq!(parse_payload(&payload).unwrap(), (123456789, 55));
    }

    #[test]
    fn test_payload_rejects_missing_separator() {
        assert!(parse_payload("123456789-55").is_err());
    }

    #[test]
    fn test_payload_rejects_non_numeric_parts() {
        assert!(parse_payload("abc&&&55").is_err());
        assert!(parse_payload("123&&&def").is_err());
        assert!(parse_payload("&&&").is_err());
    }
}
