// Test file - these are expected patterns in test code
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Edge Case Tests for Billing System
//!
//! Tests boundary conditions in:
//! - Signature verification (header parsing, tolerance window, tampering)
//! - Event reduction (customer id vs expanded customer object)
//! - Subscription transitions (recognized vs ignored event types)
//! - Database-backed transitions (ignored unless DATABASE_URL is available)

#[cfg(test)]
mod signature_tests {
    use crate::error::BillingError;
    use crate::webhooks::verify_signature;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_000;
    const PAYLOAD: &str = r#"{"id":"evt_1","type":"invoice.payment_failed"}"#;

    fn sign(payload: &str, secret: &str, timestamp: i64) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let header = format!("t={},v1={}", NOW, sign(PAYLOAD, SECRET, NOW));
        assert!(verify_signature(PAYLOAD, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_any_v1_candidate_may_match() {
        // Stripe sends several v1 values while a secret is being rolled
        let header = format!(
            "t={},v1={},v1={},v0=deadbeef",
            NOW,
            sign(PAYLOAD, "whsec_old_secret", NOW),
            sign(PAYLOAD, SECRET, NOW)
        );
        assert!(verify_signature(PAYLOAD, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = format!("t={},v1={}", NOW, sign(PAYLOAD, "whsec_other", NOW));
        assert!(matches!(
            verify_signature(PAYLOAD, &header, SECRET, NOW),
            Err(BillingError::WebhookSignatureInvalid)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = format!("t={},v1={}", NOW, sign(PAYLOAD, SECRET, NOW));
        let tampered = PAYLOAD.replace("invoice.payment_failed", "checkout.session.completed");
        assert!(verify_signature(&tampered, &header, SECRET, NOW).is_err());
    }

    #[test]
    fn test_timestamp_at_tolerance_edge_accepted() {
        let signed_at = NOW - 300;
        let header = format!("t={},v1={}", signed_at, sign(PAYLOAD, SECRET, signed_at));
        assert!(verify_signature(PAYLOAD, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let signed_at = NOW - 301;
        let header = format!("t={},v1={}", signed_at, sign(PAYLOAD, SECRET, signed_at));
        assert!(verify_signature(PAYLOAD, &header, SECRET, NOW).is_err());
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let signed_at = NOW + 301;
        let header = format!("t={},v1={}", signed_at, sign(PAYLOAD, SECRET, signed_at));
        assert!(verify_signature(PAYLOAD, &header, SECRET, NOW).is_err());
    }

    #[test]
    fn test_malformed_headers_rejected() {
        let sig = sign(PAYLOAD, SECRET, NOW);
        for header in [
            String::new(),
            "garbage".to_string(),
            format!("v1={}", sig),
            format!("t={}", NOW),
            format!("t=not-a-number,v1={}", sig),
            format!("t={},v1=not-hex", NOW),
            format!("t={},v1={}", i64::MIN, sig),
            format!("t={},v1={}", i64::MAX, sig),
        ] {
            assert!(
                verify_signature(PAYLOAD, &header, SECRET, NOW).is_err(),
                "header {:?} should be rejected",
                header
            );
        }
    }
}

#[cfg(test)]
mod handler_tests {
    use crate::config::StripeConfig;
    use crate::error::BillingError;
    use crate::webhooks::*;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use versabot_shared::SubscriptionStatus;

    const SECRET: &str = "whsec_handler_secret";

    fn handler() -> WebhookHandler {
        // Lazy pool: nothing here may touch the database
        let pool = versabot_shared::create_pool("postgresql://localhost/versabot_unused").unwrap();
        let config = StripeConfig::new(None, Some(SECRET.to_string())).unwrap();
        WebhookHandler::new(config, pool)
    }

    fn signed_header(payload: &str, secret: &str) -> String {
        let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(
            subscription_transition(CHECKOUT_SESSION_COMPLETED),
            Some(SubscriptionStatus::Active)
        );
        assert_eq!(
            subscription_transition(INVOICE_PAYMENT_FAILED),
            Some(SubscriptionStatus::Inactive)
        );
        assert_eq!(subscription_transition("invoice.paid"), None);
        assert_eq!(subscription_transition("customer.subscription.deleted"), None);
        assert_eq!(subscription_transition(""), None);
    }

    #[tokio::test]
    async fn test_verify_event_extracts_customer_id() {
        let payload = r#"{
            "id": "evt_checkout",
            "type": "checkout.session.completed",
            "data": { "object": { "object": "checkout.session", "customer": "cus_ABC" } }
        }"#;

        let event = handler()
            .verify_event(payload, &signed_header(payload, SECRET))
            .unwrap();

        assert_eq!(event.event_type, CHECKOUT_SESSION_COMPLETED);
        assert_eq!(event.customer.as_deref(), Some("cus_ABC"));
        assert_eq!(event.target_status(), Some(SubscriptionStatus::Active));
    }

    #[tokio::test]
    async fn test_verify_event_extracts_expanded_customer() {
        let payload = r#"{
            "id": "evt_invoice",
            "type": "invoice.payment_failed",
            "data": { "object": { "object": "invoice", "customer": { "id": "cus_XYZ" } } }
        }"#;

        let event = handler()
            .verify_event(payload, &signed_header(payload, SECRET))
            .unwrap();

        assert_eq!(event.customer.as_deref(), Some("cus_XYZ"));
        assert_eq!(event.target_status(), Some(SubscriptionStatus::Inactive));
    }

    #[tokio::test]
    async fn test_verify_event_rejects_wrong_secret() {
        let payload = r#"{"id":"evt_1","type":"checkout.session.completed"}"#;
        let result = handler().verify_event(payload, &signed_header(payload, "whsec_forged"));
        assert!(matches!(result, Err(BillingError::WebhookSignatureInvalid)));
    }

    #[tokio::test]
    async fn test_verify_event_rejects_extreme_timestamp() {
        let payload = r#"{"id":"evt_1","type":"checkout.session.completed"}"#;
        for header in [
            "t=-9223372036854775808,v1=00",
            "t=9223372036854775807,v1=00",
        ] {
            let result = handler().verify_event(payload, header);
            assert!(matches!(result, Err(BillingError::WebhookSignatureInvalid)));
        }
    }

    #[tokio::test]
    async fn test_verify_event_requires_event_type() {
        let payload = r#"{"id":"evt_1","data":{}}"#;
        let result = handler().verify_event(payload, &signed_header(payload, SECRET));
        assert!(matches!(result, Err(BillingError::InvalidPayload(_))));
    }

    #[tokio::test]
    async fn test_unrecognized_event_is_ignored() {
        let event = VerifiedEvent {
            id: "evt_1".into(),
            event_type: "customer.created".into(),
            customer: Some("cus_ABC".into()),
        };
        assert_eq!(
            handler().handle_event(&event).await.unwrap(),
            WebhookOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn test_recognized_event_without_customer_is_ignored() {
        let event = VerifiedEvent {
            id: "evt_1".into(),
            event_type: CHECKOUT_SESSION_COMPLETED.into(),
            customer: None,
        };
        assert_eq!(
            handler().handle_event(&event).await.unwrap(),
            WebhookOutcome::MissingCustomer
        );
    }

    #[test]
    fn test_client_errors_classified() {
        assert!(BillingError::WebhookSignatureInvalid.is_client_error());
        assert!(BillingError::InvalidPayload("x".into()).is_client_error());
        assert!(!BillingError::Database("x".into()).is_client_error());
    }
}

#[cfg(test)]
mod transition_db_tests {
    use crate::config::StripeConfig;
    use crate::webhooks::*;
    use sqlx::PgPool;
    use versabot_shared::{init_schema, queries, SubscriptionStatus};

    async fn setup() -> (PgPool, WebhookHandler) {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/versabot_test".to_string());
        let pool = versabot_shared::create_pool(&database_url).unwrap();
        init_schema(&pool).await.expect("Failed to initialize schema");

        let config = StripeConfig::new(None, Some("whsec_db".into())).unwrap();
        (pool.clone(), WebhookHandler::new(config, pool))
    }

    async fn create_tenant(pool: &PgPool, customer_id: &str) -> i32 {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO clients (name, stripe_customer_id) VALUES ('Billing Test', $1) RETURNING id",
        )
        .bind(customer_id)
        .fetch_one(pool)
        .await
        .expect("Failed to create tenant");
        id
    }

    async fn status_of(pool: &PgPool, tenant_id: i32) -> SubscriptionStatus {
        queries::find_tenant(pool, tenant_id)
            .await
            .unwrap()
            .unwrap()
            .status()
            .unwrap()
    }

    fn event(event_type: &str, customer: &str) -> VerifiedEvent {
        VerifiedEvent {
            id: format!("evt_{}", customer),
            event_type: event_type.into(),
            customer: Some(customer.into()),
        }
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_checkout_then_payment_failure() {
        let (pool, handler) = setup().await;
        let customer = format!(
            "cus_{}",
            time::OffsetDateTime::now_utc().unix_timestamp_nanos()
        );
        let tenant_id = create_tenant(&pool, &customer).await;
        assert_eq!(status_of(&pool, tenant_id).await, SubscriptionStatus::Inactive);

        let outcome = handler
            .handle_event(&event(CHECKOUT_SESSION_COMPLETED, &customer))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Applied {
                status: SubscriptionStatus::Active,
                tenants_updated: 1
            }
        );
        assert_eq!(status_of(&pool, tenant_id).await, SubscriptionStatus::Active);

        // Unrecognized events leave the status alone
        handler
            .handle_event(&event("invoice.paid", &customer))
            .await
            .unwrap();
        assert_eq!(status_of(&pool, tenant_id).await, SubscriptionStatus::Active);

        handler
            .handle_event(&event(INVOICE_PAYMENT_FAILED, &customer))
            .await
            .unwrap();
        assert_eq!(status_of(&pool, tenant_id).await, SubscriptionStatus::Inactive);
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_unknown_customer_reported() {
        let (_pool, handler) = setup().await;
        let outcome = handler
            .handle_event(&event(CHECKOUT_SESSION_COMPLETED, "cus_nobody"))
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::UnknownCustomer);
    }
}
