//! Integration tests for newsletter signup.

#![allow(clippy::unwrap_used)]

use cornershop_integration_tests::{Reply, StubBackend, unreachable_url};
use cornershop_storefront::config::StorefrontConfig;
use cornershop_storefront::newsletter::{
    NewsletterClient, NewsletterError, SUCCESS_MESSAGE, Subscriber, SubscriptionStatus,
};
use serde_json::json;

fn subscriber(config: &StorefrontConfig) -> Subscriber {
    Subscriber::Http(NewsletterClient::new(config).unwrap())
}

#[tokio::test]
async fn test_subscribe_posts_normalized_email() {
    let backend = StubBackend::start().await;
    let subscriber = subscriber(&backend.config());

    let result = subscriber.submit("  Reader@Example.COM ").await;
    assert_eq!(result.as_ref().unwrap().as_str(), "reader@example.com");
    assert_eq!(
        SubscriptionStatus::from_result(&result).message(),
        Some(SUCCESS_MESSAGE)
    );
    assert_eq!(
        backend.subscriptions(),
        [json!({ "email": "reader@example.com" })]
    );
}

#[tokio::test]
async fn test_invalid_email_is_not_sent() {
    let backend = StubBackend::start().await;
    let subscriber = subscriber(&backend.config());

    let err = subscriber.submit("reader@localhost").await.unwrap_err();
    assert!(matches!(err, NewsletterError::InvalidEmail(_)));
    assert_eq!(err.user_message(), "Please enter a valid email address.");
    assert!(backend.subscriptions().is_empty());
}

#[tokio::test]
async fn test_server_message_is_shown() {
    let backend = StubBackend::start().await;
    backend.set_newsletter(Reply::raw(
        409,
        json!({ "message": "You're already subscribed." }).to_string(),
    ));
    let subscriber = subscriber(&backend.config());

    let err = subscriber.submit("reader@example.com").await.unwrap_err();
    assert!(matches!(err, NewsletterError::Rejected { status: 409, .. }));
    assert_eq!(err.user_message(), "You're already subscribed.");
}

#[tokio::test]
async fn test_server_failure_without_message() {
    let backend = StubBackend::start().await;
    backend.set_newsletter(Reply::raw(500, "internal error"));
    let subscriber = subscriber(&backend.config());

    let err = subscriber.submit("reader@example.com").await.unwrap_err();
    assert_eq!(
        err.user_message(),
        "Subscription failed. Please try again later."
    );
}

#[tokio::test]
async fn test_network_failure() {
    let config = StorefrontConfig::new(unreachable_url().await);
    let subscriber = subscriber(&config);

    let err = subscriber.submit("reader@example.com").await.unwrap_err();
    assert!(matches!(err, NewsletterError::Network(_)));
    assert_eq!(
        err.user_message(),
        "Network error. Please check your connection and try again."
    );
}
