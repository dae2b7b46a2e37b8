//! Newsletter signup.
//!
//! Validates the address locally, then either posts it to the backend's
//! newsletter endpoint or hands it to an injected handler. Every outcome maps
//! to an inline [`SubscriptionStatus`] for display next to the form.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use cornershop_core::{Email, EmailError};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::StorefrontConfig;

/// Shown after a successful subscription.
pub const SUCCESS_MESSAGE: &str = "Thanks for subscribing!";

const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
const REJECTED_MESSAGE: &str = "Subscription failed. Please try again later.";
const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Errors that can occur when subscribing.
#[derive(Debug, Error)]
pub enum NewsletterError {
    /// The address failed local validation; nothing was sent.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The backend answered with a non-success status.
    #[error("Subscription rejected with HTTP {status}")]
    Rejected {
        status: u16,
        /// Message from the response body, if any.
        message: Option<String>,
    },

    /// The request never got a response.
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// An injected handler reported failure.
    #[error("Subscription handler failed: {0}")]
    Handler(String),
}

impl NewsletterError {
    /// Message suitable for showing next to the signup form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => INVALID_EMAIL_MESSAGE.to_string(),
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected { message: None, .. } => REJECTED_MESSAGE.to_string(),
            Self::Network(_) => NETWORK_MESSAGE.to_string(),
            Self::Handler(message) if !message.trim().is_empty() => message.clone(),
            Self::Handler(_) => REJECTED_MESSAGE.to_string(),
        }
    }
}

/// Inline status of the signup form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubscriptionStatus {
    #[default]
    Idle,
    /// A submission is in flight.
    Submitting,
    Success {
        message: String,
    },
    Error {
        message: String,
    },
}

impl SubscriptionStatus {
    /// Status for a finished submission.
    #[must_use]
    pub fn from_result(result: &Result<Email, NewsletterError>) -> Self {
        match result {
            Ok(_) => Self::Success {
                message: SUCCESS_MESSAGE.to_string(),
            },
            Err(e) => Self::Error {
                message: e.user_message(),
            },
        }
    }

    /// The message to display, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message } | Self::Error { message } => Some(message.as_str()),
            Self::Idle | Self::Submitting => None,
        }
    }
}

// =============================================================================
// NewsletterClient
// =============================================================================

#[derive(Serialize)]
struct SubscribeRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the backend's newsletter endpoint.
#[derive(Clone)]
pub struct NewsletterClient {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<SecretString>,
}

impl NewsletterClient {
    /// Create a newsletter client from storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, NewsletterError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.newsletter_url(),
            token: config.api_token.clone(),
        })
    }

    /// The URL subscriptions are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Post `email` to the newsletter endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`NewsletterError::Rejected`] for a non-success status and
    /// [`NewsletterError::Network`] if no response arrived.
    #[instrument(skip(self, email), fields(domain = %email.domain()))]
    pub async fn subscribe(&self, email: &Email) -> Result<(), NewsletterError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&SubscribeRequest {
                email: email.as_str(),
            });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty());

        Err(NewsletterError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

// =============================================================================
// Subscriber
// =============================================================================

/// Future returned by an injected subscription handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;

type Handler = Arc<dyn Fn(Email) -> HandlerFuture + Send + Sync>;

/// Where validated addresses are sent.
#[derive(Clone)]
pub enum Subscriber {
    /// Post to the backend.
    Http(NewsletterClient),
    /// Call an injected handler instead of the backend.
    Custom(Handler),
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(client) => f
                .debug_tuple("Http")
                .field(&client.endpoint().as_str())
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Subscriber {
    /// Wrap an async handler. An `Err` message is shown to the user as-is.
    pub fn custom<F, Fut>(handler: F) -> Self
    where
        F: Fn(Email) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        Self::Custom(Arc::new(move |email| -> HandlerFuture {
            Box::pin(handler(email))
        }))
    }

    /// Validate `input` and subscribe it.
    ///
    /// Returns the normalized address on success.
    ///
    /// # Errors
    ///
    /// Returns [`NewsletterError::InvalidEmail`] without contacting anything
    /// if `input` is not a plausible address; otherwise the delivery error.
    pub async fn submit(&self, input: &str) -> Result<Email, NewsletterError> {
        let email = Email::parse(input)?;

        let result = match self {
            Self::Http(client) => client.subscribe(&email).await,
            Self::Custom(handler) => handler(email.clone())
                .await
                .map_err(NewsletterError::Handler),
        };

        match result {
            Ok(()) => {
                info!(domain = %email.domain(), "Newsletter subscription successful");
                Ok(email)
            }
            Err(e) => {
                warn!(error = %e, "Newsletter subscription failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[tokio::test]
    async fn test_invalid_email_skips_handler() {
        let calls = Arc::new(Mutex::new(0_u32));
        let counter = Arc::clone(&calls);
        let subscriber = Subscriber::custom(move |_| {
            *counter.lock().unwrap() += 1;
            async { Ok(()) }
        });

        for input in ["", "test", "test@", "@example.com", "test@domain"] {
            let err = subscriber.submit(input).await.unwrap_err();
            assert!(matches!(err, NewsletterError::InvalidEmail(_)), "{input}");
            assert_eq!(err.user_message(), INVALID_EMAIL_MESSAGE);
        }
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_custom_handler_receives_normalized_email() {
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        let subscriber = Subscriber::custom(move |email: Email| {
            *slot.lock().unwrap() = Some(email.into_inner());
            async { Ok(()) }
        });

        let email = subscriber.submit("  Reader@Example.COM ").await.unwrap();
        assert_eq!(email.as_str(), "reader@example.com");
        assert_eq!(seen.lock().unwrap().as_deref(), Some("reader@example.com"));

        let status = SubscriptionStatus::from_result(&Ok(email));
        assert_eq!(status.message(), Some(SUCCESS_MESSAGE));
    }

    #[tokio::test]
    async fn test_custom_handler_failure_message() {
        let subscriber = Subscriber::custom(|_| async { Err("List is full".to_string()) });
        let result = subscriber.submit("a@b.co").await;
        assert_eq!(
            SubscriptionStatus::from_result(&result),
            SubscriptionStatus::Error {
                message: "List is full".to_string()
            }
        );

        let subscriber = Subscriber::custom(|_| async { Err(String::new()) });
        let err = subscriber.submit("a@b.co").await.unwrap_err();
        assert_eq!(err.user_message(), REJECTED_MESSAGE);
    }

    #[test]
    fn test_rejected_messages() {
        let err = NewsletterError::Rejected {
            status: 409,
            message: Some("Already subscribed".to_string()),
        };
        assert_eq!(err.user_message(), "Already subscribed");

        let err = NewsletterError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), REJECTED_MESSAGE);
        assert_eq!(err.to_string(), "Subscription rejected with HTTP 500");
    }

    #[test]
    fn test_idle_has_no_message() {
        assert_eq!(SubscriptionStatus::default(), SubscriptionStatus::Idle);
        assert!(SubscriptionStatus::Idle.message().is_none());
        assert!(SubscriptionStatus::Submitting.message().is_none());
    }
}
