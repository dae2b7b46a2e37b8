//! Newsletter signup command.

use cornershop_storefront::AppState;
use cornershop_storefront::newsletter::SubscriptionStatus;

/// Subscribe `email` and print the resulting status line.
///
/// # Errors
///
/// Returns the status message as an error if the subscription failed.
#[allow(clippy::print_stdout)]
pub async fn subscribe(state: &AppState, email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = state.page();
    match page.subscribe(state.subscriber(), email).await {
        SubscriptionStatus::Success { message } => {
            println!("{message}");
            Ok(())
        }
        SubscriptionStatus::Error { message } => Err(message.into()),
        SubscriptionStatus::Idle | SubscriptionStatus::Submitting => {
            Err("Subscription did not complete".into())
        }
    }
}
