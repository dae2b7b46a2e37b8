//! Search command.

use cornershop_storefront::AppState;
use cornershop_storefront::search::SearchAction;

/// Print the path a header search for `query` navigates to.
#[allow(clippy::print_stdout)]
pub fn submit(state: &AppState, query: &str) {
    match state.search().submit(query) {
        SearchAction::Navigate(path) => println!("{path}"),
        SearchAction::Handled => {}
        SearchAction::Ignored => println!("Enter a search term."),
    }
}
