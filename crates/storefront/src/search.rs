//! Search navigation from the header search box.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

/// Path of the search results page.
pub const SEARCH_PATH: &str = "/search";

/// Build the search results path for `query`, percent-encoding it.
#[must_use]
pub fn search_path(query: &str) -> String {
    format!("{SEARCH_PATH}?q={}", urlencoding::encode(query.trim()))
}

/// What a search submission resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    /// Navigate to this path.
    Navigate(String),
    /// An injected handler took the query.
    Handled,
    /// The query was blank; nothing happened.
    Ignored,
}

type Handler = Arc<dyn Fn(&str) + Send + Sync>;

/// Routing for search submissions.
#[derive(Clone, Default)]
pub enum SearchNavigation {
    /// Navigate to [`search_path`].
    #[default]
    Navigate,
    /// Hand the trimmed query to an injected handler.
    Custom(Handler),
}

impl fmt::Debug for SearchNavigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate => f.write_str("Navigate"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl SearchNavigation {
    /// Route searches to `handler` instead of the results page.
    pub fn custom(handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(handler))
    }

    /// Submit a search. Whitespace-only queries are ignored.
    pub fn submit(&self, query: &str) -> SearchAction {
        let query = query.trim();
        if query.is_empty() {
            return SearchAction::Ignored;
        }

        crate::error::add_breadcrumb("search", "Submitted search", Some(&[("query", query)]));

        match self {
            Self::Navigate => {
                let path = search_path(query);
                debug!(path = %path, "Navigating to search results");
                SearchAction::Navigate(path)
            }
            Self::Custom(handler) => {
                handler(query);
                SearchAction::Handled
            }
        }
    }
}
