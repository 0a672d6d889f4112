//! Twitter/X API integration module.
//!
//! Contains the app-only token exchange and the paginated search client
//! that feeds the result pager.

mod api;
mod parsing;
mod search;

pub use api::obtain_bearer_token;
pub use search::{TwitterSearchClient, PAGE_SIZE};
