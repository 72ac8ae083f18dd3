//! # Media Diary Core
//!
//! Core library for the media diary: faceted filtering over logged films,
//! TV and albums, user preference sync and rating-ordered chart queries.
//!
//! This crate holds the domain logic and the remote document store
//! abstraction, independent of any front end.
//!
//! ## Architecture
//!
//! - **types**: diary records, ratings, filter selections, preferences
//! - **facets**: year-scoped facet aggregate and candidate computation
//! - **composer**: draft filter state machine behind the filter panel
//! - **store**: global state store, observers, preference sync, logout
//! - **chart**: rating-ordered queries over the diary collection
//! - **remote**: document store trait, query builder, SQLite backend
//! - **diary**: record persistence and aggregate rebuild

pub mod chart;
pub mod composer;
pub mod diary;
pub mod error;
pub mod facets;
pub mod identity;
pub mod remote;
pub mod store;
pub mod types;

pub use chart::{ChartService, TOP_LIMIT};
pub use composer::{FilterComposer, FilterPanelHost, PanelState};
pub use error::{DiaryError, Result};
pub use facets::{compute_candidates, CandidateOrder, FacetCandidate, FacetDimension, FilterData};
pub use identity::IdentityProvider;
pub use remote::{DocumentStore, SqliteDocumentStore};
pub use store::{Action, GlobalStore, StoreState};
pub use types::{
    DiaryRecord, FilterSelection, MediaType, Rating, RatingOption, Theme, User, UserPreferences,
};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
