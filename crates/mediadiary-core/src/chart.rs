//! Chart/query service: read-only diary queries ordered by rating.

use serde_json::Value;

use crate::error::{DiaryError, Result};
use crate::remote::{from_document, paths, Direction, DocumentStore, FilterOp, Query};
use crate::types::{DiaryRecord, FilterSelection, MediaType};

/// Default size of the top chart.
pub const TOP_LIMIT: usize = 6;

pub struct ChartService<'a, S> {
    remote: &'a S,
}

impl<'a, S: DocumentStore> ChartService<'a, S> {
    pub fn new(remote: &'a S) -> Self {
        Self { remote }
    }

    /// Highest-rated records, unfiltered, at most `limit`.
    pub async fn query_top(&self, uid: &str, limit: usize) -> Result<Vec<DiaryRecord>> {
        self.run(top_query(uid, limit)).await
    }

    /// Records narrowed by exact diary year and/or media type.
    pub async fn query_filtered(
        &self,
        uid: &str,
        year: Option<i32>,
        media_type: Option<MediaType>,
    ) -> Result<Vec<DiaryRecord>> {
        self.run(filtered_query(uid, year, media_type)).await
    }

    /// Records matching every restricting field of `selection`.
    pub async fn query_selection(
        &self,
        uid: &str,
        selection: &FilterSelection,
    ) -> Result<Vec<DiaryRecord>> {
        self.run(selection_query(uid, selection)).await
    }

    async fn run(&self, query: Query) -> Result<Vec<DiaryRecord>> {
        let documents = self
            .remote
            .query(&query)
            .await
            .map_err(DiaryError::into_fetch)?;
        documents
            .into_iter()
            .map(|document| from_document::<DiaryRecord>(document).map_err(DiaryError::into_fetch))
            .collect()
    }
}

fn by_rating(uid: &str) -> Query {
    Query::collection(paths::diary(uid)).order_by("rating", Direction::Desc)
}

pub fn top_query(uid: &str, limit: usize) -> Query {
    by_rating(uid).limit(limit)
}

pub fn filtered_query(uid: &str, year: Option<i32>, media_type: Option<MediaType>) -> Query {
    let mut query = by_rating(uid);
    if let Some(year) = year {
        query = query.filter("diaryYear", FilterOp::Eq, year);
    }
    if let Some(media_type) = media_type {
        query = query.filter("type", FilterOp::Eq, media_type.as_str());
    }
    query
}

pub fn selection_query(uid: &str, selection: &FilterSelection) -> Query {
    let mut query = filtered_query(uid, selection.diary_year, None);

    if let Some(types) = selection.media_type.as_ref().filter(|set| !set.is_empty()) {
        query = match types.iter().next() {
            Some(only) if types.len() == 1 => query.filter("type", FilterOp::Eq, only.as_str()),
            _ => query.filter(
                "type",
                FilterOp::In,
                Value::Array(types.iter().map(|t| Value::from(t.as_str())).collect()),
            ),
        };
    }
    if let Some(rating) = selection.rating {
        query = query.filter("rating", FilterOp::Eq, rating.half_stars());
    }
    if let Some(decade) = selection.released_decade {
        query = query.filter("releasedDecade", FilterOp::Eq, decade);
    }
    if let Some(logged_before) = selection.logged_before {
        query = query.filter("loggedBefore", FilterOp::Eq, logged_before);
    }
    if let Some(genre) = selection.genre.as_deref() {
        query = query.filter("genre", FilterOp::Eq, genre);
    }
    query
}
