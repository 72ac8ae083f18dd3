//! Facet index: candidate values and counts per facet dimension.
//!
//! Counts come from a precomputed [`FilterData`] aggregate. Every dimension
//! except diary year is scoped per diary year, so candidates depend on the
//! active year and must be recomputed whenever it changes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{DiaryRecord, MediaType};

/// Per diary year, facet value -> record count.
pub type YearScopedCounts = BTreeMap<i32, BTreeMap<String, i64>>;

/// One filterable attribute of a diary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FacetDimension {
    MediaType,
    Rating,
    ReleasedDecade,
    LoggedBefore,
    Genre,
    DiaryYear,
}

impl FacetDimension {
    pub const ALL: [FacetDimension; 6] = [
        FacetDimension::DiaryYear,
        FacetDimension::MediaType,
        FacetDimension::Rating,
        FacetDimension::ReleasedDecade,
        FacetDimension::LoggedBefore,
        FacetDimension::Genre,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FacetDimension::MediaType => "media-type",
            FacetDimension::Rating => "rating",
            FacetDimension::ReleasedDecade => "decade",
            FacetDimension::LoggedBefore => "logged-before",
            FacetDimension::Genre => "genre",
            FacetDimension::DiaryYear => "diary-year",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dim| dim.as_str() == value)
    }

    /// Ordering the filter panel lists this dimension in.
    pub fn default_order(self) -> CandidateOrder {
        match self {
            FacetDimension::MediaType | FacetDimension::Genre | FacetDimension::LoggedBefore => {
                CandidateOrder::Alphabetic
            }
            FacetDimension::Rating
            | FacetDimension::ReleasedDecade
            | FacetDimension::DiaryYear => CandidateOrder::NumericDescending,
        }
    }
}

/// Ordering hint for [`compute_candidates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrder {
    Alphabetic,
    /// Numeric keys high to low; non-numeric keys follow alphabetically.
    NumericDescending,
}

/// A selectable facet value with its count under the active scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCandidate {
    pub value: String,
    pub count: i64,
}

impl FacetCandidate {
    pub fn as_i32(&self) -> Option<i32> {
        self.value.parse().ok()
    }

    pub fn as_media_type(&self) -> Option<MediaType> {
        self.value.parse().ok()
    }
}

/// Precomputed facet counts for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterData {
    #[serde(default)]
    pub filter_media_type: YearScopedCounts,
    #[serde(default)]
    pub filter_rating: YearScopedCounts,
    #[serde(default)]
    pub filter_released_decade: YearScopedCounts,
    #[serde(default)]
    pub filter_logged_before: YearScopedCounts,
    #[serde(default)]
    pub filter_genre: YearScopedCounts,
    #[serde(default)]
    pub filter_diary_year: BTreeMap<i32, i64>,
}

impl FilterData {
    /// Rebuild the aggregate from the full record set.
    pub fn from_records(records: &[DiaryRecord]) -> Self {
        let mut data = FilterData::default();
        for record in records {
            let year = record.diary_year;
            *data.filter_diary_year.entry(year).or_insert(0) += 1;
            bump(&mut data.filter_media_type, year, record.media_type.as_str());
            bump(
                &mut data.filter_rating,
                year,
                &record.rating.half_stars().to_string(),
            );
            bump(
                &mut data.filter_released_decade,
                year,
                &record.released_decade.to_string(),
            );
            bump(
                &mut data.filter_logged_before,
                year,
                if record.logged_before { "true" } else { "false" },
            );
            if let Some(genre) = record.genre.as_deref().filter(|g| !g.trim().is_empty()) {
                bump(&mut data.filter_genre, year, genre);
            }
        }
        data
    }

    pub fn is_empty(&self) -> bool {
        self.filter_diary_year.values().all(|count| *count <= 0)
            && FacetDimension::ALL
                .into_iter()
                .filter_map(|dim| self.year_scoped(dim))
                .all(|scoped| scoped.is_empty())
    }

    /// The year-scoped map backing a dimension; diary year has none.
    pub fn year_scoped(&self, dimension: FacetDimension) -> Option<&YearScopedCounts> {
        match dimension {
            FacetDimension::MediaType => Some(&self.filter_media_type),
            FacetDimension::Rating => Some(&self.filter_rating),
            FacetDimension::ReleasedDecade => Some(&self.filter_released_decade),
            FacetDimension::LoggedBefore => Some(&self.filter_logged_before),
            FacetDimension::Genre => Some(&self.filter_genre),
            FacetDimension::DiaryYear => None,
        }
    }
}

fn bump(counts: &mut YearScopedCounts, year: i32, key: &str) {
    *counts
        .entry(year)
        .or_default()
        .entry(key.to_string())
        .or_insert(0) += 1;
}

/// Candidate values for `dimension` under `active_year`.
///
/// With an active year only that year's counts are used. Without one, the
/// result is the union of values positive in any year, each counted as the
/// sum of its positive per-year counts. Values whose count is not positive
/// are never returned. Diary year itself is not year-scoped and ignores `active_year`.
/// An absent dimension or year yields an empty list, which callers treat as
/// "no control to render".
pub fn compute_candidates(
    data: &FilterData,
    dimension: FacetDimension,
    active_year: Option<i32>,
    order: CandidateOrder,
) -> Vec<FacetCandidate> {
    let counts: BTreeMap<String, i64> = match data.year_scoped(dimension) {
        None => data
            .filter_diary_year
            .iter()
            .map(|(year, count)| (year.to_string(), *count))
            .collect(),
        Some(scoped) => match active_year {
            Some(year) => scoped.get(&year).cloned().unwrap_or_default(),
            None => {
                let mut merged: BTreeMap<String, i64> = BTreeMap::new();
                for per_year in scoped.values() {
                    for (value, count) in per_year.iter().filter(|(_, count)| **count > 0) {
                        *merged.entry(value.clone()).or_insert(0) += count;
                    }
                }
                merged
            }
        },
    };

    let mut candidates: Vec<FacetCandidate> = counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(value, count)| FacetCandidate { value, count })
        .collect();

    match order {
        // BTreeMap iteration already yields keys alphabetically.
        CandidateOrder::Alphabetic => {}
        CandidateOrder::NumericDescending => candidates.sort_by(numeric_descending),
    }
    candidates
}

fn numeric_descending(a: &FacetCandidate, b: &FacetCandidate) -> Ordering {
    match (a.value.parse::<i64>(), b.value.parse::<i64>()) {
        (Ok(x), Ok(y)) => y.cmp(&x),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.value.cmp(&b.value),
    }
}
