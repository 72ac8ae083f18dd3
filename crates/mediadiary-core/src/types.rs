//! Core data types shared by the facet engine, the store and the chart service.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DiaryError, Result};

/// Kind of media a diary record logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Film,
    Tv,
    Album,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [MediaType::Film, MediaType::Tv, MediaType::Album];

    /// Stored/wire form, also used as the facet key in the aggregate.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Film => "film",
            MediaType::Tv => "tv",
            MediaType::Album => "album",
        }
    }

    /// Human label.
    pub fn label(self) -> &'static str {
        match self {
            MediaType::Film => "Film",
            MediaType::Tv => "TV",
            MediaType::Album => "Album",
        }
    }

    pub fn all() -> BTreeSet<MediaType> {
        Self::ALL.into_iter().collect()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = DiaryError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "film" => Ok(MediaType::Film),
            "tv" => Ok(MediaType::Tv),
            "album" => Ok(MediaType::Album),
            other => Err(DiaryError::InvalidInput(format!(
                "Unknown media type: {} (use film, tv or album)",
                other
            ))),
        }
    }
}

const RATING_LABELS: [&str; 11] = [
    "No Rating",
    "½",
    "⭑",
    "⭑ ½",
    "⭑⭑",
    "⭑⭑ ½",
    "⭑⭑⭑",
    "⭑⭑⭑ ½",
    "⭑⭑⭑⭑",
    "⭑⭑⭑⭑ ½",
    "⭑⭑⭑⭑⭑",
];

/// A rating in half-star units, `0..=10`. Zero means "not rated".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const UNRATED: Rating = Rating(0);
    pub const MAX_HALF_STARS: u8 = 10;

    pub fn new(half_stars: u8) -> Result<Self> {
        if half_stars > Self::MAX_HALF_STARS {
            return Err(DiaryError::Validation(format!(
                "Rating out of range: {} (max {})",
                half_stars,
                Self::MAX_HALF_STARS
            )));
        }
        Ok(Self(half_stars))
    }

    /// Build from a star count such as `3.5`. Only whole and half stars are exact.
    pub fn from_stars(stars: f32) -> Result<Self> {
        let doubled = stars * 2.0;
        if !(0.0..=f32::from(Self::MAX_HALF_STARS)).contains(&doubled) || doubled.fract() != 0.0 {
            return Err(DiaryError::Validation(format!(
                "Rating must be a half-star step between 0 and 5: {}",
                stars
            )));
        }
        Self::new(doubled as u8)
    }

    pub fn half_stars(self) -> u8 {
        self.0
    }

    pub fn stars(self) -> f32 {
        f32::from(self.0) / 2.0
    }

    pub fn is_unrated(self) -> bool {
        self.0 == 0
    }

    pub fn label(self) -> &'static str {
        RATING_LABELS[usize::from(self.0)]
    }
}

impl TryFrom<u8> for Rating {
    type Error = DiaryError;

    fn try_from(value: u8) -> Result<Self> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// One option of the rating selector.
///
/// The selector is keyed at half-star resolution; `NoRating` is the explicit
/// "unrated" filter and is distinct from `All` (no restriction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingOption {
    All,
    NoRating,
    Stars(u8),
}

impl RatingOption {
    /// Options in the order the selector lists them: all, 5 stars down to ½, unrated.
    pub fn choices() -> Vec<RatingOption> {
        let mut choices = vec![RatingOption::All];
        choices.extend((1..=Rating::MAX_HALF_STARS).rev().map(RatingOption::Stars));
        choices.push(RatingOption::NoRating);
        choices
    }

    pub fn to_filter(self) -> Result<Option<Rating>> {
        match self {
            RatingOption::All => Ok(None),
            RatingOption::NoRating => Ok(Some(Rating::UNRATED)),
            RatingOption::Stars(0) => Err(DiaryError::Validation(
                "Use NoRating for the unrated filter".to_string(),
            )),
            RatingOption::Stars(key) => Rating::new(key).map(Some),
        }
    }

    pub fn from_filter(rating: Option<Rating>) -> Self {
        match rating {
            None => RatingOption::All,
            Some(r) if r.is_unrated() => RatingOption::NoRating,
            Some(r) => RatingOption::Stars(r.half_stars()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RatingOption::All => "All Ratings",
            RatingOption::NoRating => RATING_LABELS[0],
            RatingOption::Stars(key) => RATING_LABELS
                .get(usize::from(key))
                .copied()
                .unwrap_or("?"),
        }
    }
}

/// One logged media entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryRecord {
    /// Stable id, unique per user
    pub id: String,

    #[serde(rename = "type")]
    pub media_type: MediaType,

    #[serde(default)]
    pub title: String,

    /// Half-star rating, 0 when not rated
    #[serde(default = "unrated")]
    pub rating: Rating,

    /// Date the entry was logged
    pub diary_date: NaiveDate,

    /// Year the entry was logged
    pub diary_year: i32,

    /// Decade of the original release (e.g. 1990)
    pub released_decade: i32,

    /// Whether the media was seen/heard before this diary entry
    #[serde(default)]
    pub logged_before: bool,

    #[serde(default)]
    pub genre: Option<String>,
}

fn unrated() -> Rating {
    Rating::UNRATED
}

impl DiaryRecord {
    pub fn new(
        id: impl Into<String>,
        media_type: MediaType,
        title: impl Into<String>,
        diary_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            media_type,
            title: title.into(),
            rating: Rating::UNRATED,
            diary_date,
            diary_year: diary_date.year(),
            released_decade: decade_of(diary_date.year()),
            logged_before: false,
            genre: None,
        }
    }

    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.released_decade = decade_of(year);
        self
    }

    pub fn with_logged_before(mut self, logged_before: bool) -> Self {
        self.logged_before = logged_before;
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }
}

/// Decade a year falls in, e.g. `1994 -> 1990`.
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

/// A facet selection. `None` on any field means "no restriction".
///
/// Held as a draft by the filter composer and as the committed snapshot by
/// the global store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    pub media_type: Option<BTreeSet<MediaType>>,
    pub rating: Option<Rating>,
    pub released_decade: Option<i32>,
    pub logged_before: Option<bool>,
    pub genre: Option<String>,
    pub diary_year: Option<i32>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn media_types(mut self, types: impl IntoIterator<Item = MediaType>) -> Self {
        self.media_type = Some(types.into_iter().collect());
        self
    }

    pub fn rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn released_decade(mut self, decade: i32) -> Self {
        self.released_decade = Some(decade);
        self
    }

    pub fn logged_before(mut self, logged_before: bool) -> Self {
        self.logged_before = Some(logged_before);
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn diary_year(mut self, year: i32) -> Self {
        self.diary_year = Some(year);
        self
    }

    /// True when no field restricts anything.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of restricting fields.
    pub fn active_count(&self) -> usize {
        [
            self.media_type.is_some(),
            self.rating.is_some(),
            self.released_decade.is_some(),
            self.logged_before.is_some(),
            self.genre.is_some(),
            self.diary_year.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Collapse an empty media-type set into "no restriction".
    pub fn normalized(mut self) -> Self {
        if self.media_type.as_ref().is_some_and(|set| set.is_empty()) {
            self.media_type = None;
        }
        self
    }

    /// Evaluate the selection against a single record.
    pub fn matches(&self, record: &DiaryRecord) -> bool {
        self.media_type
            .as_ref()
            .map_or(true, |set| set.is_empty() || set.contains(&record.media_type))
            && self.rating.map_or(true, |r| r == record.rating)
            && self
                .released_decade
                .map_or(true, |d| d == record.released_decade)
            && self.logged_before.map_or(true, |b| b == record.logged_before)
            && self
                .genre
                .as_deref()
                .map_or(true, |g| record.genre.as_deref() == Some(g))
            && self.diary_year.map_or(true, |y| y == record.diary_year)
    }
}

/// Colour theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = DiaryError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(DiaryError::InvalidInput(format!(
                "Unknown theme: {} (use light or dark)",
                other
            ))),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

/// Durable per-user preferences. The remote document is the source of truth;
/// the store's copy is a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub theme: Theme,

    /// Display-scoped "current" year, unrelated to the filter's diary year
    #[serde(default)]
    pub year: Option<String>,

    #[serde(default)]
    pub years: Vec<i32>,

    /// Media types the user chose to track
    #[serde(default = "MediaType::all")]
    pub media_types: BTreeSet<MediaType>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            year: None,
            years: Vec::new(),
            media_types: MediaType::all(),
        }
    }
}

impl UserPreferences {
    pub fn validate(&self) -> Result<()> {
        if self.media_types.is_empty() {
            return Err(DiaryError::Validation(
                "Select at least 1 media type to track".to_string(),
            ));
        }
        Ok(())
    }
}

/// Signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
