//! Argument parsing helpers shared by command handlers.

use chrono::NaiveDate;

use mediadiary_core::{
    compute_candidates, FacetDimension, FilterData, MediaType, Rating, RatingOption,
};

use crate::errors::CliError;

pub fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        CliError::invalid_input(format!("Invalid date '{}' (expected YYYY-MM-DD): {}", value, e))
            .into()
    })
}

pub fn parse_media_type(value: &str) -> anyhow::Result<MediaType> {
    value
        .parse()
        .map_err(|e: mediadiary_core::DiaryError| CliError::invalid_input(e.to_string()).into())
}

pub fn parse_media_types(values: &[String]) -> anyhow::Result<Vec<MediaType>> {
    values.iter().map(|v| parse_media_type(v)).collect()
}

pub fn parse_stars(stars: f32) -> anyhow::Result<Rating> {
    Rating::from_stars(stars)
        .map_err(|e| CliError::invalid_input(format!("Invalid rating {}: {}", stars, e)).into())
}

/// Parse a rating filter: stars such as `3.5`, or `none` for unrated records.
pub fn parse_rating_option(value: &str) -> anyhow::Result<RatingOption> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("unrated") {
        return Ok(RatingOption::NoRating);
    }
    let stars: f32 = trimmed
        .parse()
        .map_err(|_| CliError::invalid_input(format!("Invalid rating '{}'", value)))?;
    let rating = parse_stars(stars)?;
    if rating.is_unrated() {
        return Ok(RatingOption::NoRating);
    }
    Ok(RatingOption::Stars(rating.half_stars()))
}

pub fn parse_dimension(value: &str) -> anyhow::Result<FacetDimension> {
    FacetDimension::parse(value).ok_or_else(|| {
        let known: Vec<&str> = FacetDimension::ALL.iter().map(|d| d.as_str()).collect();
        CliError::invalid_input(format!(
            "Unknown facet '{}'. Known facets: {}",
            value,
            known.join(", ")
        ))
        .into()
    })
}

/// Reject a facet value that has no records under the active year.
pub fn require_candidate(
    data: &FilterData,
    dimension: FacetDimension,
    active_year: Option<i32>,
    value: &str,
) -> anyhow::Result<()> {
    let candidates = compute_candidates(data, dimension, active_year, dimension.default_order());
    if candidates.iter().any(|c| c.value == value) {
        return Ok(());
    }
    let scope = active_year.map_or_else(|| "any year".to_string(), |y| y.to_string());
    let available: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
    let hint = if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    };
    Err(CliError::invalid_input(format!(
        "No {} records with value '{}' in {} (available: {})",
        dimension.as_str(),
        value,
        scope,
        hint
    ))
    .into())
}
