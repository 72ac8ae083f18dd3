//! Output formatting helpers for the CLI.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use mediadiary_core::{DiaryRecord, FacetCandidate, FacetDimension, UserPreferences};

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

/// Render records as a table, in the order given.
pub fn records_table(records: &[DiaryRecord]) -> String {
    let mut table = table(&["Date", "Type", "Title", "Rating", "Decade", "Genre", "Rewatch"]);
    for record in records {
        table.add_row(vec![
            record.diary_date.to_string(),
            record.media_type.label().to_string(),
            record.title.clone(),
            record.rating.label().to_string(),
            format!("{}s", record.released_decade),
            record.genre.clone().unwrap_or_default(),
            if record.logged_before { "yes" } else { "" }.to_string(),
        ]);
    }
    table.to_string()
}

pub fn records_json(records: &[DiaryRecord]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Print records as JSON or a table, with an empty-state line.
pub fn print_records(records: &[DiaryRecord], json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", records_json(records)?);
    } else if records.is_empty() {
        if !quiet {
            println!("No records found.");
        }
    } else {
        println!("{}", records_table(records));
    }
    Ok(())
}

/// Render facet candidates grouped by dimension.
pub fn facets_table(groups: &[(FacetDimension, Vec<FacetCandidate>)]) -> String {
    let mut table = table(&["Facet", "Value", "Count"]);
    for (dimension, candidates) in groups {
        for candidate in candidates {
            table.add_row(vec![
                dimension.as_str().to_string(),
                facet_label(*dimension, candidate),
                candidate.count.to_string(),
            ]);
        }
    }
    table.to_string()
}

pub fn facets_json(groups: &[(FacetDimension, Vec<FacetCandidate>)]) -> anyhow::Result<String> {
    let object: serde_json::Map<String, serde_json::Value> = groups
        .iter()
        .map(|(dimension, candidates)| {
            Ok((
                dimension.as_str().to_string(),
                serde_json::to_value(candidates)?,
            ))
        })
        .collect::<anyhow::Result<_>>()?;
    Ok(serde_json::to_string_pretty(&object)?)
}

/// Human label for a facet value.
pub fn facet_label(dimension: FacetDimension, candidate: &FacetCandidate) -> String {
    match dimension {
        FacetDimension::MediaType => candidate
            .as_media_type()
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| candidate.value.clone()),
        FacetDimension::Rating => candidate
            .as_i32()
            .and_then(|key| u8::try_from(key).ok())
            .and_then(|key| mediadiary_core::Rating::new(key).ok())
            .map(|rating| rating.label().to_string())
            .unwrap_or_else(|| candidate.value.clone()),
        FacetDimension::ReleasedDecade => format!("{}s", candidate.value),
        FacetDimension::LoggedBefore => match candidate.value.as_str() {
            "true" => "Logged before".to_string(),
            "false" => "First time".to_string(),
            other => other.to_string(),
        },
        FacetDimension::Genre | FacetDimension::DiaryYear => candidate.value.clone(),
    }
}

pub fn preferences_table(preferences: &UserPreferences) -> String {
    let mut table = table(&["Preference", "Value"]);
    let years: Vec<String> = preferences.years.iter().map(|y| y.to_string()).collect();
    let tracked: Vec<&str> = preferences.media_types.iter().map(|t| t.label()).collect();
    table.add_row(vec!["theme".to_string(), preferences.theme.to_string()]);
    table.add_row(vec![
        "year".to_string(),
        preferences.year.clone().unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec!["years".to_string(), years.join(", ")]);
    table.add_row(vec!["tracking".to_string(), tracked.join(", ")]);
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mediadiary_core::{MediaType, Rating};

    #[test]
    fn test_records_table_shows_labels() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 1).expect("date");
        let record = DiaryRecord::new("r1", MediaType::Tv, "Severance", date)
            .with_rating(Rating::new(9).expect("rating"))
            .with_release_year(2022);
        let rendered = records_table(&[record]);
        assert!(rendered.contains("Severance"));
        assert!(rendered.contains("TV"));
        assert!(rendered.contains("2020s"));
    }

    #[test]
    fn test_facet_labels() {
        let candidate = FacetCandidate {
            value: "tv".to_string(),
            count: 2,
        };
        assert_eq!(facet_label(FacetDimension::MediaType, &candidate), "TV");
        let candidate = FacetCandidate {
            value: "true".to_string(),
            count: 1,
        };
        assert_eq!(
            facet_label(FacetDimension::LoggedBefore, &candidate),
            "Logged before"
        );
    }
}
