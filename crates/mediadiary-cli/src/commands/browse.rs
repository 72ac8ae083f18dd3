//! Interactive filter panel.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{MultiSelect, Select};

use mediadiary_core::{
    ChartService, FacetCandidate, FacetDimension, FilterComposer, FilterData, FilterSelection,
    RatingOption,
};

use crate::app::{AppContext, DiaryStore};
use crate::output::{facet_label, print_records};

enum MenuItem {
    Facet(FacetDimension),
    Reset,
    Save,
    Cancel,
}

pub async fn handle_browse(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let (store, user) = ctx.signed_in_store().await?;
    let data = store.filter_data_or_empty().await;
    let theme = ColorfulTheme::default();

    let mut composer = FilterComposer::new();
    composer.open(&store)?;

    loop {
        let draft = composer.draft().cloned().unwrap_or_default();
        let menu = menu(&composer, &data, &draft);
        let labels: Vec<&str> = menu.iter().map(|(_, label)| label.as_str()).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt("Filter")
            .items(&labels)
            .default(0)
            .interact()?;

        match &menu[choice].0 {
            MenuItem::Facet(dimension) => {
                edit_facet(&theme, &mut composer, &data, *dimension)?;
            }
            MenuItem::Reset => composer.reset()?,
            MenuItem::Save => break,
            MenuItem::Cancel => {
                composer.close(&store);
                return Ok(());
            }
        }
    }

    commit_and_chart(ctx, &store, &mut composer, &user.uid).await
}

async fn commit_and_chart(
    ctx: &AppContext<'_>,
    store: &DiaryStore,
    composer: &mut FilterComposer,
    uid: &str,
) -> anyhow::Result<()> {
    let selection = composer.save(store)?;
    let records = ChartService::new(store.remote())
        .query_selection(uid, &selection)
        .await?;
    print_records(&records, false, ctx.quiet())
}

/// Menu entries; facets without candidates get no control.
fn menu(
    composer: &FilterComposer,
    data: &FilterData,
    draft: &FilterSelection,
) -> Vec<(MenuItem, String)> {
    let mut items = Vec::new();
    for dimension in FacetDimension::ALL {
        if composer.candidates(data, dimension).is_empty() {
            continue;
        }
        let label = format!("{}: {}", dimension.as_str(), current_value(draft, dimension));
        items.push((MenuItem::Facet(dimension), label));
    }
    if composer.can_reset() {
        items.push((MenuItem::Reset, "Reset".to_string()));
    }
    items.push((MenuItem::Save, "Save and chart".to_string()));
    items.push((MenuItem::Cancel, "Cancel".to_string()));
    items
}

fn current_value(draft: &FilterSelection, dimension: FacetDimension) -> String {
    let any = || "any".to_string();
    match dimension {
        FacetDimension::DiaryYear => draft.diary_year.map_or_else(any, |y| y.to_string()),
        FacetDimension::MediaType => draft.media_type.as_ref().map_or_else(any, |set| {
            set.iter().map(|t| t.label()).collect::<Vec<_>>().join(", ")
        }),
        FacetDimension::Rating => RatingOption::from_filter(draft.rating).label().to_string(),
        FacetDimension::ReleasedDecade => draft
            .released_decade
            .map_or_else(any, |d| format!("{}s", d)),
        FacetDimension::LoggedBefore => draft.logged_before.map_or_else(any, |b| b.to_string()),
        FacetDimension::Genre => draft.genre.clone().unwrap_or_else(any),
    }
}

fn edit_facet(
    theme: &ColorfulTheme,
    composer: &mut FilterComposer,
    data: &FilterData,
    dimension: FacetDimension,
) -> anyhow::Result<()> {
    let candidates = composer.candidates(data, dimension);

    if dimension == FacetDimension::MediaType {
        let selected = composer
            .draft()
            .and_then(|d| d.media_type.clone())
            .unwrap_or_default();
        let labels: Vec<String> = candidates
            .iter()
            .map(|c| candidate_label(dimension, c))
            .collect();
        let defaults: Vec<bool> = candidates
            .iter()
            .map(|c| c.as_media_type().is_some_and(|t| selected.contains(&t)))
            .collect();
        let picked = MultiSelect::with_theme(theme)
            .with_prompt("Media types (none = any)")
            .items(&labels)
            .defaults(&defaults)
            .interact()?;
        composer.clear_media_types()?;
        for index in picked {
            if let Some(media_type) = candidates[index].as_media_type() {
                composer.toggle_media_type(media_type)?;
            }
        }
        return Ok(());
    }

    let mut labels = vec!["Any".to_string()];
    labels.extend(candidates.iter().map(|c| candidate_label(dimension, c)));
    let choice = Select::with_theme(theme)
        .with_prompt(dimension.as_str())
        .items(&labels)
        .default(0)
        .interact()?;
    let picked = choice.checked_sub(1).and_then(|i| candidates.get(i));
    apply_choice(composer, dimension, picked)
}

fn candidate_label(dimension: FacetDimension, candidate: &FacetCandidate) -> String {
    format!("{} ({})", facet_label(dimension, candidate), candidate.count)
}

fn apply_choice(
    composer: &mut FilterComposer,
    dimension: FacetDimension,
    picked: Option<&FacetCandidate>,
) -> anyhow::Result<()> {
    match dimension {
        FacetDimension::DiaryYear => composer.set_diary_year(picked.and_then(|c| c.as_i32()))?,
        FacetDimension::MediaType => {
            composer.clear_media_types()?;
            if let Some(media_type) = picked.and_then(|c| c.as_media_type()) {
                composer.toggle_media_type(media_type)?;
            }
        }
        FacetDimension::Rating => {
            let option = match picked.and_then(|c| c.as_i32()) {
                None => RatingOption::All,
                Some(0) => RatingOption::NoRating,
                Some(key) => RatingOption::Stars(u8::try_from(key)?),
            };
            composer.set_rating(option)?;
        }
        FacetDimension::ReleasedDecade => {
            composer.set_released_decade(picked.and_then(|c| c.as_i32()))?
        }
        FacetDimension::LoggedBefore => {
            composer.set_logged_before(picked.and_then(|c| c.value.parse().ok()))?
        }
        FacetDimension::Genre => composer.set_genre(picked.map(|c| c.value.clone()))?,
    }
    Ok(())
}
