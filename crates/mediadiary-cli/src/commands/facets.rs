use mediadiary_core::{compute_candidates, FacetDimension};

use crate::app::AppContext;
use crate::cli::FacetsArgs;
use crate::helpers::parse_dimension;
use crate::output::{facets_json, facets_table};

pub async fn handle_facets(ctx: &AppContext<'_>, args: &FacetsArgs) -> anyhow::Result<()> {
    let dimensions = match args.dimension.as_deref() {
        Some(value) => vec![parse_dimension(value)?],
        None => FacetDimension::ALL.to_vec(),
    };

    let (store, _user) = ctx.signed_in_store().await?;
    let data = store.filter_data_or_empty().await;

    let groups: Vec<_> = dimensions
        .into_iter()
        .map(|dimension| {
            let candidates =
                compute_candidates(&data, dimension, args.year, dimension.default_order());
            (dimension, candidates)
        })
        .filter(|(_, candidates)| !candidates.is_empty())
        .collect();

    if args.json {
        println!("{}", facets_json(&groups)?);
    } else if groups.is_empty() {
        if !ctx.quiet() {
            println!("No facet data yet.");
        }
    } else {
        println!("{}", facets_table(&groups));
    }
    Ok(())
}
