//! `fitcraft catalog`: browse the exercise catalog.

use anyhow::Result;

use fitcraft_core::catalog::{Catalog, CatalogSource, MuscleGroup, group_by_muscle};

use crate::pipeline;

#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogView {
    /// Only this muscle group.
    pub group: Option<MuscleGroup>,
    /// Print the prompt listing instead of the grouped view.
    pub listing: bool,
}

pub async fn run_catalog(source: &dyn CatalogSource, view: CatalogView) -> Result<()> {
    let catalog = pipeline::load_catalog(source).await?;
    print!("{}", render_catalog(&catalog, view));
    Ok(())
}

fn render_catalog(catalog: &Catalog, view: CatalogView) -> String {
    if view.listing {
        return format!("{}\n", catalog.format_listing());
    }

    let groups = group_by_muscle(catalog);
    let mut out = String::new();
    for (group, names) in &groups {
        if view.group.is_some_and(|g| g != *group) {
            continue;
        }
        out.push_str(&format!("{} [{}] ({})\n", group.label(), group.key(), names.len()));
        for name in names {
            out.push_str(&format!("  - {name}\n"));
        }
    }
    out
}
