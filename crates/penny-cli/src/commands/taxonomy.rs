//! Taxonomy command implementation

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;
use penny_core::Taxonomy;

use super::load_taxonomy;

/// Validate a taxonomy file and print its tree
pub fn cmd_taxonomy(taxonomy_path: &Path) -> Result<()> {
    let taxonomy = load_taxonomy(taxonomy_path)?;

    print!("{}", render_taxonomy(&taxonomy));
    println!();
    println!(
        "✅ {} categories, {} subcategories ({})",
        taxonomy.category_count(),
        taxonomy.subcategory_count(),
        taxonomy_path.display()
    );

    Ok(())
}

/// Render the taxonomy as an indented tree
pub fn render_taxonomy(taxonomy: &Taxonomy) -> String {
    let mut out = String::new();

    for (general, subcategories) in taxonomy.iter() {
        let _ = writeln!(out, "{}", general);
        for (name, detail) in subcategories {
            let _ = writeln!(
                out,
                "  {:<40} {:>5}  {:<12} {}",
                name, detail.code, detail.need, detail.description
            );
        }
    }

    out
}
