//! List the storefront catalog.

use std::io::Write;

use wearview_storefront::catalog::Catalog;

/// Write one line per product: id, category, price, name.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn list(out: &mut impl Write) -> std::io::Result<()> {
    let catalog = Catalog::default();
    for product in catalog.all() {
        writeln!(
            out,
            "{:<4} {:<10} {:>8}  {}",
            product.id.as_str(),
            product.category,
            product.display_price().display(),
            product.name
        )?;
    }
    Ok(())
}
