//! Inspect and reset persisted carts.
//!
//! Goes through [`CartStore`] rather than reading the file directly, so the
//! output reflects exactly what the storefront would restore.

use std::io::Write;
use std::path::Path;

use wearview_core::cart::CartStore;
use wearview_core::{ClientId, Price};
use wearview_storefront::storage::FileStorage;

/// Print a client's cart.
///
/// # Errors
///
/// Returns an error if writing to `out` fails or JSON encoding fails.
pub fn show(
    out: &mut impl Write,
    data_dir: &Path,
    client: ClientId,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let cart = CartStore::restore(FileStorage::for_client(data_dir, client));

    if json {
        let snapshot = serde_json::json!({
            "client_id": client.to_string(),
            "items": cart.items(),
            "totals": cart.totals(),
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
        return Ok(());
    }

    if cart.is_empty() {
        writeln!(out, "Cart for {client} is empty")?;
        return Ok(());
    }

    for item in cart.items() {
        writeln!(
            out,
            "{:<4} {:<28} {:>4} x {:>8} = {:>9}",
            item.id.as_str(),
            item.name,
            item.quantity,
            Price::inr(item.price).display(),
            Price::inr(item.line_total()).display()
        )?;
    }
    writeln!(
        out,
        "{} item(s), total {}",
        cart.total_items(),
        Price::inr(cart.total_price())
    )?;
    Ok(())
}

/// Empty a client's cart.
///
/// # Errors
///
/// Returns an error if the emptied cart cannot be persisted or writing to
/// `out` fails.
pub fn clear(
    out: &mut impl Write,
    data_dir: &Path,
    client: ClientId,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = CartStore::restore(FileStorage::for_client(data_dir, client));
    let removed = cart.total_items();
    cart.clear_cart()?;
    tracing::info!(client_id = %client, removed, "Cart cleared");
    writeln!(out, "Cleared {removed} item(s) from cart for {client}")?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wearview_core::ProductId;
    use wearview_storefront::catalog::Catalog;

    use super::*;

    fn seeded(dir: &Path) -> ClientId {
        let client = ClientId::generate();
        let catalog = Catalog::default();
        let mut cart = CartStore::restore(FileStorage::for_client(dir, client));
        let hoodie = catalog.find(&ProductId::new("3")).unwrap();
        cart.add_to_cart(hoodie.descriptor()).unwrap();
        cart.add_to_cart(hoodie.descriptor()).unwrap();
        client
    }

    #[test]
    fn test_show_table() {
        let dir = tempfile::tempdir().unwrap();
        let client = seeded(dir.path());

        let mut out = Vec::new();
        show(&mut out, dir.path(), client, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Blessed Hoodie"));
        assert!(text.contains("2 item(s), total ₹3998"));
    }

    #[test]
    fn test_show_json() {
        let dir = tempfile::tempdir().unwrap();
        let client = seeded(dir.path());

        let mut out = Vec::new();
        show(&mut out, dir.path(), client, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["totals"]["total_items"], 2);
        assert_eq!(value["items"][0]["quantity"], 2);
    }

    #[test]
    fn test_show_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        show(&mut out, dir.path(), ClientId::generate(), false).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("is empty"));
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let client = seeded(dir.path());

        let mut out = Vec::new();
        clear(&mut out, dir.path(), client).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Cleared 2 item(s)"));

        let cart = CartStore::restore(FileStorage::for_client(dir.path(), client));
        assert!(cart.is_empty());
    }
}
