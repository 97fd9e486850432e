//! Static product catalog.
//!
//! The catalog is the canonical source of product data. Cart routes resolve
//! product ids here, so the descriptor handed to the cart store always carries
//! the catalog's own name and price.

use rust_decimal::Decimal;
use wearview_core::cart::ProductDescriptor;
use wearview_core::{Price, ProductId};

/// Category filter value meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// A product listed in the storefront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub image: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl Product {
    /// The descriptor passed to `CartStore::add_to_cart`.
    #[must_use]
    pub fn descriptor(&self) -> ProductDescriptor {
        ProductDescriptor {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
            category: self.category.clone(),
        }
    }

    /// Display price.
    #[must_use]
    pub const fn display_price(&self) -> Price {
        Price::inr(self.price)
    }
}

/// The product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from a product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// All products, in listing order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Find a product by id.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Find a product by id, falling back to the first listed product.
    ///
    /// The try-on page always has something to show, even for stale links.
    #[must_use]
    pub fn find_or_first(&self, id: &ProductId) -> Option<&Product> {
        self.find(id).or_else(|| self.products.first())
    }

    /// Distinct categories in listing order, preceded by [`ALL_CATEGORIES`].
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories = vec![ALL_CATEGORIES];
        for product in &self.products {
            if !categories.contains(&product.category.as_str()) {
                categories.push(&product.category);
            }
        }
        categories
    }

    /// Products in a category; [`ALL_CATEGORIES`] returns everything.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| category == ALL_CATEGORIES || p.category == category)
            .collect()
    }
}

fn product(
    id: &str,
    name: &str,
    category: &str,
    price: i64,
    image: &str,
    description: &str,
    tags: &[&str],
) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        price: Decimal::new(price, 0),
        image: image.to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            product(
                "1",
                "Classic White T-Shirt",
                "Shirts",
                1299,
                "/static/images/tshirt.svg",
                "A comfortable, classic fit t-shirt made from 100% cotton.",
                &["New", "Popular"],
            ),
            product(
                "2",
                "Slim Fit Jeans",
                "Pants",
                2499,
                "/static/images/jeans.svg",
                "Modern slim fit jeans with a comfortable stretch fabric.",
                &["Bestseller"],
            ),
            product(
                "3",
                "Blessed Hoodie",
                "Hoodies",
                1999,
                "/static/images/hoodie.svg",
                "A warm and comfortable hoodie perfect for casual wear.",
                &[],
            ),
            product(
                "4",
                "Running Shoes",
                "Shoes",
                3499,
                "/static/images/running-shoes.svg",
                "Lightweight running shoes with responsive cushioning.",
                &["New"],
            ),
            product(
                "5",
                "Leather Jacket",
                "Jackets",
                4999,
                "/static/images/leather-jacket.svg",
                "Premium leather jacket with a classic design.",
                &["Premium"],
            ),
            product(
                "6",
                "Summer Beach Set",
                "Sets",
                2999,
                "/static/images/summer-set.svg",
                "Light and stylish summer beach set with tropical print.",
                &[],
            ),
        ])
    }
}
