//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;
use wearview_core::ProductId;

use crate::catalog::{ALL_CATEGORIES, Product};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub image: String,
    pub tags: Vec<String>,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_str().to_string(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.display_price().display(),
            image: product.image.clone(),
            tags: product.tags.clone(),
        }
    }
}

/// Category filter tab.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub active: bool,
}

/// Product listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub categories: Vec<CategoryView>,
    pub products: Vec<ProductCardView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductCardView,
    pub description: String,
}

/// Display product listing, optionally filtered by category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> ProductsIndexTemplate {
    let catalog = state.catalog();
    let selected = query
        .category
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());

    let categories = catalog
        .categories()
        .into_iter()
        .map(|name| CategoryView {
            active: name == selected,
            name: name.to_string(),
        })
        .collect();

    let products = catalog
        .by_category(&selected)
        .into_iter()
        .map(ProductCardView::from)
        .collect();

    ProductsIndexTemplate {
        categories,
        products,
    }
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ProductShowTemplate> {
    let product = state
        .catalog()
        .find(&ProductId::new(id.as_str()))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate {
        product: ProductCardView::from(product),
        description: product.description.clone(),
    })
}
