//! Products Data

use rust_decimal::Decimal;

use crate::domain::products::records::ProductUuid;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub catalog_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub inventory: u32,
    pub category: Option<String>,
    pub is_active: bool,
}

/// Product Update Data
///
/// Updates replace every field of the stored product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub catalog_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub inventory: u32,
    pub category: Option<String>,
    pub is_active: bool,
}

/// Catalog listing filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductQuery {
    /// Every product.
    All,

    /// Case-insensitive substring match on name or category.
    TextSearch(String),
}

impl ProductQuery {
    /// Interpret an optional search term; blank terms list everything.
    #[must_use]
    pub fn from_search(term: Option<&str>) -> Self {
        match term.map(str::trim) {
            Some(term) if !term.is_empty() => Self::TextSearch(term.to_string()),
            _ => Self::All,
        }
    }

    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::TextSearch(term) => Some(term),
        }
    }
}
