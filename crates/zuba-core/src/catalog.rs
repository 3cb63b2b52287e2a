//! # Catalog Adapter
//!
//! Product documents exist in two shapes in the product store. Everything
//! downstream works on [`CatalogProduct`]; [`migrate`] is the only place
//! that knows about the legacy layout.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Product Document Versions                          │
//! │                                                                         │
//! │  Legacy (no schemaVersion)          V2 (schemaVersion ≥ 2)              │
//! │  ──────────────────────────         ──────────────────────────          │
//! │  price, oldPrice                    pricing { price, compareAtPrice }   │
//! │  countInStock                       inventory { stock }                 │
//! │  weight, weightUnit, dimensions     shipping { weight, dimensions }     │
//! │  size[], color[]                    variations[] { attributes, stock }  │
//! │            │                                   │                        │
//! │            └──────────────┬────────────────────┘                        │
//! │                           ▼                                             │
//! │                    migrate(doc)                                         │
//! │                           │                                             │
//! │                           ▼                                             │
//! │                    CatalogProduct                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;
use crate::money::Money;
use crate::package::{CartLine, Dimensions, ShippingProfile, WeightUnit};

/// First schema version using the nested layout.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

// =============================================================================
// Stored Documents
// =============================================================================

/// Flat product layout written by older admin builds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProduct {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub old_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub count_in_stock: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub size: Vec<String>,
    #[serde(default)]
    pub color: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPricing {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub compare_at_price: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInventory {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub stock: Option<f64>,
}

/// A sellable variant (size, color...) of a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub stock: Option<f64>,
}

impl Variation {
    fn units_in_stock(&self) -> u32 {
        stock_units(self.stock)
    }
}

/// Nested product layout.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductV2 {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pricing: StoredPricing,
    #[serde(default)]
    pub inventory: StoredInventory,
    #[serde(default)]
    pub shipping: Option<ShippingProfile>,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

/// A product document in whichever shape it was stored.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductDocument {
    Legacy(LegacyProduct),
    V2(ProductV2),
}

impl ProductDocument {
    pub fn schema_version(&self) -> u32 {
        match self {
            ProductDocument::Legacy(_) => 1,
            ProductDocument::V2(_) => CURRENT_SCHEMA_VERSION,
        }
    }
}

impl<'de> Deserialize<'de> for ProductDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let version = match value.get("schemaVersion") {
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => lenient::parse_leading_f64(s),
            _ => None,
        };

        let document = match version {
            Some(v) if v >= f64::from(CURRENT_SCHEMA_VERSION) => {
                ProductDocument::V2(serde_json::from_value(value).map_err(serde::de::Error::custom)?)
            }
            _ => ProductDocument::Legacy(
                serde_json::from_value(value).map_err(serde::de::Error::custom)?,
            ),
        };
        Ok(document)
    }
}

// =============================================================================
// Canonical Product
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub price: Money,
    pub compare_at_price: Option<Money>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub stock: u32,
}

/// The one product shape business logic sees.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: Option<String>,
    pub name: String,
    pub pricing: Pricing,
    pub inventory: Inventory,
    pub shipping: ShippingProfile,
    pub variations: Vec<Variation>,
    /// Attribute values declared directly on the product, outside any
    /// variation.
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl CatalogProduct {
    /// Distinct attribute values across the product and its variations,
    /// sorted per attribute name.
    pub fn derive_attributes(&self) -> BTreeMap<String, Vec<String>> {
        let mut collected: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        let direct = self
            .attributes
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name, v)));
        let from_variations = self
            .variations
            .iter()
            .flat_map(|variation| variation.attributes.iter());

        for (name, value) in direct.chain(from_variations) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            collected
                .entry(name.clone())
                .or_default()
                .insert(value.to_string());
        }

        collected
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().collect()))
            .collect()
    }

    pub fn in_stock(&self) -> bool {
        self.inventory.stock > 0
    }
}

fn stock_units(stock: Option<f64>) -> u32 {
    match stock {
        Some(s) if s.is_finite() && s > 0.0 => s.trunc().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

fn price(value: Option<f64>) -> Option<Money> {
    value.filter(|v| *v >= 0.0).map(Money::from_major_f64)
}

fn legacy_attributes(legacy: &LegacyProduct) -> BTreeMap<String, Vec<String>> {
    [("size", &legacy.size), ("color", &legacy.color)]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(name, values)| (name.to_string(), values.clone()))
        .collect()
}

/// Converts any stored document into the canonical product.
///
/// ## Rules
/// - legacy `price` / `oldPrice` become `pricing.price` / `pricing.compareAtPrice`
/// - legacy `countInStock` becomes `inventory.stock`
/// - legacy flat weight and dimensions become the shipping profile
/// - with variations present, stock is the sum of variation stock
pub fn migrate(document: ProductDocument) -> CatalogProduct {
    match document {
        ProductDocument::Legacy(legacy) => CatalogProduct {
            pricing: Pricing {
                price: price(legacy.price).unwrap_or_default(),
                compare_at_price: price(legacy.old_price),
            },
            inventory: Inventory {
                stock: stock_units(legacy.count_in_stock),
            },
            shipping: ShippingProfile {
                weight: legacy.weight,
                weight_unit: legacy.weight_unit,
                dimensions: legacy.dimensions.clone(),
            },
            attributes: legacy_attributes(&legacy),
            id: legacy.id,
            name: legacy.name,
            variations: Vec::new(),
        },
        ProductDocument::V2(doc) => {
            let stock = if doc.variations.is_empty() {
                stock_units(doc.inventory.stock)
            } else {
                doc.variations
                    .iter()
                    .fold(0u32, |acc, v| acc.saturating_add(v.units_in_stock()))
            };

            CatalogProduct {
                id: doc.id,
                name: doc.name,
                pricing: Pricing {
                    price: price(doc.pricing.price).unwrap_or_default(),
                    compare_at_price: price(doc.pricing.compare_at_price),
                },
                inventory: Inventory { stock },
                shipping: doc.shipping.unwrap_or_default(),
                variations: doc.variations,
                attributes: BTreeMap::new(),
            }
        }
    }
}

impl CartLine {
    /// A cart line carrying the product's shipping profile.
    pub fn for_product(product: &CatalogProduct, quantity: u32) -> Self {
        CartLine::new(Some(product.shipping.clone()), quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
