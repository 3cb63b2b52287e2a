//! # Package Aggregation
//!
//! Reduces a cart to the single parcel quoted by the carrier and by the
//! fallback formula.
//!
//! ## Aggregation Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     aggregate(cart_lines)                               │
//! │                                                                         │
//! │  Line A: 2 × (1 kg, 30×20×5 cm)     Line B: 1 × (500 g, 10×10×10 cm)   │
//! │           │                                   │                         │
//! │           ▼ to kg / cm, per-line clamps       ▼                         │
//! │                                                                         │
//! │  weight = Σ weight × qty          = 2×1 + 1×0.5      = 2.5 kg          │
//! │  length = max(length)             = max(30, 10)      = 30 cm           │
//! │  width  = max(width)              = max(20, 10)      = 20 cm           │
//! │  height = Σ height × qty (stack)  = 2×5 + 1×10       = 20 cm           │
//! │                                                                         │
//! │           ▼ final clamps                                                │
//! │                                                                         │
//! │  weight ∈ [0.5, 100]   length ∈ [20, 200]                              │
//! │  width  ∈ [15, 200]    height ∈ [10, 200]                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure and infallible: unparseable numbers fall back to the defaults
//! (0.5 kg, 20×15×10 cm).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::lenient;

// =============================================================================
// Constants
// =============================================================================

pub const DEFAULT_WEIGHT_KG: f64 = 0.5;
pub const DEFAULT_LENGTH_CM: f64 = 20.0;
pub const DEFAULT_WIDTH_CM: f64 = 15.0;
pub const DEFAULT_HEIGHT_CM: f64 = 10.0;

pub const MIN_WEIGHT_KG: f64 = 0.5;
pub const MAX_WEIGHT_KG: f64 = 100.0;
pub const MIN_LINE_DIMENSION_CM: f64 = 1.0;
pub const MAX_DIMENSION_CM: f64 = 200.0;

const G_PER_KG: f64 = 1000.0;
const KG_PER_LB: f64 = 0.453592;
const KG_PER_OZ: f64 = 0.0283495;
const CM_PER_IN: f64 = 2.54;
const CM_PER_M: f64 = 100.0;

// =============================================================================
// Units
// =============================================================================

/// Weight unit of a product shipping profile.
///
/// Parsed leniently: unknown strings mean kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum WeightUnit {
    #[default]
    Kg,
    G,
    Lb,
    Oz,
}

impl WeightUnit {
    /// Converts `value` in this unit to kilograms.
    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::G => value / G_PER_KG,
            WeightUnit::Lb => value * KG_PER_LB,
            WeightUnit::Oz => value * KG_PER_OZ,
        }
    }
}

impl From<&str> for WeightUnit {
    fn from(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "g" | "gr" | "gram" | "grams" => WeightUnit::G,
            "lb" | "lbs" | "pound" | "pounds" => WeightUnit::Lb,
            "oz" | "ounce" | "ounces" => WeightUnit::Oz,
            _ => WeightUnit::Kg,
        }
    }
}

impl From<Option<String>> for WeightUnit {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map(WeightUnit::from).unwrap_or_default()
    }
}

/// Dimension unit of a product shipping profile.
///
/// Parsed leniently: unknown strings mean centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum DimensionUnit {
    #[default]
    Cm,
    In,
    M,
}

impl DimensionUnit {
    /// Converts `value` in this unit to centimetres.
    pub fn to_cm(self, value: f64) -> f64 {
        match self {
            DimensionUnit::Cm => value,
            DimensionUnit::In => value * CM_PER_IN,
            DimensionUnit::M => value * CM_PER_M,
        }
    }
}

impl From<&str> for DimensionUnit {
    fn from(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "in" | "inch" | "inches" => DimensionUnit::In,
            "m" | "meter" | "meters" | "metre" | "metres" => DimensionUnit::M,
            _ => DimensionUnit::Cm,
        }
    }
}

impl From<Option<String>> for DimensionUnit {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map(DimensionUnit::from).unwrap_or_default()
    }
}

// =============================================================================
// Shipping Profile
// =============================================================================

/// Box dimensions of a single product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub length: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub height: Option<f64>,
    #[serde(default)]
    pub unit: DimensionUnit,
}

/// Physical shipping data attached to a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingProfile {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}

impl ShippingProfile {
    /// A profile in kilograms and centimetres.
    pub fn metric(weight_kg: f64, length_cm: f64, width_cm: f64, height_cm: f64) -> Self {
        ShippingProfile {
            weight: Some(weight_kg),
            weight_unit: WeightUnit::Kg,
            dimensions: Some(Dimensions {
                length: Some(length_cm),
                width: Some(width_cm),
                height: Some(height_cm),
                unit: DimensionUnit::Cm,
            }),
        }
    }

    /// Weight in kg after the per-line rules: default when absent or not
    /// positive, capped at 100 kg.
    fn line_weight_kg(&self) -> f64 {
        let kg = self
            .weight
            .map(|w| self.weight_unit.to_kg(w))
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(DEFAULT_WEIGHT_KG);
        kg.min(MAX_WEIGHT_KG)
    }

    /// (length, width, height) in cm after the per-line rules.
    fn line_dimensions_cm(&self) -> (f64, f64, f64) {
        let dims = self.dimensions.as_ref();
        let unit = dims.map(|d| d.unit).unwrap_or_default();
        let side = |value: Option<f64>, default: f64| {
            value
                .map(|v| unit.to_cm(v))
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(default)
                .clamp(MIN_LINE_DIMENSION_CM, MAX_DIMENSION_CM)
        };

        (
            side(dims.and_then(|d| d.length), DEFAULT_LENGTH_CM),
            side(dims.and_then(|d| d.width), DEFAULT_WIDTH_CM),
            side(dims.and_then(|d| d.height), DEFAULT_HEIGHT_CM),
        )
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One cart entry as seen by the shipping engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(default, alias = "shippingProfile", alias = "productShipping")]
    pub product_shipping_profile: Option<ShippingProfile>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub quantity: Option<f64>,
}

impl CartLine {
    pub fn new(profile: Option<ShippingProfile>, quantity: u32) -> Self {
        CartLine {
            product_shipping_profile: profile,
            quantity: Some(f64::from(quantity)),
        }
    }

    /// Quantity coerced to a positive integer (absent or < 1 → 1).
    pub fn units(&self) -> u32 {
        match self.quantity {
            Some(q) if q.is_finite() && q >= 1.0 => q.trunc().min(f64::from(u32::MAX)) as u32,
            _ => 1,
        }
    }
}

/// Σ of coerced line quantities.
pub fn total_quantity(lines: &[CartLine]) -> u32 {
    lines
        .iter()
        .fold(0u32, |acc, line| acc.saturating_add(line.units()))
}

// =============================================================================
// Package
// =============================================================================

/// The single parcel representing the whole cart.
///
/// ## Invariants
/// - `weight_kg` ∈ [0.5, 100]
/// - `length_cm` ∈ [20, 200], `width_cm` ∈ [15, 200], `height_cm` ∈ [10, 200]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Package {
    pub weight_kg: f64,
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
}

impl Default for Package {
    fn default() -> Self {
        Package {
            weight_kg: DEFAULT_WEIGHT_KG,
            length_cm: DEFAULT_LENGTH_CM,
            width_cm: DEFAULT_WIDTH_CM,
            height_cm: DEFAULT_HEIGHT_CM,
        }
    }
}

/// Aggregates cart lines into one package.
///
/// ## Example
/// ```rust
/// use zuba_core::package::{aggregate, CartLine, ShippingProfile};
///
/// let lines = vec![CartLine::new(Some(ShippingProfile::metric(2.0, 20.0, 15.0, 10.0)), 3)];
/// let package = aggregate(&lines);
/// assert_eq!(package.weight_kg, 6.0);
/// assert_eq!(package.height_cm, 30.0);
/// ```
pub fn aggregate(lines: &[CartLine]) -> Package {
    if lines.is_empty() {
        return Package::default();
    }

    let default_profile = ShippingProfile::default();
    let mut weight = 0.0;
    let mut length: f64 = 0.0;
    let mut width: f64 = 0.0;
    let mut height = 0.0;

    for line in lines {
        let profile = line
            .product_shipping_profile
            .as_ref()
            .unwrap_or(&default_profile);
        let qty = f64::from(line.units());
        let (l, w, h) = profile.line_dimensions_cm();

        weight += profile.line_weight_kg() * qty;
        length = length.max(l);
        width = width.max(w);
        height += h * qty;
    }

    Package {
        weight_kg: weight.clamp(MIN_WEIGHT_KG, MAX_WEIGHT_KG),
        length_cm: length.clamp(DEFAULT_LENGTH_CM, MAX_DIMENSION_CM),
        width_cm: width.clamp(DEFAULT_WIDTH_CM, MAX_DIMENSION_CM),
        height_cm: height.clamp(DEFAULT_HEIGHT_CM, MAX_DIMENSION_CM),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_within_bounds(p: &Package) {
        assert!((MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&p.weight_kg), "{p:?}");
        assert!((DEFAULT_LENGTH_CM..=MAX_DIMENSION_CM).contains(&p.length_cm), "{p:?}");
        assert!((DEFAULT_WIDTH_CM..=MAX_DIMENSION_CM).contains(&p.width_cm), "{p:?}");
        assert!((DEFAULT_HEIGHT_CM..=MAX_DIMENSION_CM).contains(&p.height_cm), "{p:?}");
    }

    #[test]
    fn test_empty_cart_is_default_package() {
        let p = aggregate(&[]);
        assert_eq!(p, Package::default());
        assert_eq!(p.weight_kg, 0.5);
        assert_eq!((p.length_cm, p.width_cm, p.height_cm), (20.0, 15.0, 10.0));
    }

    #[test]
    fn test_missing_profile_uses_defaults() {
        let p = aggregate(&[CartLine::new(None, 1)]);
        assert_eq!(p, Package::default());
    }

    #[test]
    fn test_footprint_is_max_and_height_stacks() {
        let lines = vec![
            CartLine::new(Some(ShippingProfile::metric(1.0, 30.0, 20.0, 5.0)), 2),
            CartLine::new(Some(ShippingProfile::metric(0.5, 10.0, 10.0, 10.0)), 1),
        ];
        let p = aggregate(&lines);
        assert_eq!(p.weight_kg, 2.5);
        assert_eq!(p.length_cm, 30.0);
        assert_eq!(p.width_cm, 20.0);
        assert_eq!(p.height_cm, 20.0);
    }

    #[test]
    fn test_unit_conversions() {
        let profile = ShippingProfile {
            weight: Some(10.0),
            weight_unit: WeightUnit::Lb,
            dimensions: Some(Dimensions {
                length: Some(10.0),
                width: Some(8.0),
                height: Some(6.0),
                unit: DimensionUnit::In,
            }),
        };
        let p = aggregate(&[CartLine::new(Some(profile), 1)]);
        assert!((p.weight_kg - 4.53592).abs() < 1e-9);
        assert!((p.length_cm - 25.4).abs() < 1e-9);
        assert!((p.width_cm - 20.32).abs() < 1e-9);
        assert!((p.height_cm - 15.24).abs() < 1e-9);

        assert_eq!(WeightUnit::G.to_kg(1500.0), 1.5);
        assert!((WeightUnit::Oz.to_kg(16.0) - 0.453592).abs() < 1e-6);
        assert_eq!(DimensionUnit::M.to_cm(1.2), 120.0);
    }

    #[test]
    fn test_caps() {
        let heavy = ShippingProfile::metric(500.0, 900.0, 900.0, 900.0);
        let p = aggregate(&[CartLine::new(Some(heavy), 5)]);
        assert_eq!(p.weight_kg, 100.0);
        assert_eq!(p.length_cm, 200.0);
        assert_eq!(p.width_cm, 200.0);
        assert_eq!(p.height_cm, 200.0);
    }

    #[test]
    fn test_minimums() {
        let tiny = ShippingProfile {
            weight: Some(5.0),
            weight_unit: WeightUnit::G,
            dimensions: Some(Dimensions {
                length: Some(0.1),
                width: Some(0.1),
                height: Some(0.1),
                unit: DimensionUnit::Cm,
            }),
        };
        let p = aggregate(&[CartLine::new(Some(tiny), 1)]);
        assert_eq!(p.weight_kg, 0.5);
        assert_eq!(p.length_cm, 20.0);
        assert_eq!(p.width_cm, 15.0);
        assert_eq!(p.height_cm, 10.0);
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let json = r#"[
            {"productShippingProfile": {"weight": "heavy", "weightUnit": "stone",
              "dimensions": {"length": "", "width": -3, "height": null, "unit": "furlong"}},
             "quantity": "two"}
        ]"#;
        let lines: Vec<CartLine> = serde_json::from_str(json).unwrap();
        assert_eq!(lines[0].units(), 1);
        assert_eq!(
            lines[0].product_shipping_profile.as_ref().unwrap().weight_unit,
            WeightUnit::Kg
        );
        let p = aggregate(&lines);
        assert_eq!(p, Package::default());
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let json = r#"[{"productShippingProfile": {"weight": "1500", "weightUnit": "g",
              "dimensions": {"length": "40", "width": "30", "height": "12", "unit": "cm"}},
             "quantity": "2"}]"#;
        let lines: Vec<CartLine> = serde_json::from_str(json).unwrap();
        let p = aggregate(&lines);
        assert_eq!(p.weight_kg, 3.0);
        assert_eq!(p.length_cm, 40.0);
        assert_eq!(p.width_cm, 30.0);
        assert_eq!(p.height_cm, 24.0);
    }

    #[test]
    fn test_quantity_coercion() {
        assert_eq!(CartLine { quantity: None, ..Default::default() }.units(), 1);
        assert_eq!(CartLine { quantity: Some(0.0), ..Default::default() }.units(), 1);
        assert_eq!(CartLine { quantity: Some(-4.0), ..Default::default() }.units(), 1);
        assert_eq!(CartLine { quantity: Some(2.9), ..Default::default() }.units(), 2);
        assert_eq!(
            total_quantity(&[CartLine::new(None, 3), CartLine::new(None, 9)]),
            12
        );
    }

    #[test]
    fn test_bounds_hold_for_varied_carts() {
        let weights = [0.0, 0.01, 0.5, 2.0, 5.0, 40.0, 99.0, 250.0];
        let sides = [0.0, 0.5, 1.0, 15.0, 60.0, 199.0, 450.0];
        let quantities = [1, 2, 7, 40];

        for &w in &weights {
            for &s in &sides {
                for &q in &quantities {
                    let line = CartLine::new(Some(ShippingProfile::metric(w, s, s, s)), q);
                    assert_within_bounds(&aggregate(&[line.clone()]));
                    assert_within_bounds(&aggregate(&[line.clone(), line, CartLine::new(None, 1)]));
                }
            }
        }
    }
}
