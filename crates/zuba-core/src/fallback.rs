//! # Fallback Rate Formula
//!
//! Deterministic shipping cost used whenever the live carrier API cannot
//! produce a rate.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fallback Cost Pipeline                           │
//! │                                                                         │
//! │  1. cost  = base_rate + max(0, qty − 1) × extra_item_rate              │
//! │                                                                         │
//! │  2. weight > 5 kg?                                                      │
//! │        cost += (weight − 5) × 2 × weight_multiplier                     │
//! │                                                                         │
//! │  3. distance known and > 500 km?                                        │
//! │        500 < d ≤ 1000   cost ×= 1 + (d / 5000)  × distance_multiplier   │
//! │        d > 1000         cost ×= 1 + (d / 10000) × distance_multiplier   │
//! │                                                                         │
//! │  4. qty ≥ 10?                                                           │
//! │        cost ×= 0.85                                                     │
//! │                                                                         │
//! │  All steps in f64. Rounded to cents only when the quote is built.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The bulk discount is applied after the distance factor, so both
//! multiplicative adjustments compound.

use crate::geo::{Coordinates, WAREHOUSE_COORDINATES};
use crate::package::Package;
use crate::region::Region;

pub const WEIGHT_SURCHARGE_THRESHOLD_KG: f64 = 5.0;
pub const WEIGHT_SURCHARGE_PER_KG: f64 = 2.0;
pub const DISTANCE_SURCHARGE_MIN_KM: f64 = 500.0;
pub const DISTANCE_LONG_HAUL_KM: f64 = 1000.0;
const DISTANCE_DIVISOR_REGIONAL: f64 = 5000.0;
const DISTANCE_DIVISOR_LONG_HAUL: f64 = 10000.0;
pub const BULK_DISCOUNT_MIN_QTY: u32 = 10;
pub const BULK_DISCOUNT_FACTOR: f64 = 0.85;

/// Everything the formula needs.
#[derive(Debug, Clone, Copy)]
pub struct FallbackInput<'a> {
    pub region: &'a Region,
    pub package: &'a Package,
    /// Σ line quantities.
    pub quantity: u32,
    /// Great-circle distance from the warehouse, when the destination has
    /// coordinates.
    pub distance_km: Option<f64>,
}

impl<'a> FallbackInput<'a> {
    /// Builds the input, measuring the distance from `origin` when the
    /// destination coordinates are usable.
    pub fn new(
        region: &'a Region,
        package: &'a Package,
        quantity: u32,
        origin: &Coordinates,
        destination: Option<&Coordinates>,
    ) -> Self {
        let distance_km = destination
            .filter(|c| c.is_valid())
            .map(|c| origin.distance_km(c));

        FallbackInput {
            region,
            package,
            quantity,
            distance_km,
        }
    }

    /// Same as [`FallbackInput::new`] with the fixed warehouse as origin.
    pub fn from_warehouse(
        region: &'a Region,
        package: &'a Package,
        quantity: u32,
        destination: Option<&Coordinates>,
    ) -> Self {
        Self::new(region, package, quantity, &WAREHOUSE_COORDINATES, destination)
    }
}

/// Intermediate values, kept for logging and for the estimate endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackBreakdown {
    pub base: f64,
    pub extra_items: f64,
    pub weight_surcharge: f64,
    /// 1.0 when no distance surcharge applies.
    pub distance_factor: f64,
    pub bulk_discount_applied: bool,
    /// Final unrounded cost.
    pub cost: f64,
}

/// Runs the formula and returns every intermediate value.
pub fn fallback_breakdown(input: &FallbackInput<'_>) -> FallbackBreakdown {
    let region = input.region;
    let qty = input.quantity.max(1);

    let base = region.base_rate;
    let extra_items = f64::from(qty - 1) * region.extra_item_rate;
    let mut cost = base + extra_items;

    let weight_surcharge = if input.package.weight_kg > WEIGHT_SURCHARGE_THRESHOLD_KG {
        (input.package.weight_kg - WEIGHT_SURCHARGE_THRESHOLD_KG)
            * WEIGHT_SURCHARGE_PER_KG
            * region.weight_multiplier
    } else {
        0.0
    };
    cost += weight_surcharge;

    let distance_factor = match input.distance_km {
        Some(d) if d > DISTANCE_LONG_HAUL_KM => {
            1.0 + (d / DISTANCE_DIVISOR_LONG_HAUL) * region.distance_multiplier
        }
        Some(d) if d > DISTANCE_SURCHARGE_MIN_KM => {
            1.0 + (d / DISTANCE_DIVISOR_REGIONAL) * region.distance_multiplier
        }
        _ => 1.0,
    };
    cost *= distance_factor;

    let bulk_discount_applied = qty >= BULK_DISCOUNT_MIN_QTY;
    if bulk_discount_applied {
        cost *= BULK_DISCOUNT_FACTOR;
    }

    FallbackBreakdown {
        base,
        extra_items,
        weight_surcharge,
        distance_factor,
        bulk_discount_applied,
        cost,
    }
}

/// Final unrounded fallback cost.
///
/// ## Example
/// ```rust
/// use zuba_core::fallback::{fallback_cost, FallbackInput};
/// use zuba_core::package::Package;
/// use zuba_core::region::classify;
///
/// let package = Package::default();
/// let input = FallbackInput::from_warehouse(classify(Some("CA")), &package, 3, None);
/// assert_eq!(fallback_cost(&input), 19.0);
/// ```
pub fn fallback_cost(input: &FallbackInput<'_>) -> f64 {
    fallback_breakdown(input).cost
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::region::{classify, RegionCode, RegionTable};

    fn package(weight_kg: f64) -> Package {
        Package {
            weight_kg,
            ..Package::default()
        }
    }

    fn cost(country: &str, weight_kg: f64, qty: u32, distance_km: Option<f64>) -> f64 {
        let package = package(weight_kg);
        fallback_cost(&FallbackInput {
            region: classify(Some(country)),
            package: &package,
            quantity: qty,
            distance_km,
        })
    }

    #[test]
    fn test_single_item_canada() {
        assert_eq!(cost("CA", 2.0, 1, None), 13.0);
    }

    #[test]
    fn test_extra_items() {
        assert_eq!(cost("CA", 2.0, 3, None), 19.0);
    }

    #[test]
    fn test_europe_base_rate() {
        assert_eq!(cost("GB", 1.0, 1, None), 35.0);
    }

    #[test]
    fn test_bulk_discount() {
        let c = cost("CA", 4.8, 12, None);
        assert_eq!(Money::from_major_f64(c), Money::from_cents(3910));
    }

    #[test]
    fn test_weight_surcharge() {
        // (8 - 5) × 2 × 1.0
        assert_eq!(cost("CA", 8.0, 1, None), 19.0);
        // EU multiplier 1.5: 35 + (7 - 5) × 2 × 1.5
        assert_eq!(cost("FR", 7.0, 1, None), 41.0);
        // Exactly at the threshold: no surcharge
        assert_eq!(cost("CA", 5.0, 1, None), 13.0);
    }

    #[test]
    fn test_distance_bands() {
        // ≤ 500 km: untouched
        assert_eq!(cost("CA", 1.0, 1, Some(500.0)), 13.0);
        // 800 km regional band: 13 × (1 + 800/5000 × 1.0)
        assert!((cost("CA", 1.0, 1, Some(800.0)) - 13.0 * 1.16).abs() < 1e-9);
        // 3000 km long haul: 13 × (1 + 3000/10000 × 1.0)
        assert!((cost("CA", 1.0, 1, Some(3000.0)) - 13.0 * 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_distance_uses_region_multiplier() {
        // US multiplier 1.1: 20 × (1 + 2000/10000 × 1.1)
        let c = cost("US", 1.0, 1, Some(2000.0));
        assert!((c - 20.0 * 1.22).abs() < 1e-9);
    }

    #[test]
    fn test_discount_applies_after_distance() {
        let package = package(1.0);
        let breakdown = fallback_breakdown(&FallbackInput {
            region: classify(Some("CA")),
            package: &package,
            quantity: 10,
            distance_km: Some(3000.0),
        });
        assert!(breakdown.bulk_discount_applied);
        assert!((breakdown.distance_factor - 1.3).abs() < 1e-12);
        let expected = (13.0 + 9.0 * 3.0) * 1.3 * 0.85;
        assert!((breakdown.cost - expected).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_destination_coordinates_skip_distance() {
        let package = Package::default();
        let region = classify(Some("CA"));
        let bad = Coordinates::new(f64::NAN, 10.0);
        let input = FallbackInput::from_warehouse(region, &package, 1, Some(&bad));
        assert_eq!(input.distance_km, None);
        assert_eq!(fallback_cost(&input), 13.0);
    }

    #[test]
    fn test_warehouse_destination_has_no_surcharge() {
        let package = Package::default();
        let region = classify(Some("CA"));
        let input =
            FallbackInput::from_warehouse(region, &package, 1, Some(&WAREHOUSE_COORDINATES));
        assert_eq!(fallback_cost(&input), 13.0);
    }

    #[test]
    fn test_monotonic_in_quantity_except_bulk_threshold() {
        for code in RegionCode::ALL {
            let region = RegionTable::builtin().get(code);
            let package = package(3.0);
            let at = |qty| {
                fallback_cost(&FallbackInput {
                    region,
                    package: &package,
                    quantity: qty,
                    distance_km: Some(1500.0),
                })
            };
            for qty in 1..40u32 {
                if qty + 1 == BULK_DISCOUNT_MIN_QTY {
                    continue;
                }
                assert!(at(qty + 1) >= at(qty), "{code} qty {qty}");
            }
        }
    }

    #[test]
    fn test_monotonic_in_weight_above_threshold() {
        for code in RegionCode::ALL {
            let region = RegionTable::builtin().get(code);
            let mut previous = 0.0;
            let mut weight = 5.0;
            while weight <= 100.0 {
                let package = package(weight);
                let c = fallback_cost(&FallbackInput {
                    region,
                    package: &package,
                    quantity: 2,
                    distance_km: None,
                });
                assert!(c >= previous, "{code} weight {weight}");
                previous = c;
                weight += 2.5;
            }
        }
    }

    #[test]
    fn test_cost_always_positive() {
        for code in RegionCode::ALL {
            let region = RegionTable::builtin().get(code);
            for qty in [1, 9, 10, 500] {
                for distance in [None, Some(0.0), Some(750.0), Some(19_000.0)] {
                    let package = package(100.0);
                    let c = fallback_cost(&FallbackInput {
                        region,
                        package: &package,
                        quantity: qty,
                        distance_km: distance,
                    });
                    assert!(c > 0.0);
                }
            }
        }
    }
}
