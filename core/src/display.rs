use serde::Serialize;

use crate::units::{
    BaseUnit, GRAMS_PER_KG, GRAMS_PER_LB, GRAMS_PER_OZ, ML_PER_CUP, ML_PER_FL_OZ, ML_PER_L,
    ML_PER_TBSP, ML_PER_TSP, MeasurementSystem, UnitTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayQuantity {
    pub display_quantity: f64,
    pub display_unit: &'static str,
}

impl DisplayQuantity {
    fn new(display_quantity: f64, display_unit: &'static str) -> Self {
        Self {
            display_quantity,
            display_unit,
        }
    }
}

/// Pick the coarsest natural unit for a base quantity. Thresholds are inclusive.
#[must_use]
pub fn select_display_unit(
    base_quantity: f64,
    base_unit: BaseUnit,
    system: MeasurementSystem,
) -> DisplayQuantity {
    let q = base_quantity;
    match (base_unit, system) {
        (BaseUnit::Unit, _) => DisplayQuantity::new(q, "unit"),
        (BaseUnit::G, MeasurementSystem::Metric) => {
            if q >= GRAMS_PER_KG {
                DisplayQuantity::new(q / GRAMS_PER_KG, "kg")
            } else {
                DisplayQuantity::new(q, "g")
            }
        }
        (BaseUnit::G, MeasurementSystem::Imperial) => {
            if q >= GRAMS_PER_LB {
                DisplayQuantity::new(q / GRAMS_PER_LB, "lb")
            } else {
                DisplayQuantity::new(q / GRAMS_PER_OZ, "oz")
            }
        }
        (BaseUnit::Ml, MeasurementSystem::Metric) => {
            if q >= ML_PER_L {
                DisplayQuantity::new(q / ML_PER_L, "l")
            } else {
                DisplayQuantity::new(q, "ml")
            }
        }
        (BaseUnit::Ml, MeasurementSystem::Imperial) => {
            if q >= ML_PER_CUP {
                DisplayQuantity::new(q / ML_PER_CUP, "cup")
            } else if q >= ML_PER_FL_OZ {
                DisplayQuantity::new(q / ML_PER_FL_OZ, "fl oz")
            } else if q >= ML_PER_TBSP {
                DisplayQuantity::new(q / ML_PER_TBSP, "tbsp")
            } else {
                DisplayQuantity::new(q / ML_PER_TSP, "tsp")
            }
        }
    }
}

/// Integer at 100 and above, one decimal from 10, two decimals below.
#[must_use]
pub fn round_quantity(quantity: f64) -> f64 {
    if quantity >= 100.0 {
        quantity.round()
    } else if quantity >= 10.0 {
        (quantity * 10.0).round() / 10.0
    } else {
        (quantity * 100.0).round() / 100.0
    }
}

/// `"<rounded> <abbreviation>"`, e.g. `"1.5 fl oz"`.
#[must_use]
pub fn format_quantity(quantity: f64, unit: &str) -> String {
    let table = UnitTable::builtin();
    let abbreviation = table.lookup(unit).map_or(unit, |u| u.abbreviation.as_ref());
    format!("{} {abbreviation}", round_quantity(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn metric(q: f64, base: BaseUnit) -> DisplayQuantity {
        select_display_unit(q, base, MeasurementSystem::Metric)
    }

    fn imperial(q: f64, base: BaseUnit) -> DisplayQuantity {
        select_display_unit(q, base, MeasurementSystem::Imperial)
    }

    #[test]
    fn test_metric_mass_boundary_is_inclusive() {
        let d = metric(1000.0, BaseUnit::G);
        assert_eq!(d.display_unit, "kg");
        assert!((d.display_quantity - 1.0).abs() < EPS);

        let d = metric(999.0, BaseUnit::G);
        assert_eq!(d.display_unit, "g");
        assert!((d.display_quantity - 999.0).abs() < EPS);
    }

    #[test]
    fn test_metric_volume() {
        assert_eq!(metric(1000.0, BaseUnit::Ml).display_unit, "l");
        assert_eq!(metric(250.0, BaseUnit::Ml).display_unit, "ml");
        assert!((metric(1500.0, BaseUnit::Ml).display_quantity - 1.5).abs() < EPS);
    }

    #[test]
    fn test_imperial_mass() {
        let d = imperial(453.59, BaseUnit::G);
        assert_eq!(d.display_unit, "lb");
        assert!((d.display_quantity - 1.0).abs() < EPS);

        let d = imperial(56.7, BaseUnit::G);
        assert_eq!(d.display_unit, "oz");
        assert!((d.display_quantity - 2.0).abs() < EPS);
    }

    #[test]
    fn test_imperial_volume_ladder() {
        assert_eq!(imperial(236.59, BaseUnit::Ml).display_unit, "cup");
        assert_eq!(imperial(236.0, BaseUnit::Ml).display_unit, "fl oz");
        assert_eq!(imperial(29.57, BaseUnit::Ml).display_unit, "fl oz");
        assert_eq!(imperial(29.0, BaseUnit::Ml).display_unit, "tbsp");
        assert_eq!(imperial(14.79, BaseUnit::Ml).display_unit, "tbsp");
        let d = imperial(9.86, BaseUnit::Ml);
        assert_eq!(d.display_unit, "tsp");
        assert!((d.display_quantity - 2.0).abs() < EPS);
    }

    #[test]
    fn test_count_passthrough() {
        for system in [MeasurementSystem::Metric, MeasurementSystem::Imperial] {
            let d = select_display_unit(2500.0, BaseUnit::Unit, system);
            assert_eq!(d.display_unit, "unit");
            assert!((d.display_quantity - 2500.0).abs() < EPS);
        }
    }

    #[test]
    fn test_rounding_tiers() {
        assert!((round_quantity(123.456) - 123.0).abs() < EPS);
        assert!((round_quantity(12.34) - 12.3).abs() < EPS);
        assert!((round_quantity(1.2345) - 1.23).abs() < EPS);
        assert!((round_quantity(100.0) - 100.0).abs() < EPS);
        assert!((round_quantity(99.96) - 100.0).abs() < EPS);
        assert!((round_quantity(0.0)).abs() < EPS);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(1.5, "fl oz"), "1.5 fl oz");
        assert_eq!(format_quantity(1.5, "floz"), "1.5 fl oz");
        assert_eq!(format_quantity(2.0, "piece"), "2 pc");
        assert_eq!(format_quantity(123.456, "g"), "123 g");
        assert_eq!(format_quantity(3.0, "sprig"), "3 sprig");
    }
}
