use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Canonical unit every quantity normalizes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseUnit {
    /// Mass, in grams.
    G,
    /// Volume, in milliliters.
    Ml,
    /// Count.
    Unit,
}

impl BaseUnit {
    pub const ALL: [BaseUnit; 3] = [BaseUnit::G, BaseUnit::Ml, BaseUnit::Unit];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::G => "g",
            Self::Ml => "ml",
            Self::Unit => "unit",
        }
    }
}

impl fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "g" | "mass" => Ok(Self::G),
            "ml" | "volume" => Ok(Self::Ml),
            "unit" | "count" => Ok(Self::Unit),
            _ => bail!("Invalid base unit '{s}'. Must be one of: g, ml, unit"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    #[default]
    Metric,
    Imperial,
}

impl MeasurementSystem {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasurementSystem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            _ => bail!("Invalid measurement system '{s}'. Must be 'metric' or 'imperial'"),
        }
    }
}

// Conversion factors shared with the display policy thresholds.
pub(crate) const GRAMS_PER_KG: f64 = 1000.0;
pub(crate) const GRAMS_PER_OZ: f64 = 28.35;
pub(crate) const GRAMS_PER_LB: f64 = 453.59;
pub(crate) const ML_PER_L: f64 = 1000.0;
pub(crate) const ML_PER_TSP: f64 = 4.93;
pub(crate) const ML_PER_TBSP: f64 = 14.79;
pub(crate) const ML_PER_CUP: f64 = 236.59;
pub(crate) const ML_PER_FL_OZ: f64 = 29.57;

/// A unit symbol and its linear factor into a base unit
/// (`base_quantity = quantity * conversion_factor`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub symbol: Cow<'static, str>,
    pub name: Cow<'static, str>,
    pub abbreviation: Cow<'static, str>,
    pub base_unit: BaseUnit,
    pub conversion_factor: f64,
}

impl UnitDefinition {
    const fn built_in(
        symbol: &'static str,
        name: &'static str,
        abbreviation: &'static str,
        base_unit: BaseUnit,
        conversion_factor: f64,
    ) -> Self {
        Self {
            symbol: Cow::Borrowed(symbol),
            name: Cow::Borrowed(name),
            abbreviation: Cow::Borrowed(abbreviation),
            base_unit,
            conversion_factor,
        }
    }

    /// A user-defined unit. The abbreviation defaults to the symbol.
    #[must_use]
    pub fn custom(symbol: &str, name: &str, base_unit: BaseUnit, conversion_factor: f64) -> Self {
        Self {
            symbol: Cow::Owned(symbol.trim().to_string()),
            name: Cow::Owned(name.trim().to_string()),
            abbreviation: Cow::Owned(symbol.trim().to_string()),
            base_unit,
            conversion_factor,
        }
    }

    fn matches(&self, symbol: &str) -> bool {
        self.symbol.eq_ignore_ascii_case(symbol) || self.abbreviation.eq_ignore_ascii_case(symbol)
    }
}

pub const BUILT_IN_UNITS: &[UnitDefinition] = &[
    // Mass (base: grams)
    UnitDefinition::built_in("g", "gram", "g", BaseUnit::G, 1.0),
    UnitDefinition::built_in("kg", "kilogram", "kg", BaseUnit::G, GRAMS_PER_KG),
    UnitDefinition::built_in("oz", "ounce", "oz", BaseUnit::G, GRAMS_PER_OZ),
    UnitDefinition::built_in("lb", "pound", "lb", BaseUnit::G, GRAMS_PER_LB),
    // Volume (base: milliliters)
    UnitDefinition::built_in("ml", "milliliter", "ml", BaseUnit::Ml, 1.0),
    UnitDefinition::built_in("l", "liter", "l", BaseUnit::Ml, ML_PER_L),
    UnitDefinition::built_in("tsp", "teaspoon", "tsp", BaseUnit::Ml, ML_PER_TSP),
    UnitDefinition::built_in("tbsp", "tablespoon", "tbsp", BaseUnit::Ml, ML_PER_TBSP),
    UnitDefinition::built_in("cup", "cup", "cup", BaseUnit::Ml, ML_PER_CUP),
    UnitDefinition::built_in("floz", "fluid ounce", "fl oz", BaseUnit::Ml, ML_PER_FL_OZ),
    // Count (base: unit)
    UnitDefinition::built_in("unit", "unit", "unit", BaseUnit::Unit, 1.0),
    UnitDefinition::built_in("piece", "piece", "pc", BaseUnit::Unit, 1.0),
    UnitDefinition::built_in("whole", "whole", "whole", BaseUnit::Unit, 1.0),
    UnitDefinition::built_in("clove", "clove", "clove", BaseUnit::Unit, 1.0),
    UnitDefinition::built_in("bunch", "bunch", "bunch", BaseUnit::Unit, 1.0),
    UnitDefinition::built_in("slice", "slice", "slice", BaseUnit::Unit, 1.0),
    UnitDefinition::built_in("can", "can", "can", BaseUnit::Unit, 1.0),
    UnitDefinition::built_in("bottle", "bottle", "bottle", BaseUnit::Unit, 1.0),
    UnitDefinition::built_in("pack", "pack", "pack", BaseUnit::Unit, 1.0),
    UnitDefinition::built_in("bag", "bag", "bag", BaseUnit::Unit, 1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseQuantity {
    pub base_quantity: f64,
    pub base_unit: BaseUnit,
}


/// Layered unit lookup: a user's custom units shadow the built-in table.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    custom: Vec<UnitDefinition>,
}

impl UnitTable {
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_custom(custom: Vec<UnitDefinition>) -> Self {
        Self { custom }
    }

    /// Exact symbol match across both layers first (custom before built-in), then a
    /// case-insensitive match on symbol or abbreviation in the same layer order.
    #[must_use]
    pub fn lookup(&self, symbol: &str) -> Option<&UnitDefinition> {
        let symbol = symbol.trim();
        let mut layers = self.custom.iter().chain(BUILT_IN_UNITS.iter());
        layers
            .clone()
            .find(|u| u.symbol == symbol)
            .or_else(|| layers.find(|u| u.matches(symbol)))
    }

    /// Normalize a quantity into its base unit. Unknown symbols are treated as counts.
    #[must_use]
    pub fn to_base(&self, quantity: f64, symbol: &str) -> BaseQuantity {
        match self.lookup(symbol) {
            Some(unit) => BaseQuantity {
                base_quantity: quantity * unit.conversion_factor,
                base_unit: unit.base_unit,
            },
            None => {
                tracing::debug!(unit = symbol, "unknown unit, counting as 'unit'");
                BaseQuantity {
                    base_quantity: quantity,
                    base_unit: BaseUnit::Unit,
                }
            }
        }
    }

    /// Express a base quantity in `target`. Returns `base_quantity` unchanged when the
    /// target is unknown or measures a different dimension.
    #[must_use]
    pub fn from_base(&self, base_quantity: f64, base_unit: BaseUnit, target: &str) -> f64 {
        match self.lookup(target) {
            Some(unit) if unit.base_unit == base_unit => base_quantity / unit.conversion_factor,
            Some(unit) => {
                tracing::warn!(
                    target_unit = target,
                    from = %base_unit,
                    to = %unit.base_unit,
                    "dimension mismatch, quantity left unconverted"
                );
                base_quantity
            }
            None => {
                tracing::warn!(target_unit = target, "unknown target unit, quantity left unconverted");
                base_quantity
            }
        }
    }

    /// Human-readable reasons a conversion of `symbol` (optionally to `target`) falls
    /// back instead of converting. Empty when every unit resolves within one dimension.
    #[must_use]
    pub fn conversion_warnings(&self, symbol: &str, target: Option<&str>) -> Vec<String> {
        let mut warnings = Vec::new();
        let source = self.lookup(symbol);
        let base_unit = source.map_or(BaseUnit::Unit, |u| u.base_unit);
        if source.is_none() {
            warnings.push(format!("unknown unit '{}', counted as 'unit'", symbol.trim()));
        }
        if let Some(target) = target {
            match self.lookup(target) {
                None => warnings.push(format!(
                    "unknown unit '{}', quantity left in {base_unit}",
                    target.trim()
                )),
                Some(unit) if unit.base_unit != base_unit => warnings.push(format!(
                    "cannot convert {} ({base_unit}) to {} ({}), quantity left in {base_unit}",
                    symbol.trim(),
                    target.trim(),
                    unit.base_unit
                )),
                Some(_) => {}
            }
        }
        warnings
    }

    /// Effective table: custom units first, then built-ins not shadowed by a custom symbol.
    #[must_use]
    pub fn list(&self) -> Vec<&UnitDefinition> {
        let mut units: Vec<&UnitDefinition> = self.custom.iter().collect();
        units.extend(
            BUILT_IN_UNITS
                .iter()
                .filter(|b| !self.custom.iter().any(|c| c.symbol == b.symbol)),
        );
        units
    }

    #[must_use]
    pub fn custom_units(&self) -> &[UnitDefinition] {
        &self.custom
    }
}

#[must_use]
pub fn to_base_unit(quantity: f64, symbol: &str) -> BaseQuantity {
    UnitTable::builtin().to_base(quantity, symbol)
}

#[must_use]
pub fn from_base_unit(base_quantity: f64, base_unit: BaseUnit, target: &str) -> f64 {
    UnitTable::builtin().from_base(base_quantity, base_unit, target)
}

pub fn validate_custom_unit(unit: &UnitDefinition) -> Result<()> {
    if unit.symbol.trim().is_empty() {
        bail!("Unit symbol must not be empty");
    }
    if unit.name.trim().is_empty() {
        bail!("Unit name must not be empty");
    }
    if !unit.conversion_factor.is_finite() || unit.conversion_factor <= 0.0 {
        bail!("Conversion factor must be a positive number");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_round_trip_every_built_in_unit() {
        for unit in BUILT_IN_UNITS {
            for q in [0.25, 1.0, 3.7, 250.0] {
                let base = to_base_unit(q, &unit.symbol);
                assert_eq!(base.base_unit, unit.base_unit, "{}", unit.symbol);
                let back = from_base_unit(base.base_quantity, base.base_unit, &unit.symbol);
                assert!((back - q).abs() < EPS, "{} round trip gave {back}", unit.symbol);
            }
        }
    }

    #[test]
    fn test_to_base_is_linear() {
        for unit in BUILT_IN_UNITS {
            let one = to_base_unit(2.5, &unit.symbol).base_quantity;
            let scaled = to_base_unit(2.5 * 4.0, &unit.symbol).base_quantity;
            assert!((scaled - one * 4.0).abs() < EPS, "{}", unit.symbol);
        }
    }

    #[test]
    fn test_reference_factors() {
        assert!((to_base_unit(1.0, "kg").base_quantity - 1000.0).abs() < EPS);
        assert!((to_base_unit(1.0, "lb").base_quantity - 453.59).abs() < EPS);
        assert!((to_base_unit(1.0, "cup").base_quantity - 236.59).abs() < EPS);
        assert!((to_base_unit(2.0, "tbsp").base_quantity - 29.58).abs() < EPS);
        assert_eq!(to_base_unit(3.0, "clove").base_unit, BaseUnit::Unit);
    }

    #[test]
    fn test_unknown_unit_falls_back_to_count() {
        let base = to_base_unit(5.0, "fortnight");
        assert_eq!(base.base_unit, BaseUnit::Unit);
        assert!((base.base_quantity - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cross_dimension_is_identity() {
        assert!((from_base_unit(500.0, BaseUnit::G, "ml") - 500.0).abs() < f64::EPSILON);
        assert!((from_base_unit(500.0, BaseUnit::Ml, "kg") - 500.0).abs() < f64::EPSILON);
        assert!((from_base_unit(500.0, BaseUnit::G, "furlong") - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lookup_by_abbreviation_and_case() {
        let table = UnitTable::builtin();
        assert_eq!(table.lookup("fl oz").unwrap().symbol, "floz");
        assert_eq!(table.lookup("floz").unwrap().symbol, "floz");
        assert_eq!(table.lookup("PC").unwrap().symbol, "piece");
        assert_eq!(table.lookup(" Cup ").unwrap().symbol, "cup");
        assert!(table.lookup("").is_none());
    }

    #[test]
    fn test_custom_units_shadow_built_ins() {
        let table = UnitTable::with_custom(vec![
            UnitDefinition::custom("cup", "metric cup", BaseUnit::Ml, 250.0),
            UnitDefinition::custom("handful", "handful", BaseUnit::G, 30.0),
        ]);
        assert!((table.to_base(1.0, "cup").base_quantity - 250.0).abs() < EPS);
        assert!((table.to_base(2.0, "handful").base_quantity - 60.0).abs() < EPS);
        assert_eq!(table.to_base(2.0, "handful").base_unit, BaseUnit::G);
        // Built-ins untouched
        assert!((to_base_unit(1.0, "cup").base_quantity - 236.59).abs() < EPS);
        assert!((table.from_base(500.0, BaseUnit::Ml, "cup") - 2.0).abs() < EPS);
    }

    #[test]
    fn test_exact_symbol_beats_case_insensitive_custom_match() {
        let table = UnitTable::with_custom(vec![UnitDefinition::custom(
            "Cup",
            "mug",
            BaseUnit::Ml,
            300.0,
        )]);
        assert_eq!(table.lookup("cup").unwrap().name, "cup");
        assert!((table.to_base(1.0, "cup").base_quantity - 236.59).abs() < EPS);
        assert_eq!(table.lookup("Cup").unwrap().name, "mug");
        // No exact match anywhere: custom layer wins the case-insensitive pass
        assert_eq!(table.lookup("CUP").unwrap().name, "mug");
        assert_eq!(table.list().len(), BUILT_IN_UNITS.len() + 1);
    }

    #[test]
    fn test_conversion_warnings() {
        let table = UnitTable::builtin();
        assert!(table.conversion_warnings("kg", Some("lb")).is_empty());
        assert!(table.conversion_warnings("cup", None).is_empty());
        assert_eq!(
            table.conversion_warnings("fortnight", None),
            vec!["unknown unit 'fortnight', counted as 'unit'"]
        );
        assert_eq!(
            table.conversion_warnings("g", Some("ml")),
            vec!["cannot convert g (g) to ml (ml), quantity left in g"]
        );
        assert_eq!(
            table.conversion_warnings("g", Some("smidge")),
            vec!["unknown unit 'smidge', quantity left in g"]
        );
        // Unknown source is a count, so a count target converts cleanly
        assert_eq!(table.conversion_warnings("fortnight", Some("piece")).len(), 1);
    }

    #[test]
    fn test_list_hides_shadowed_built_ins() {
        let table = UnitTable::with_custom(vec![UnitDefinition::custom(
            "cup",
            "metric cup",
            BaseUnit::Ml,
            250.0,
        )]);
        let units = table.list();
        assert_eq!(units.len(), BUILT_IN_UNITS.len());
        assert_eq!(units.iter().filter(|u| u.symbol == "cup").count(), 1);
        assert_eq!(units[0].name, "metric cup");
    }

    #[test]
    fn test_validate_custom_unit() {
        assert!(validate_custom_unit(&UnitDefinition::custom("pinch", "pinch", BaseUnit::G, 0.3)).is_ok());
        assert!(validate_custom_unit(&UnitDefinition::custom(" ", "blank", BaseUnit::G, 1.0)).is_err());
        assert!(validate_custom_unit(&UnitDefinition::custom("x", "", BaseUnit::G, 1.0)).is_err());
        assert!(validate_custom_unit(&UnitDefinition::custom("x", "x", BaseUnit::G, 0.0)).is_err());
        assert!(validate_custom_unit(&UnitDefinition::custom("x", "x", BaseUnit::G, f64::NAN)).is_err());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("g".parse::<BaseUnit>().unwrap(), BaseUnit::G);
        assert_eq!("ML".parse::<BaseUnit>().unwrap(), BaseUnit::Ml);
        assert!("kg".parse::<BaseUnit>().is_err());
        assert_eq!(
            "Imperial".parse::<MeasurementSystem>().unwrap(),
            MeasurementSystem::Imperial
        );
        assert_eq!(MeasurementSystem::default(), MeasurementSystem::Metric);
        assert_eq!(serde_json::to_string(&BaseUnit::Unit).unwrap(), "\"unit\"");
    }
}
