use anyhow::{Context, Result};
use serde::Serialize;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealplan_core::db::Database;
use mealplan_core::display::{round_quantity, select_display_unit};
use mealplan_core::units::{BaseUnit, MeasurementSystem, UnitDefinition};

use super::helpers::{json_error, parse_quantity};

pub(crate) fn cmd_unit_list(db: &Database, user_id: &str, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct UnitRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Abbr")]
        abbreviation: String,
        #[tabled(rename = "Base")]
        base: String,
        #[tabled(rename = "Factor")]
        factor: String,
        #[tabled(rename = "Scope")]
        scope: &'static str,
    }

    let table = db.unit_table(user_id)?;
    let units = table.list();

    if json {
        println!("{}", serde_json::to_string_pretty(&units)?);
        return Ok(());
    }

    let is_custom = |u: &UnitDefinition| table.custom_units().iter().any(|c| c.symbol == u.symbol);
    let rows: Vec<UnitRow> = units
        .iter()
        .map(|&u| UnitRow {
            symbol: u.symbol.to_string(),
            name: u.name.to_string(),
            abbreviation: u.abbreviation.to_string(),
            base: u.base_unit.to_string(),
            factor: u.conversion_factor.to_string(),
            scope: if is_custom(u) { "custom" } else { "built-in" },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_unit_add(
    db: &Database,
    user_id: &str,
    symbol: &str,
    name: Option<&str>,
    base: &str,
    factor: f64,
    json: bool,
) -> Result<()> {
    let base_unit: BaseUnit = base.parse()?;
    let unit = UnitDefinition::custom(symbol, name.unwrap_or(symbol), base_unit, factor);
    let unit = db.add_custom_unit(user_id, &unit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&unit)?);
    } else {
        let symbol = &unit.symbol;
        println!("Defined unit '{symbol}': 1 {symbol} = {factor} {base_unit}");
    }
    Ok(())
}

pub(crate) fn cmd_unit_remove(db: &Database, user_id: &str, symbol: &str, json: bool) -> Result<()> {
    if db.delete_custom_unit(user_id, symbol)? {
        if json {
            println!("{}", serde_json::json!({ "removed": symbol }));
        } else {
            println!("Removed custom unit '{symbol}'");
        }
    } else {
        if json {
            println!("{}", json_error(&format!("Custom unit '{symbol}' not found")));
        } else {
            eprintln!("Custom unit '{symbol}' not found");
        }
        process::exit(2);
    }
    Ok(())
}

#[derive(Serialize)]
struct Conversion {
    quantity: f64,
    unit: String,
    base_quantity: f64,
    base_unit: BaseUnit,
    result_quantity: f64,
    result_unit: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

/// Convert `quantity` (with the unit inline or as a separate argument) to `to`,
/// or to the natural display unit of the chosen measurement system.
pub(crate) fn cmd_unit_convert(
    db: &Database,
    user_id: &str,
    quantity: &str,
    unit: Option<&str>,
    to: Option<&str>,
    system: Option<&str>,
    json: bool,
) -> Result<()> {
    let (quantity, unit) = match unit {
        Some(unit) => {
            let qty: f64 = quantity
                .trim()
                .parse()
                .with_context(|| format!("Invalid quantity: '{quantity}'"))?;
            (qty, unit.trim().to_string())
        }
        None => parse_quantity(quantity)?,
    };

    let table = db.unit_table(user_id)?;
    let base = table.to_base(quantity, &unit);
    let warnings = table.conversion_warnings(&unit, to);

    let (result_quantity, result_unit) = if let Some(target) = to {
        let result_unit = match table.lookup(target) {
            Some(def) if def.base_unit == base.base_unit => def.abbreviation.to_string(),
            _ => base.base_unit.to_string(),
        };
        (table.from_base(base.base_quantity, base.base_unit, target), result_unit)
    } else {
        let system = match system {
            Some(s) => s.parse::<MeasurementSystem>()?,
            None => db.get_measurement_system(user_id)?,
        };
        let display = select_display_unit(base.base_quantity, base.base_unit, system);
        (display.display_quantity, display.display_unit.to_string())
    };

    let conversion = Conversion {
        quantity,
        unit,
        base_quantity: base.base_quantity,
        base_unit: base.base_unit,
        result_quantity: round_quantity(result_quantity),
        result_unit,
        warnings,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&conversion)?);
    } else {
        println!(
            "{} {} = {} {}  (base: {} {})",
            conversion.quantity,
            conversion.unit,
            conversion.result_quantity,
            conversion.result_unit,
            round_quantity(conversion.base_quantity),
            conversion.base_unit
        );
        for warning in &conversion.warnings {
            eprintln!("Note: {warning}");
        }
    }
    Ok(())
}
