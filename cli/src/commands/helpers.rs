use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealplan_core::display::round_quantity;
use mealplan_core::models::Product;
use mealplan_core::units::UnitTable;

/// Parse a quantity with an optional unit into `(quantity, unit)`.
/// Accepts: "3", "500g", "500 g", "2 cup", "1.5 fl oz". A bare number is a count.
pub(crate) fn parse_quantity(s: &str) -> Result<(f64, String)> {
    let s = s.trim();

    let (qty, unit) = if let Ok(qty) = s.parse::<f64>() {
        (qty, "unit".to_string())
    } else if let Some((qty, unit)) = split_number_unit(s) {
        (qty, unit.trim().to_string())
    } else {
        bail!("Invalid quantity: '{s}'. Use '500g', '2 cup', '1.5 fl oz' or a plain count");
    };

    if !qty.is_finite() || qty <= 0.0 {
        bail!("Quantity must be greater than 0");
    }
    Ok((qty, unit))
}

/// Split "500ml", "2.5 tbsp" or "1 fl oz" into the number and the unit text.
fn split_number_unit(s: &str) -> Option<(f64, &str)> {
    let idx = s.find(|c: char| c.is_alphabetic())?;
    if idx == 0 {
        return None;
    }
    let (num_part, unit_part) = s.split_at(idx);
    let qty: f64 = num_part.trim().parse().ok()?;
    if unit_part.trim().is_empty() {
        return None;
    }
    Some((qty, unit_part))
}

/// Parse `"<product>=<quantity>"`, e.g. `"Pasta=400 g"`.
pub(crate) fn parse_ingredient_arg(s: &str) -> Result<(String, f64, String)> {
    let (name, quantity) = s
        .rsplit_once('=')
        .with_context(|| format!("Invalid ingredient '{s}'. Use '<product>=<quantity>'"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid ingredient '{s}': product name is empty");
    }
    let (qty, unit) = parse_quantity(quantity)?;
    Ok((name.to_string(), qty, unit))
}

/// Parse `"<recipe>[:<servings>]"`.
pub(crate) fn parse_recipe_ref(s: &str) -> Result<(String, Option<f64>)> {
    match s.rsplit_once(':') {
        Some((name, servings)) if !name.trim().is_empty() => {
            let servings: f64 = servings
                .trim()
                .parse()
                .with_context(|| format!("Invalid servings in '{s}'"))?;
            Ok((name.trim().to_string(), Some(servings)))
        }
        _ => Ok((s.trim().to_string(), None)),
    }
}

pub(crate) fn note_unknown_unit(table: &UnitTable, unit: &str) {
    if table.lookup(unit).is_none() {
        eprintln!("Note: unknown unit '{unit}', it will be counted as 'unit'");
    }
}

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "last-week" => Ok(Local::now().date_naive() - chrono::Duration::days(7)),
            "next-week" => Ok(Local::now().date_naive() + chrono::Duration::days(7)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/last-week/next-week")
            }),
        },
    }
}

pub(crate) fn prompt_choice(count: usize) -> Result<usize> {
    eprint!("\nSelect a product (1-{count}): ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    let n: usize = line.trim().parse().context("Invalid number")?;
    if n < 1 || n > count {
        bail!("Selection out of range");
    }
    Ok(n - 1)
}

pub(crate) fn print_product_table(products: &[&Product]) {
    #[derive(Tabled)]
    struct ProductRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Unit")]
        unit: String,
        #[tabled(rename = "Scope")]
        scope: &'static str,
    }

    let rows: Vec<ProductRow> = products
        .iter()
        .enumerate()
        .map(|(i, p)| ProductRow {
            idx: i + 1,
            id: p.id,
            name: truncate(&p.name, 35),
            category: p.category.as_deref().map(|c| truncate(c, 20)).unwrap_or_default(),
            unit: p.default_unit.to_string(),
            scope: if p.user_id.is_some() { "mine" } else { "catalog" },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(0..2)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn fmt_quantity(quantity: f64) -> String {
    round_quantity(quantity).to_string()
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_quantity(input: &str, qty: f64, unit: &str) {
        let (q, u) = parse_quantity(input).unwrap();
        assert!((q - qty).abs() < f64::EPSILON, "{input}: {q}");
        assert_eq!(u, unit, "{input}");
    }

    #[test]
    fn test_parse_quantity_forms() {
        assert_quantity("500g", 500.0, "g");
        assert_quantity("500 g", 500.0, "g");
        assert_quantity("2 cup", 2.0, "cup");
        assert_quantity("1.5 fl oz", 1.5, "fl oz");
        assert_quantity("2.5tbsp", 2.5, "tbsp");
        assert_quantity("3", 3.0, "unit");
        assert_quantity(" 3 cloves ", 3.0, "cloves");
    }

    #[test]
    fn test_parse_quantity_invalid() {
        assert!(parse_quantity("abc").is_err());
        assert!(parse_quantity("").is_err());
        assert!(parse_quantity("0").is_err());
        assert!(parse_quantity("0g").is_err());
        assert!(parse_quantity("-2 cup").is_err());
    }

    #[test]
    fn test_parse_ingredient_arg() {
        let (name, qty, unit) = parse_ingredient_arg("Olive Oil=2 tbsp").unwrap();
        assert_eq!(name, "Olive Oil");
        assert!((qty - 2.0).abs() < f64::EPSILON);
        assert_eq!(unit, "tbsp");

        assert!(parse_ingredient_arg("Olive Oil").is_err());
        assert!(parse_ingredient_arg("=2 tbsp").is_err());
    }

    #[test]
    fn test_parse_recipe_ref() {
        assert_eq!(parse_recipe_ref("Pasta").unwrap(), ("Pasta".to_string(), None));
        assert_eq!(
            parse_recipe_ref("Pasta:2").unwrap(),
            ("Pasta".to_string(), Some(2.0))
        );
        assert!(parse_recipe_ref("Pasta:lots").is_err());
    }

    #[test]
    fn test_parse_date_none() {
        assert_eq!(parse_date(None).unwrap(), Local::now().date_naive());
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("next-week".to_string())).unwrap(),
            today + chrono::Duration::days(7)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2026-10-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_fmt_quantity() {
        assert_eq!(fmt_quantity(123.456), "123");
        assert_eq!(fmt_quantity(1.5), "1.5");
        assert_eq!(fmt_quantity(2.0), "2");
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("Recipe not found"), r#"{"error":"Recipe not found"}"#);
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
    }
}
