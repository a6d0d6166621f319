//! Shopping-list aggregation: scale each scheduled recipe by its servings ratio,
//! sum per (product, base unit), then pick a display unit for each total.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::io;

use anyhow::Result;
use chrono::NaiveDate;
use feruca::Collator;
use serde::{Deserialize, Serialize};

use crate::display::{format_quantity, round_quantity, select_display_unit};
use crate::models::{CustomShoppingItem, Recipe};
use crate::units::{BaseUnit, MeasurementSystem};

/// One recipe as scheduled in a meal slot.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledRecipe<'a> {
    pub recipe: &'a Recipe,
    pub servings: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Name,
    CategoryThenName,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShoppingListItem {
    pub product_id: i64,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub total_base_quantity: f64,
    pub base_unit: BaseUnit,
    pub display_quantity: f64,
    pub display_unit: String,
    /// Unit of the first ingredient line that contributed.
    pub suggested_unit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShoppingList {
    pub weekly_plan_id: i64,
    pub week_start_date: NaiveDate,
    pub measurement_system: MeasurementSystem,
    pub items: Vec<ShoppingListItem>,
    pub custom_items: Vec<CustomShoppingItem>,
}

struct Accumulator<'a> {
    product_name: &'a str,
    category: Option<&'a str>,
    suggested_unit: &'a str,
    total: f64,
}

#[must_use]
pub fn aggregate(
    scheduled: &[ScheduledRecipe<'_>],
    system: MeasurementSystem,
    order: SortOrder,
) -> Vec<ShoppingListItem> {
    let mut totals: HashMap<(i64, BaseUnit), Accumulator<'_>> = HashMap::new();

    for entry in scheduled {
        #[allow(clippy::cast_precision_loss)]
        let scale = entry.servings / entry.recipe.servings as f64;
        for line in &entry.recipe.ingredients {
            let acc = totals
                .entry((line.product_id, line.base_unit))
                .or_insert_with(|| Accumulator {
                    product_name: &line.product_name,
                    category: line.product_category.as_deref(),
                    suggested_unit: &line.unit,
                    total: 0.0,
                });
            acc.total += line.base_quantity * scale;
        }
    }

    let mut items: Vec<ShoppingListItem> = totals
        .into_iter()
        .map(|((product_id, base_unit), acc)| {
            let display = select_display_unit(acc.total, base_unit, system);
            ShoppingListItem {
                product_id,
                product_name: acc.product_name.to_string(),
                category: acc.category.map(str::to_string),
                total_base_quantity: acc.total,
                base_unit,
                display_quantity: round_quantity(display.display_quantity),
                display_unit: display.display_unit.to_string(),
                suggested_unit: acc.suggested_unit.to_string(),
            }
        })
        .collect();

    sort_items(&mut items, order);
    items
}

/// Names are ordered with the Unicode collation algorithm (CLDR root), so case and
/// accents only break ties: "apple" < "Éclair" < "zucchini".
pub fn sort_items(items: &mut [ShoppingListItem], order: SortOrder) {
    let mut collator = Collator::default();
    match order {
        SortOrder::Name => items.sort_by(|a, b| compare_names(&mut collator, a, b)),
        SortOrder::CategoryThenName => items.sort_by(|a, b| {
            compare_categories(&mut collator, a, b).then_with(|| compare_names(&mut collator, a, b))
        }),
    }
}

fn compare_names(collator: &mut Collator, a: &ShoppingListItem, b: &ShoppingListItem) -> Ordering {
    collator
        .collate(a.product_name.as_str(), b.product_name.as_str())
        .then_with(|| a.base_unit.cmp(&b.base_unit))
        .then_with(|| a.product_id.cmp(&b.product_id))
}

// Uncategorized last
fn compare_categories(collator: &mut Collator, a: &ShoppingListItem, b: &ShoppingListItem) -> Ordering {
    match (&a.category, &b.category) {
        (Some(x), Some(y)) => collator.collate(x.as_str(), y.as_str()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A custom item's quantity as entered, or `None` when absent or zero.
#[must_use]
pub fn custom_quantity_label(item: &CustomShoppingItem) -> Option<String> {
    match (item.quantity, item.unit.as_deref()) {
        (Some(q), _) if q.abs() < f64::EPSILON => None,
        (Some(q), Some(unit)) if !unit.is_empty() => Some(format!("{q} {unit}")),
        (Some(q), _) => Some(q.to_string()),
        (None, _) => None,
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    kind: &'static str,
    name: &'a str,
    category: Option<&'a str>,
    quantity: Option<f64>,
    unit: Option<&'a str>,
    base_quantity: Option<f64>,
    base_unit: Option<BaseUnit>,
    checked: bool,
}

impl ShoppingList {
    /// Plain-text list for sharing: recipe and custom items interleaved by name.
    #[must_use]
    pub fn to_share_text(&self) -> String {
        let mut lines: Vec<(String, String)> = self
            .items
            .iter()
            .map(|item| {
                let qty = format_quantity(item.display_quantity, &item.display_unit);
                (item.product_name.clone(), format!("• {} ({qty})", item.product_name))
            })
            .collect();

        for item in &self.custom_items {
            let line = match custom_quantity_label(item) {
                Some(qty) => format!("• {} ({qty})", item.name),
                None => format!("• {}", item.name),
            };
            lines.push((item.name.clone(), line));
        }

        let mut collator = Collator::default();
        lines.sort_by(|a, b| collator.collate(a.0.as_str(), b.0.as_str()));
        let mut text = format!("Shopping list for week of {}\n", self.week_start_date);
        for (_, line) in lines {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for item in &self.items {
            wtr.serialize(CsvRow {
                kind: "recipe",
                name: &item.product_name,
                category: item.category.as_deref(),
                quantity: Some(item.display_quantity),
                unit: Some(&item.display_unit),
                base_quantity: Some(item.total_base_quantity),
                base_unit: Some(item.base_unit),
                checked: false,
            })?;
        }
        for item in &self.custom_items {
            wtr.serialize(CsvRow {
                kind: "custom",
                name: &item.name,
                category: None,
                quantity: item.quantity,
                unit: item.unit.as_deref(),
                base_quantity: None,
                base_unit: None,
                checked: item.is_checked,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
