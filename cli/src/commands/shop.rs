use anyhow::Result;
use clap::ValueEnum;
use std::io::{self, Write};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealplan_core::db::Database;
use mealplan_core::display::format_quantity;
use mealplan_core::models::NewFreeformItem;
use mealplan_core::shopping::{ShoppingList, SortOrder, custom_quantity_label};
use mealplan_core::units::MeasurementSystem;

use super::helpers::{json_error, parse_date, truncate};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum ListFormat {
    Table,
    Text,
    Csv,
}

fn print_list_table(list: &ShoppingList) {
    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "Product")]
        name: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
    }

    #[derive(Tabled)]
    struct CustomRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "")]
        checked: &'static str,
        #[tabled(rename = "Item")]
        name: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
    }

    let week = list.week_start_date;
    let system = list.measurement_system;
    println!("=== Shopping list for week of {week} ({system}) ===\n");

    if !list.items.is_empty() {
        let rows: Vec<ItemRow> = list
            .items
            .iter()
            .map(|item| ItemRow {
                name: truncate(&item.product_name, 35),
                category: item.category.as_deref().map(|c| truncate(c, 20)).unwrap_or_default(),
                quantity: format_quantity(item.display_quantity, &item.display_unit),
            })
            .collect();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::single(2)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    if !list.custom_items.is_empty() {
        println!("\n  EXTRA ITEMS:");
        let rows: Vec<CustomRow> = list
            .custom_items
            .iter()
            .map(|item| CustomRow {
                id: item.id,
                checked: if item.is_checked { "x" } else { " " },
                name: truncate(&item.name, 35),
                quantity: custom_quantity_label(item).unwrap_or_default(),
            })
            .collect();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::single(3)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }
}

pub(crate) fn cmd_shop_list(
    db: &Database,
    user_id: &str,
    date: Option<String>,
    system: Option<&str>,
    by_category: bool,
    format: ListFormat,
    json: bool,
) -> Result<()> {
    let plan = db.get_or_create_weekly_plan(user_id, parse_date(date)?)?;
    let system = match system {
        Some(s) => s.parse::<MeasurementSystem>()?,
        None => db.get_measurement_system(user_id)?,
    };
    let order = if by_category {
        SortOrder::CategoryThenName
    } else {
        SortOrder::Name
    };
    let list = db.build_shopping_list(user_id, plan.id, system, order)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    match format {
        ListFormat::Text => print!("{}", list.to_share_text()),
        ListFormat::Csv => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            list.write_csv(&mut lock)?;
            lock.flush()?;
        }
        ListFormat::Table => {
            if list.items.is_empty() && list.custom_items.is_empty() {
                eprintln!("Shopping list is empty. Plan some meals with: mealplan plan add");
                process::exit(2);
            }
            print_list_table(&list);
        }
    }
    Ok(())
}

pub(crate) fn cmd_shop_add(
    db: &Database,
    user_id: &str,
    name: &str,
    quantity: Option<f64>,
    unit: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let plan = db.get_or_create_weekly_plan(user_id, parse_date(date)?)?;
    let item = db.add_custom_item(
        user_id,
        plan.id,
        &NewFreeformItem {
            name: name.to_string(),
            quantity,
            unit,
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        let name = &item.name;
        let id = item.id;
        println!("Added {name} to the shopping list (id: {id})");
    }
    Ok(())
}

pub(crate) fn cmd_shop_check(
    db: &Database,
    user_id: &str,
    id: i64,
    checked: bool,
    json: bool,
) -> Result<()> {
    if db.set_custom_item_checked(user_id, id, checked)? {
        if json {
            println!("{}", serde_json::json!({ "id": id, "is_checked": checked }));
        } else if checked {
            println!("Checked item {id}");
        } else {
            println!("Unchecked item {id}");
        }
    } else {
        if json {
            println!("{}", json_error(&format!("Shopping item {id} not found")));
        } else {
            eprintln!("Shopping item {id} not found");
        }
        process::exit(2);
    }
    Ok(())
}

pub(crate) fn cmd_shop_remove(db: &Database, user_id: &str, id: i64, json: bool) -> Result<()> {
    if db.remove_custom_item(user_id, id)? {
        if json {
            println!("{}", serde_json::json!({ "removed": id }));
        } else {
            println!("Removed item {id}");
        }
    } else {
        if json {
            println!("{}", json_error(&format!("Shopping item {id} not found")));
        } else {
            eprintln!("Shopping item {id} not found");
        }
        process::exit(2);
    }
    Ok(())
}

pub(crate) fn cmd_shop_clear(db: &Database, user_id: &str, date: Option<String>, json: bool) -> Result<()> {
    let plan = db.get_or_create_weekly_plan(user_id, parse_date(date)?)?;
    let removed = db.clear_custom_items(user_id, plan.id)?;
    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else {
        println!("Removed {removed} extra item(s)");
    }
    Ok(())
}

pub(crate) fn cmd_shop_add_saved(
    db: &Database,
    user_id: &str,
    saved_ids: &[i64],
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let plan = db.get_or_create_weekly_plan(user_id, parse_date(date)?)?;
    let added = db.add_custom_items_from_saved(user_id, plan.id, saved_ids)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&added)?);
    } else {
        for item in &added {
            let name = &item.name;
            let id = item.id;
            println!("Added {name} (id: {id})");
        }
    }
    Ok(())
}
