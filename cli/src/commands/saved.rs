use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealplan_core::db::Database;
use mealplan_core::models::NewFreeformItem;

use super::helpers::{fmt_quantity, json_error, truncate};

pub(crate) fn cmd_saved_add(
    db: &Database,
    user_id: &str,
    name: &str,
    quantity: Option<f64>,
    unit: Option<String>,
    json: bool,
) -> Result<()> {
    let item = db.create_saved_item(
        user_id,
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
        println!("Saved {name} (id: {id})");
    }
    Ok(())
}

pub(crate) fn cmd_saved_list(db: &Database, user_id: &str, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct SavedRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Unit")]
        unit: String,
    }

    let items = db.list_saved_items(user_id)?;
    if items.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No saved items found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let rows: Vec<SavedRow> = items
        .iter()
        .map(|item| SavedRow {
            id: item.id,
            name: truncate(&item.name, 35),
            quantity: item.quantity.map(fmt_quantity).unwrap_or_default(),
            unit: item.unit.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(2)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

/// Fields left as `None` keep their current value.
pub(crate) fn cmd_saved_update(
    db: &Database,
    user_id: &str,
    id: i64,
    name: Option<String>,
    quantity: Option<f64>,
    unit: Option<String>,
    json: bool,
) -> Result<()> {
    let current = db.get_saved_item(user_id, id)?;
    let item = db.update_saved_item(
        user_id,
        id,
        &NewFreeformItem {
            name: name.unwrap_or(current.name),
            quantity: quantity.or(current.quantity),
            unit: unit.or(current.unit),
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        let name = &item.name;
        println!("Updated saved item {id}: {name}");
    }
    Ok(())
}

pub(crate) fn cmd_saved_delete(db: &Database, user_id: &str, id: i64, json: bool) -> Result<()> {
    if db.delete_saved_item(user_id, id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("Deleted saved item {id}");
        }
    } else {
        if json {
            println!("{}", json_error(&format!("Saved item {id} not found")));
        } else {
            eprintln!("Saved item {id} not found");
        }
        process::exit(2);
    }
    Ok(())
}
