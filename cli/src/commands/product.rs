use anyhow::Result;
use std::process;

use mealplan_core::db::Database;
use mealplan_core::models::{NewProduct, Product};
use mealplan_core::units::BaseUnit;

use super::helpers::print_product_table;

pub(crate) fn cmd_product_add(
    db: &Database,
    user_id: &str,
    name: &str,
    category: Option<String>,
    default_unit: Option<&str>,
    json: bool,
) -> Result<()> {
    let default_unit = match default_unit {
        Some(unit) => unit.parse::<BaseUnit>()?,
        None => BaseUnit::Unit,
    };
    let product = db.insert_product(
        Some(user_id),
        &NewProduct {
            name: name.to_string(),
            category,
            default_unit,
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
    } else {
        let name = &product.name;
        let id = product.id;
        println!("Added product: {name} (id: {id})");
    }

    Ok(())
}

pub(crate) fn cmd_product_list(
    db: &Database,
    user_id: &str,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let products = db.list_products(user_id, search)?;

    if products.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No products found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
    } else {
        let refs: Vec<&Product> = products.iter().collect();
        print_product_table(&refs);
    }

    Ok(())
}
