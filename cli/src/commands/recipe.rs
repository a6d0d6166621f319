use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealplan_core::db::Database;
use mealplan_core::display::format_quantity;
use mealplan_core::models::{NewIngredient, NewRecipe};

use super::helpers::{json_error, note_unknown_unit, parse_ingredient_arg, parse_quantity, truncate};
use super::{resolve_product, resolve_recipe};

pub(crate) fn cmd_recipe_create(
    db: &Database,
    user_id: &str,
    name: &str,
    servings: i64,
    description: Option<String>,
    ingredient_args: &[String],
    json: bool,
) -> Result<()> {
    let table = db.unit_table(user_id)?;
    let mut ingredients = Vec::with_capacity(ingredient_args.len());
    for arg in ingredient_args {
        let (product_name, quantity, unit) = parse_ingredient_arg(arg)?;
        note_unknown_unit(&table, &unit);
        let product = resolve_product(db, user_id, &product_name)?;
        ingredients.push(NewIngredient {
            product_id: product.id,
            quantity,
            unit,
            notes: None,
        });
    }

    let recipe = db.create_recipe(
        user_id,
        &NewRecipe {
            name: name.to_string(),
            description,
            servings,
            ingredients,
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        let id = recipe.id;
        let count = recipe.ingredients.len();
        println!("Created recipe: {name} (id: {id}, servings: {servings}, ingredients: {count})");
        if count == 0 {
            println!(
                "Add ingredients with: mealplan recipe add-ingredient \"{name}\" <product> <quantity>"
            );
        }
    }
    Ok(())
}

pub(crate) fn cmd_recipe_add_ingredient(
    db: &Database,
    user_id: &str,
    recipe_ref: &str,
    product_name: &str,
    quantity_str: &str,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let recipe = resolve_recipe(db, user_id, recipe_ref)?;
    let (quantity, unit) = parse_quantity(quantity_str)?;
    note_unknown_unit(&db.unit_table(user_id)?, &unit);

    let product = resolve_product(db, user_id, product_name)?;
    let ingredient = db.add_recipe_ingredient(
        user_id,
        recipe.id,
        &NewIngredient {
            product_id: product.id,
            quantity,
            unit,
            notes,
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ingredient)?);
    } else {
        let qty = format_quantity(ingredient.quantity, &ingredient.unit);
        let product = &ingredient.product_name;
        let recipe = &recipe.name;
        println!("Added {qty} of {product} to {recipe}");
    }

    Ok(())
}

pub(crate) fn cmd_recipe_remove_ingredient(
    db: &Database,
    user_id: &str,
    recipe_ref: &str,
    product_name: &str,
    json: bool,
) -> Result<()> {
    let recipe = resolve_recipe(db, user_id, recipe_ref)?;
    if db.remove_recipe_ingredient(user_id, recipe.id, product_name)? {
        if json {
            println!("{}", serde_json::json!({ "removed": product_name }));
        } else {
            let recipe = &recipe.name;
            println!("Removed {product_name} from {recipe}");
        }
    } else {
        if json {
            println!(
                "{}",
                json_error(&format!("Ingredient '{product_name}' not found in recipe"))
            );
        } else {
            eprintln!("Ingredient '{product_name}' not found in recipe");
        }
        process::exit(2);
    }
    Ok(())
}

pub(crate) fn cmd_recipe_set_servings(
    db: &Database,
    user_id: &str,
    recipe_ref: &str,
    servings: i64,
    json: bool,
) -> Result<()> {
    let recipe = resolve_recipe(db, user_id, recipe_ref)?;
    db.set_recipe_servings(user_id, recipe.id, servings)?;
    if json {
        let recipe = db.get_recipe(user_id, recipe.id)?;
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        let name = &recipe.name;
        println!("Updated {name} to {servings} servings");
    }
    Ok(())
}

pub(crate) fn cmd_recipe_show(db: &Database, user_id: &str, recipe_ref: &str, json: bool) -> Result<()> {
    let recipe = resolve_recipe(db, user_id, recipe_ref)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    let name = &recipe.name;
    let servings = recipe.servings;
    println!("=== {name} ===");
    println!("  Servings: {servings}");
    if let Some(description) = &recipe.description {
        println!("  {description}");
    }

    if recipe.ingredients.is_empty() {
        println!("\n  No ingredients yet");
        return Ok(());
    }

    println!("\n  INGREDIENTS:");
    for ing in &recipe.ingredients {
        let product = &ing.product_name;
        let qty = format_quantity(ing.quantity, &ing.unit);
        let base = format_quantity(ing.base_quantity, ing.base_unit.as_str());
        match &ing.notes {
            Some(notes) => println!("    {product}: {qty} ({base}), {notes}"),
            None => println!("    {product}: {qty} ({base})"),
        }
    }

    Ok(())
}

pub(crate) fn cmd_recipe_list(db: &Database, user_id: &str, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Servings")]
        servings: i64,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
    }

    let recipes = db.list_recipes(user_id)?;
    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id,
            name: truncate(&r.name, 30),
            servings: r.servings,
            ingredients: r.ingredients.len(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_recipe_delete(db: &Database, user_id: &str, recipe_ref: &str, json: bool) -> Result<()> {
    let recipe = resolve_recipe(db, user_id, recipe_ref)?;
    db.delete_recipe(user_id, recipe.id)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": recipe.id }));
    } else {
        let name = &recipe.name;
        println!("Deleted recipe {name}");
    }
    Ok(())
}
