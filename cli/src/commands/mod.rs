mod helpers;
mod plan;
mod product;
mod recipe;
mod saved;
mod settings;
mod shop;
mod unit;

use anyhow::{Context, Result, bail};

use mealplan_core::db::Database;
use mealplan_core::models::{Product, Recipe};

use helpers::{print_product_table, prompt_choice};

pub(crate) use plan::{
    cmd_plan_add, cmd_plan_clear, cmd_plan_clear_slot, cmd_plan_remove, cmd_plan_servings,
    cmd_plan_set, cmd_plan_show,
};
pub(crate) use product::{cmd_product_add, cmd_product_list};
pub(crate) use recipe::{
    cmd_recipe_add_ingredient, cmd_recipe_create, cmd_recipe_delete, cmd_recipe_list,
    cmd_recipe_remove_ingredient, cmd_recipe_set_servings, cmd_recipe_show,
};
pub(crate) use saved::{cmd_saved_add, cmd_saved_delete, cmd_saved_list, cmd_saved_update};
pub(crate) use settings::{cmd_settings_show, cmd_settings_system};
pub(crate) use shop::{
    ListFormat, cmd_shop_add, cmd_shop_add_saved, cmd_shop_check, cmd_shop_clear, cmd_shop_list,
    cmd_shop_remove,
};
pub(crate) use unit::{cmd_unit_add, cmd_unit_convert, cmd_unit_list, cmd_unit_remove};

/// Resolve a product name: an exact (case-insensitive) match wins, otherwise
/// search the catalog and the user's products and ask when ambiguous.
pub(super) fn resolve_product(db: &Database, user_id: &str, query: &str) -> Result<Product> {
    if let Some(product) = db.find_product_by_name(user_id, query)? {
        return Ok(product);
    }

    let mut found = db.list_products(user_id, Some(query))?;
    if found.is_empty() {
        bail!("No product found for '{query}'. Add it with: mealplan product add \"{query}\"");
    }

    if found.len() == 1 {
        return found.pop().context("No product found");
    }

    let refs: Vec<&Product> = found.iter().collect();
    print_product_table(&refs);
    let idx = prompt_choice(found.len())?;
    Ok(found.swap_remove(idx))
}

/// A recipe by numeric id or by name.
pub(super) fn resolve_recipe(db: &Database, user_id: &str, reference: &str) -> Result<Recipe> {
    match reference.trim().parse::<i64>() {
        Ok(id) => db.get_recipe(user_id, id),
        Err(_) => db.get_recipe_by_name(user_id, reference),
    }
}
