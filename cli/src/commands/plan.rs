use anyhow::Result;
use std::process;

use mealplan_core::db::Database;
use mealplan_core::models::{SlotRecipe, WeeklyPlan, day_name, parse_day, validate_meal_type};

use super::helpers::{fmt_quantity, json_error, parse_date, parse_recipe_ref};
use super::resolve_recipe;

#[allow(clippy::cast_precision_loss)]
fn slot_recipe(db: &Database, user_id: &str, reference: &str) -> Result<SlotRecipe> {
    let (name, servings) = parse_recipe_ref(reference)?;
    let recipe = resolve_recipe(db, user_id, &name)?;
    Ok(SlotRecipe {
        recipe_id: recipe.id,
        servings: servings.unwrap_or(recipe.servings as f64),
    })
}

fn print_plan(plan: &WeeklyPlan) {
    let week = plan.week_start_date;
    let id = plan.id;
    println!("=== Week of {week} (plan {id}) ===");

    if plan.slots.is_empty() {
        println!("\n  No meals planned");
        return;
    }

    let mut current_day = None;
    for slot in &plan.slots {
        if current_day != Some(slot.day_of_week) {
            current_day = Some(slot.day_of_week);
            println!("\n  {}", day_name(slot.day_of_week).to_uppercase());
        }
        let recipes: Vec<String> = slot
            .recipes
            .iter()
            .map(|r| format!("{} x{} [#{}]", r.recipe_name, fmt_quantity(r.servings), r.id))
            .collect();
        println!("    {:<10} {}", slot.meal_type, recipes.join(", "));
    }
}

pub(crate) fn cmd_plan_show(db: &Database, user_id: &str, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let plan = db.get_or_create_weekly_plan(user_id, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

pub(crate) fn cmd_plan_set(
    db: &Database,
    user_id: &str,
    day: &str,
    meal: &str,
    recipe_refs: &[String],
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let day_of_week = parse_day(day)?;
    let meal_type = validate_meal_type(meal)?;
    let plan = db.get_or_create_weekly_plan(user_id, parse_date(date)?)?;

    let entries = recipe_refs
        .iter()
        .map(|r| slot_recipe(db, user_id, r))
        .collect::<Result<Vec<_>>>()?;
    let slot = db.set_meal_slot(user_id, plan.id, day_of_week, &meal_type, &entries)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&slot)?);
    } else {
        let day = day_name(day_of_week);
        match slot {
            Some(slot) => {
                let names: Vec<&str> = slot.recipes.iter().map(|r| r.recipe_name.as_str()).collect();
                println!("{day} {meal_type}: {}", names.join(", "));
            }
            None => println!("Cleared {day} {meal_type}"),
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_plan_add(
    db: &Database,
    user_id: &str,
    day: &str,
    meal: &str,
    recipe_ref: &str,
    servings: Option<f64>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let day_of_week = parse_day(day)?;
    let meal_type = validate_meal_type(meal)?;
    let plan = db.get_or_create_weekly_plan(user_id, parse_date(date)?)?;

    let mut entry = slot_recipe(db, user_id, recipe_ref)?;
    if let Some(servings) = servings {
        entry.servings = servings;
    }
    let added = db.add_recipe_to_slot(user_id, plan.id, day_of_week, &meal_type, &entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&added)?);
    } else {
        let name = &added.recipe_name;
        let servings = fmt_quantity(added.servings);
        let day = day_name(day_of_week);
        let id = added.id;
        println!("Added {name} ({servings} servings) to {day} {meal_type} (id: {id})");
    }
    Ok(())
}

pub(crate) fn cmd_plan_remove(db: &Database, user_id: &str, slot_recipe_id: i64, json: bool) -> Result<()> {
    if db.remove_recipe_from_slot(user_id, slot_recipe_id)? {
        if json {
            println!("{}", serde_json::json!({ "removed": slot_recipe_id }));
        } else {
            println!("Removed planned recipe {slot_recipe_id}");
        }
    } else {
        if json {
            println!("{}", json_error(&format!("Planned recipe {slot_recipe_id} not found")));
        } else {
            eprintln!("Planned recipe {slot_recipe_id} not found");
        }
        process::exit(2);
    }
    Ok(())
}

pub(crate) fn cmd_plan_servings(
    db: &Database,
    user_id: &str,
    slot_recipe_id: i64,
    servings: f64,
    json: bool,
) -> Result<()> {
    if db.update_slot_recipe_servings(user_id, slot_recipe_id, servings)? {
        if json {
            println!(
                "{}",
                serde_json::json!({ "id": slot_recipe_id, "servings": servings })
            );
        } else {
            let servings = fmt_quantity(servings);
            println!("Planned recipe {slot_recipe_id} now serves {servings}");
        }
    } else {
        if json {
            println!("{}", json_error(&format!("Planned recipe {slot_recipe_id} not found")));
        } else {
            eprintln!("Planned recipe {slot_recipe_id} not found");
        }
        process::exit(2);
    }
    Ok(())
}

pub(crate) fn cmd_plan_clear_slot(
    db: &Database,
    user_id: &str,
    day: &str,
    meal: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let day_of_week = parse_day(day)?;
    let meal_type = validate_meal_type(meal)?;
    let plan = db.get_or_create_weekly_plan(user_id, parse_date(date)?)?;
    db.set_meal_slot(user_id, plan.id, day_of_week, &meal_type, &[])?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "cleared": { "day_of_week": day_of_week, "meal_type": meal_type } })
        );
    } else {
        let day = day_name(day_of_week);
        println!("Cleared {day} {meal_type}");
    }
    Ok(())
}

pub(crate) fn cmd_plan_clear(db: &Database, user_id: &str, date: Option<String>, json: bool) -> Result<()> {
    let plan = db.get_or_create_weekly_plan(user_id, parse_date(date)?)?;
    let removed = db.clear_all_meals(user_id, plan.id)?;

    if json {
        println!("{}", serde_json::json!({ "removed_slots": removed }));
    } else {
        let week = plan.week_start_date;
        println!("Cleared {removed} meal slot(s) from the week of {week}");
    }
    Ok(())
}
