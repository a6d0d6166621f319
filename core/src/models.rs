use anyhow::{Result, bail};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::units::BaseUnit;

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    /// `None` for the global catalog.
    pub user_id: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub default_unit: BaseUnit,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_product_unit")]
    pub default_unit: BaseUnit,
}

fn default_product_unit() -> BaseUnit {
    BaseUnit::Unit
}

pub const DEFAULT_RECIPE_SERVINGS: i64 = 4;

#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub servings: i64,
    pub ingredients: Vec<RecipeIngredient>,
    pub created_at: String,
    pub updated_at: String,
}

/// An ingredient line. `base_quantity`/`base_unit` are derived from
/// `quantity`/`unit` on every write and never edited directly.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub product_id: i64,
    pub quantity: f64,
    pub unit: String,
    pub base_quantity: f64,
    pub base_unit: BaseUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    // Joined fields for display
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewIngredient {
    pub product_id: i64,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_recipe_servings")]
    pub servings: i64,
    #[serde(default)]
    pub ingredients: Vec<NewIngredient>,
}

fn default_recipe_servings() -> i64 {
    DEFAULT_RECIPE_SERVINGS
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecipe {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    pub servings: Option<i64>,
    /// Replaces the whole ingredient set when present.
    pub ingredients: Option<Vec<NewIngredient>>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyPlan {
    pub id: i64,
    pub user_id: String,
    /// Always a Monday.
    pub week_start_date: NaiveDate,
    pub slots: Vec<MealSlot>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealSlot {
    pub id: i64,
    pub weekly_plan_id: i64,
    /// 0 = Monday ... 6 = Sunday.
    pub day_of_week: i64,
    pub meal_type: String,
    pub recipes: Vec<MealSlotRecipe>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealSlotRecipe {
    pub id: i64,
    pub meal_slot_id: i64,
    pub recipe_id: i64,
    pub servings: f64,
    pub sort_order: i64,
    // Joined
    pub recipe_name: String,
    pub recipe_servings: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotRecipe {
    pub recipe_id: i64,
    #[serde(default = "default_slot_servings")]
    pub servings: f64,
}

#[allow(clippy::cast_precision_loss)]
fn default_slot_servings() -> f64 {
    DEFAULT_RECIPE_SERVINGS as f64
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomShoppingItem {
    pub id: i64,
    pub weekly_plan_id: i64,
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub is_checked: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedItem {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub created_at: String,
}

/// Input for both per-plan custom items and saved items.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFreeformItem {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

pub const MEAL_TYPES: &[&str] = &["breakfast", "lunch", "dinner"];

pub const DAY_NAMES: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn day_name(day_of_week: i64) -> &'static str {
    DAY_NAMES
        .get(day_of_week.clamp(0, 6) as usize)
        .copied()
        .unwrap_or("Monday")
}

/// Monday of the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date - Days::new(offset)
}

pub fn validate_meal_type(meal: &str) -> Result<String> {
    let lower = meal.trim().to_lowercase();
    if MEAL_TYPES.contains(&lower.as_str()) {
        Ok(lower)
    } else {
        bail!(
            "Invalid meal type '{meal}'. Must be one of: {}",
            MEAL_TYPES.join(", ")
        )
    }
}

/// Accepts full or three-letter day names and `0`..`6`.
pub fn parse_day(day: &str) -> Result<i64> {
    match day.trim().to_lowercase().as_str() {
        "monday" | "mon" | "0" => Ok(0),
        "tuesday" | "tue" | "1" => Ok(1),
        "wednesday" | "wed" | "2" => Ok(2),
        "thursday" | "thu" | "3" => Ok(3),
        "friday" | "fri" | "4" => Ok(4),
        "saturday" | "sat" | "5" => Ok(5),
        "sunday" | "sun" | "6" => Ok(6),
        _ => bail!("Invalid day: {day}. Use monday-sunday, mon-sun, or 0-6"),
    }
}

pub fn validate_day_of_week(day_of_week: i64) -> Result<()> {
    if !(0..=6).contains(&day_of_week) {
        bail!("day_of_week must be between 0 (Monday) and 6 (Sunday)");
    }
    Ok(())
}

pub fn validate_recipe_servings(servings: i64) -> Result<()> {
    if servings <= 0 {
        bail!("Recipe servings must be greater than 0");
    }
    Ok(())
}

pub fn validate_slot_servings(servings: f64) -> Result<()> {
    if !servings.is_finite() || servings < 0.0 {
        bail!("Servings must be a non-negative number");
    }
    Ok(())
}

pub fn validate_new_recipe(recipe: &NewRecipe) -> Result<()> {
    if recipe.name.trim().is_empty() {
        bail!("Recipe name must not be empty");
    }
    validate_recipe_servings(recipe.servings)?;
    for ingredient in &recipe.ingredients {
        validate_ingredient(ingredient)?;
    }
    Ok(())
}

pub fn validate_ingredient(ingredient: &NewIngredient) -> Result<()> {
    if !ingredient.quantity.is_finite() || ingredient.quantity <= 0.0 {
        bail!("Ingredient quantity must be greater than 0");
    }
    if ingredient.unit.trim().is_empty() {
        bail!("Ingredient unit must not be empty");
    }
    Ok(())
}

pub fn validate_product(product: &NewProduct) -> Result<()> {
    if product.name.trim().is_empty() {
        bail!("Product name must not be empty");
    }
    Ok(())
}

pub fn validate_freeform_item(item: &NewFreeformItem) -> Result<()> {
    if item.name.trim().is_empty() {
        bail!("Item name must not be empty");
    }
    if item.quantity.is_some_and(|q| !q.is_finite() || q <= 0.0) {
        bail!("Item quantity must be greater than 0");
    }
    Ok(())
}
