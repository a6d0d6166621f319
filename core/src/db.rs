use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef};
use rusqlite::{Connection, OptionalExtension, ToSql, params};

use crate::catalog::GLOBAL_PRODUCTS;
use crate::models::{
    CustomShoppingItem, MealSlot, MealSlotRecipe, NewFreeformItem, NewIngredient, NewProduct,
    NewRecipe, Product, Recipe, RecipeIngredient, SavedItem, SlotRecipe, UpdateRecipe, WeeklyPlan,
    validate_day_of_week, validate_freeform_item, validate_ingredient, validate_meal_type,
    validate_new_recipe, validate_product, validate_recipe_servings, validate_slot_servings,
    week_start,
};
use crate::shopping::{ScheduledRecipe, ShoppingList, SortOrder, aggregate};
use crate::units::{BaseUnit, MeasurementSystem, UnitDefinition, UnitTable, validate_custom_unit};

const SCHEMA_VERSION: i64 = 2;

const MEASUREMENT_SYSTEM_KEY: &str = "measurement_system";

impl ToSql for BaseUnit {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BaseUnit {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "g" => Ok(BaseUnit::G),
            "ml" => Ok(BaseUnit::Ml),
            "unit" => Ok(BaseUnit::Unit),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

fn now() -> String {
    Local::now().to_rfc3339()
}

fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

const PRODUCT_COLUMNS: &str = "id, user_id, name, category, default_unit, created_at";

const INGREDIENT_QUERY: &str = "SELECT rp.id, rp.recipe_id, rp.product_id, rp.quantity, rp.unit,
        rp.base_quantity, rp.base_unit, rp.notes, p.name, p.category
     FROM recipe_products rp
     JOIN products p ON rp.product_id = p.id";

const SLOT_RECIPE_QUERY: &str = "SELECT msr.id, msr.meal_slot_id, msr.recipe_id, msr.servings,
        msr.sort_order, r.name, r.servings
     FROM meal_slot_recipes msr
     JOIN recipes r ON msr.recipe_id = r.id";

const CUSTOM_ITEM_COLUMNS: &str =
    "id, weekly_plan_id, name, quantity, unit, is_checked, created_at";

const SAVED_ITEM_COLUMNS: &str = "id, user_id, name, quantity, unit, created_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    #[allow(clippy::too_many_lines)]
    fn migrate(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", "ON")?;

        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < SCHEMA_VERSION {
            tracing::info!(from = version, to = SCHEMA_VERSION, "migrating database schema");
        }

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS units (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL,
                    symbol TEXT NOT NULL,
                    name TEXT NOT NULL,
                    abbreviation TEXT NOT NULL,
                    base_unit TEXT NOT NULL CHECK (base_unit IN ('g', 'ml', 'unit')),
                    conversion_factor REAL NOT NULL CHECK (conversion_factor > 0),
                    UNIQUE (user_id, symbol)
                );

                CREATE TABLE IF NOT EXISTS products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT,
                    name TEXT NOT NULL,
                    category TEXT,
                    default_unit TEXT NOT NULL DEFAULT 'unit'
                        CHECK (default_unit IN ('g', 'ml', 'unit')),
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS recipes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    description TEXT,
                    servings INTEGER NOT NULL DEFAULT 4 CHECK (servings > 0),
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS recipe_products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    product_id INTEGER NOT NULL REFERENCES products(id),
                    quantity REAL NOT NULL CHECK (quantity > 0),
                    unit TEXT NOT NULL,
                    base_quantity REAL NOT NULL,
                    base_unit TEXT NOT NULL CHECK (base_unit IN ('g', 'ml', 'unit')),
                    notes TEXT
                );

                CREATE TABLE IF NOT EXISTS weekly_plans (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL,
                    week_start_date TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    UNIQUE (user_id, week_start_date)
                );

                CREATE TABLE IF NOT EXISTS meal_slots (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    weekly_plan_id INTEGER NOT NULL REFERENCES weekly_plans(id) ON DELETE CASCADE,
                    day_of_week INTEGER NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
                    meal_type TEXT NOT NULL CHECK (meal_type IN ('breakfast', 'lunch', 'dinner')),
                    UNIQUE (weekly_plan_id, day_of_week, meal_type)
                );

                CREATE TABLE IF NOT EXISTS meal_slot_recipes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    meal_slot_id INTEGER NOT NULL REFERENCES meal_slots(id) ON DELETE CASCADE,
                    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    servings REAL NOT NULL DEFAULT 4 CHECK (servings >= 0),
                    sort_order INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS custom_shopping_items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    weekly_plan_id INTEGER NOT NULL REFERENCES weekly_plans(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    quantity REAL,
                    unit TEXT,
                    is_checked INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS saved_shopping_items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    quantity REAL,
                    unit TEXT,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS user_settings (
                    user_id TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, key)
                );

                CREATE INDEX IF NOT EXISTS idx_products_name ON products(name);
                CREATE INDEX IF NOT EXISTS idx_recipes_user ON recipes(user_id);
                CREATE INDEX IF NOT EXISTS idx_recipe_products_recipe ON recipe_products(recipe_id);
                CREATE INDEX IF NOT EXISTS idx_meal_slots_plan ON meal_slots(weekly_plan_id);
                CREATE INDEX IF NOT EXISTS idx_meal_slot_recipes_slot ON meal_slot_recipes(meal_slot_id);
                CREATE INDEX IF NOT EXISTS idx_custom_items_plan ON custom_shopping_items(weekly_plan_id);
                CREATE INDEX IF NOT EXISTS idx_saved_items_user ON saved_shopping_items(user_id);

                PRAGMA user_version = 1;",
            )?;
        }

        if version < 2 {
            self.seed_catalog()?;
            self.conn.execute_batch("PRAGMA user_version = 2;")?;
        }

        Ok(())
    }

    /// Insert the global product catalog, skipping names already present.
    pub fn seed_catalog(&self) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let created_at = now();
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO products (user_id, name, category, default_unit, created_at)
                 SELECT NULL, ?1, ?2, ?3, ?4
                 WHERE NOT EXISTS (
                     SELECT 1 FROM products WHERE user_id IS NULL AND LOWER(name) = LOWER(?1)
                 )",
            )?;
            for (name, category, default_unit) in GLOBAL_PRODUCTS {
                inserted += stmt.execute(params![name, category, default_unit, created_at])?;
            }
        }
        tx.commit()?;
        tracing::info!(inserted, "seeded global product catalog");
        Ok(inserted)
    }

    // --- Row mapping helpers ---

    fn product_from_row(row: &rusqlite::Row) -> rusqlite::Result<Product> {
        Ok(Product {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            category: row.get(3)?,
            default_unit: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    // Expects INGREDIENT_QUERY columns
    fn ingredient_from_row(row: &rusqlite::Row) -> rusqlite::Result<RecipeIngredient> {
        Ok(RecipeIngredient {
            id: row.get(0)?,
            recipe_id: row.get(1)?,
            product_id: row.get(2)?,
            quantity: row.get(3)?,
            unit: row.get(4)?,
            base_quantity: row.get(5)?,
            base_unit: row.get(6)?,
            notes: row.get(7)?,
            product_name: row.get(8)?,
            product_category: row.get(9)?,
        })
    }

    fn recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<Recipe> {
        Ok(Recipe {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            servings: row.get(4)?,
            ingredients: Vec::new(),
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    // Expects SLOT_RECIPE_QUERY columns
    fn slot_recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<MealSlotRecipe> {
        Ok(MealSlotRecipe {
            id: row.get(0)?,
            meal_slot_id: row.get(1)?,
            recipe_id: row.get(2)?,
            servings: row.get(3)?,
            sort_order: row.get(4)?,
            recipe_name: row.get(5)?,
            recipe_servings: row.get(6)?,
        })
    }

    fn custom_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<CustomShoppingItem> {
        Ok(CustomShoppingItem {
            id: row.get(0)?,
            weekly_plan_id: row.get(1)?,
            name: row.get(2)?,
            quantity: row.get(3)?,
            unit: row.get(4)?,
            is_checked: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn saved_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<SavedItem> {
        Ok(SavedItem {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            quantity: row.get(3)?,
            unit: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn unit_from_row(row: &rusqlite::Row) -> rusqlite::Result<UnitDefinition> {
        Ok(UnitDefinition {
            symbol: Cow::Owned(row.get(0)?),
            name: Cow::Owned(row.get(1)?),
            abbreviation: Cow::Owned(row.get(2)?),
            base_unit: row.get(3)?,
            conversion_factor: row.get(4)?,
        })
    }

    // --- Ownership checks ---

    fn ensure_plan(&self, user_id: &str, plan_id: i64) -> Result<()> {
        self.conn
            .query_row(
                "SELECT id FROM weekly_plans WHERE id = ?1 AND user_id = ?2",
                params![plan_id, user_id],
                |row| row.get::<_, i64>(0),
            )
            .context("Weekly plan not found")?;
        Ok(())
    }

    fn ensure_recipe(&self, user_id: &str, recipe_id: i64) -> Result<()> {
        self.conn
            .query_row(
                "SELECT id FROM recipes WHERE id = ?1 AND user_id = ?2",
                params![recipe_id, user_id],
                |row| row.get::<_, i64>(0),
            )
            .context("Recipe not found")?;
        Ok(())
    }

    // --- Units ---

    pub fn list_custom_units(&self, user_id: &str) -> Result<Vec<UnitDefinition>> {
        let mut stmt = self.conn.prepare(
            "SELECT symbol, name, abbreviation, base_unit, conversion_factor
             FROM units WHERE user_id = ?1 ORDER BY symbol",
        )?;
        let units = stmt
            .query_map(params![user_id], Self::unit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(units)
    }

    /// Built-in table overlaid with the user's custom units.
    pub fn unit_table(&self, user_id: &str) -> Result<UnitTable> {
        Ok(UnitTable::with_custom(self.list_custom_units(user_id)?))
    }

    /// Add or redefine a custom unit, then refresh the user's cached base quantities.
    pub fn add_custom_unit(&self, user_id: &str, unit: &UnitDefinition) -> Result<UnitDefinition> {
        validate_custom_unit(unit)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO units (user_id, symbol, name, abbreviation, base_unit, conversion_factor)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (user_id, symbol) DO UPDATE SET
                name = excluded.name,
                abbreviation = excluded.abbreviation,
                base_unit = excluded.base_unit,
                conversion_factor = excluded.conversion_factor",
            params![
                user_id,
                unit.symbol.trim(),
                unit.name.trim(),
                unit.abbreviation.trim(),
                unit.base_unit,
                unit.conversion_factor
            ],
        )?;
        self.recompute_base_quantities(user_id)?;
        tx.commit()?;
        Ok(unit.clone())
    }

    pub fn delete_custom_unit(&self, user_id: &str, symbol: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let rows = tx.execute(
            "DELETE FROM units WHERE user_id = ?1 AND symbol = ?2",
            params![user_id, symbol.trim()],
        )?;
        if rows > 0 {
            self.recompute_base_quantities(user_id)?;
        }
        tx.commit()?;
        Ok(rows > 0)
    }

    /// Recompute cached base quantities of the user's ingredient lines against the
    /// current unit table. Returns the number of lines that changed. Runs inside the
    /// caller's transaction.
    fn recompute_base_quantities(&self, user_id: &str) -> Result<usize> {
        let table = self.unit_table(user_id)?;
        let lines: Vec<(i64, f64, String)> = {
            let mut stmt = self.conn.prepare(
                "SELECT rp.id, rp.quantity, rp.unit
                 FROM recipe_products rp JOIN recipes r ON rp.recipe_id = r.id
                 WHERE r.user_id = ?1",
            )?;
            stmt.query_map(params![user_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?
        };

        let mut changed = 0;
        for (id, quantity, unit) in lines {
            let base = table.to_base(quantity, &unit);
            changed += self.conn.execute(
                "UPDATE recipe_products SET base_quantity = ?1, base_unit = ?2
                 WHERE id = ?3 AND (base_quantity != ?1 OR base_unit != ?2)",
                params![base.base_quantity, base.base_unit, id],
            )?;
        }
        if changed > 0 {
            tracing::info!(user_id, changed, "recomputed ingredient base quantities");
        }
        Ok(changed)
    }

    // --- Products ---

    pub fn insert_product(&self, user_id: Option<&str>, product: &NewProduct) -> Result<Product> {
        validate_product(product)?;
        self.conn.execute(
            "INSERT INTO products (user_id, name, category, default_unit, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                product.name.trim(),
                trimmed(product.category.as_deref()),
                product.default_unit,
                now()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
                params![id],
                Self::product_from_row,
            )
            .context("Product not found")
    }

    /// Global products and the user's own.
    pub fn get_product(&self, user_id: &str, id: i64) -> Result<Product> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products
                     WHERE id = ?1 AND (user_id IS NULL OR user_id = ?2)"
                ),
                params![id, user_id],
                Self::product_from_row,
            )
            .with_context(|| format!("Product with id {id} not found"))
    }

    pub fn list_products(&self, user_id: &str, search: Option<&str>) -> Result<Vec<Product>> {
        let pattern = like_pattern(search.unwrap_or_default().trim());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE (user_id IS NULL OR user_id = ?1)
               AND (name LIKE ?2 ESCAPE '\\' OR category LIKE ?2 ESCAPE '\\')
             ORDER BY name COLLATE NOCASE, id"
        ))?;
        let products = stmt
            .query_map(params![user_id, pattern], Self::product_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// Case-insensitive exact match; the user's own product wins over the catalog.
    pub fn find_product_by_name(&self, user_id: &str, name: &str) -> Result<Option<Product>> {
        let product = self
            .conn
            .query_row(
                &format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products
                     WHERE (user_id IS NULL OR user_id = ?1) AND LOWER(name) = LOWER(?2)
                     ORDER BY user_id IS NULL, id LIMIT 1"
                ),
                params![user_id, name.trim()],
                Self::product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    // --- Recipes ---

    fn insert_ingredient(
        &self,
        user_id: &str,
        recipe_id: i64,
        table: &UnitTable,
        ingredient: &NewIngredient,
    ) -> Result<i64> {
        validate_ingredient(ingredient)?;
        self.get_product(user_id, ingredient.product_id)?;
        let unit = ingredient.unit.trim();
        let base = table.to_base(ingredient.quantity, unit);
        self.conn.execute(
            "INSERT INTO recipe_products
                (recipe_id, product_id, quantity, unit, base_quantity, base_unit, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                recipe_id,
                ingredient.product_id,
                ingredient.quantity,
                unit,
                base.base_quantity,
                base.base_unit,
                trimmed(ingredient.notes.as_deref())
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn touch_recipe(&self, recipe_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE recipes SET updated_at = ?1 WHERE id = ?2",
            params![now(), recipe_id],
        )?;
        Ok(())
    }

    pub fn create_recipe(&self, user_id: &str, recipe: &NewRecipe) -> Result<Recipe> {
        validate_new_recipe(recipe)?;
        let table = self.unit_table(user_id)?;
        let tx = self.conn.unchecked_transaction()?;
        let created_at = now();
        self.conn.execute(
            "INSERT INTO recipes (user_id, name, description, servings, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                user_id,
                recipe.name.trim(),
                trimmed(recipe.description.as_deref()),
                recipe.servings,
                created_at
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        for ingredient in &recipe.ingredients {
            self.insert_ingredient(user_id, id, &table, ingredient)?;
        }
        tx.commit()?;
        self.get_recipe(user_id, id)
    }

    pub fn get_recipe(&self, user_id: &str, id: i64) -> Result<Recipe> {
        let mut recipe = self
            .conn
            .query_row(
                "SELECT id, user_id, name, description, servings, created_at, updated_at
                 FROM recipes WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                Self::recipe_from_row,
            )
            .context("Recipe not found")?;
        recipe.ingredients = self.get_recipe_ingredients(id)?;
        Ok(recipe)
    }

    pub fn get_recipe_by_name(&self, user_id: &str, name: &str) -> Result<Recipe> {
        let id: i64 = self
            .conn
            .query_row(
                "SELECT id FROM recipes WHERE user_id = ?1 AND LOWER(name) = LOWER(?2)
                 ORDER BY id LIMIT 1",
                params![user_id, name.trim()],
                |row| row.get(0),
            )
            .with_context(|| format!("Recipe '{name}' not found"))?;
        self.get_recipe(user_id, id)
    }

    pub fn get_recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredient>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{INGREDIENT_QUERY} WHERE rp.recipe_id = ?1 ORDER BY rp.id"))?;
        let ingredients = stmt
            .query_map(params![recipe_id], Self::ingredient_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    pub fn list_recipes(&self, user_id: &str) -> Result<Vec<Recipe>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM recipes WHERE user_id = ?1 ORDER BY name COLLATE NOCASE, id",
        )?;
        let ids: Vec<i64> = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut recipes = Vec::with_capacity(ids.len());
        for id in ids {
            recipes.push(self.get_recipe(user_id, id)?);
        }
        Ok(recipes)
    }

    /// Applies the given fields; a present ingredient list replaces every line atomically.
    pub fn update_recipe(&self, user_id: &str, id: i64, update: &UpdateRecipe) -> Result<Recipe> {
        self.ensure_recipe(user_id, id)?;
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            bail!("Recipe name must not be empty");
        }
        if let Some(servings) = update.servings {
            validate_recipe_servings(servings)?;
        }
        let table = self.unit_table(user_id)?;

        let tx = self.conn.unchecked_transaction()?;
        if let Some(name) = &update.name {
            self.conn.execute(
                "UPDATE recipes SET name = ?1 WHERE id = ?2",
                params![name.trim(), id],
            )?;
        }
        if let Some(description) = &update.description {
            self.conn.execute(
                "UPDATE recipes SET description = ?1 WHERE id = ?2",
                params![trimmed(description.as_deref()), id],
            )?;
        }
        if let Some(servings) = update.servings {
            self.conn.execute(
                "UPDATE recipes SET servings = ?1 WHERE id = ?2",
                params![servings, id],
            )?;
        }
        if let Some(ingredients) = &update.ingredients {
            self.conn
                .execute("DELETE FROM recipe_products WHERE recipe_id = ?1", params![id])?;
            for ingredient in ingredients {
                self.insert_ingredient(user_id, id, &table, ingredient)?;
            }
        }
        self.touch_recipe(id)?;
        tx.commit()?;
        self.get_recipe(user_id, id)
    }

    pub fn add_recipe_ingredient(
        &self,
        user_id: &str,
        recipe_id: i64,
        ingredient: &NewIngredient,
    ) -> Result<RecipeIngredient> {
        self.ensure_recipe(user_id, recipe_id)?;
        let table = self.unit_table(user_id)?;
        let id = self.insert_ingredient(user_id, recipe_id, &table, ingredient)?;
        self.touch_recipe(recipe_id)?;
        self.get_ingredient(id)
    }

    fn get_ingredient(&self, id: i64) -> Result<RecipeIngredient> {
        self.conn
            .query_row(
                &format!("{INGREDIENT_QUERY} WHERE rp.id = ?1"),
                params![id],
                Self::ingredient_from_row,
            )
            .context("Ingredient not found")
    }

    /// Change a line's quantity and unit; the cached base pair is rewritten in the same statement.
    pub fn update_recipe_ingredient(
        &self,
        user_id: &str,
        ingredient_id: i64,
        quantity: f64,
        unit: &str,
    ) -> Result<RecipeIngredient> {
        let recipe_id: i64 = self
            .conn
            .query_row(
                "SELECT rp.recipe_id FROM recipe_products rp JOIN recipes r ON rp.recipe_id = r.id
                 WHERE rp.id = ?1 AND r.user_id = ?2",
                params![ingredient_id, user_id],
                |row| row.get(0),
            )
            .context("Ingredient not found")?;
        let product_id: i64 = self.conn.query_row(
            "SELECT product_id FROM recipe_products WHERE id = ?1",
            params![ingredient_id],
            |row| row.get(0),
        )?;
        validate_ingredient(&NewIngredient {
            product_id,
            quantity,
            unit: unit.to_string(),
            notes: None,
        })?;

        let unit = unit.trim();
        let base = self.unit_table(user_id)?.to_base(quantity, unit);
        self.conn.execute(
            "UPDATE recipe_products
             SET quantity = ?1, unit = ?2, base_quantity = ?3, base_unit = ?4
             WHERE id = ?5",
            params![quantity, unit, base.base_quantity, base.base_unit, ingredient_id],
        )?;
        self.touch_recipe(recipe_id)?;
        self.get_ingredient(ingredient_id)
    }

    /// Remove every line of the recipe using the named product.
    pub fn remove_recipe_ingredient(
        &self,
        user_id: &str,
        recipe_id: i64,
        product_name: &str,
    ) -> Result<bool> {
        self.ensure_recipe(user_id, recipe_id)?;
        let rows = self.conn.execute(
            "DELETE FROM recipe_products WHERE recipe_id = ?1 AND product_id IN (
                SELECT id FROM products WHERE LOWER(name) = LOWER(?2)
            )",
            params![recipe_id, product_name.trim()],
        )?;
        if rows > 0 {
            self.touch_recipe(recipe_id)?;
        }
        Ok(rows > 0)
    }

    pub fn delete_recipe_ingredient(&self, user_id: &str, ingredient_id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM recipe_products WHERE id = ?1 AND recipe_id IN (
                SELECT id FROM recipes WHERE user_id = ?2
            )",
            params![ingredient_id, user_id],
        )?;
        Ok(rows > 0)
    }

    pub fn set_recipe_servings(&self, user_id: &str, recipe_id: i64, servings: i64) -> Result<()> {
        validate_recipe_servings(servings)?;
        let rows = self.conn.execute(
            "UPDATE recipes SET servings = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
            params![servings, now(), recipe_id, user_id],
        )?;
        if rows == 0 {
            bail!("Recipe not found");
        }
        Ok(())
    }

    /// Lines and slot assignments cascade; slots left empty are removed.
    pub fn delete_recipe(&self, user_id: &str, recipe_id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let rows = self.conn.execute(
            "DELETE FROM recipes WHERE id = ?1 AND user_id = ?2",
            params![recipe_id, user_id],
        )?;
        if rows > 0 {
            self.prune_empty_slots(user_id)?;
        }
        tx.commit()?;
        Ok(rows > 0)
    }

    fn prune_empty_slots(&self, user_id: &str) -> Result<usize> {
        let rows = self.conn.execute(
            "DELETE FROM meal_slots
             WHERE weekly_plan_id IN (SELECT id FROM weekly_plans WHERE user_id = ?1)
               AND id NOT IN (SELECT meal_slot_id FROM meal_slot_recipes)",
            params![user_id],
        )?;
        Ok(rows)
    }

    // --- Weekly plans ---

    /// The plan for the week containing `date`, created on first access.
    pub fn get_or_create_weekly_plan(&self, user_id: &str, date: NaiveDate) -> Result<WeeklyPlan> {
        let monday = week_start(date).to_string();
        self.conn.execute(
            "INSERT OR IGNORE INTO weekly_plans (user_id, week_start_date, created_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, monday, now()],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT id FROM weekly_plans WHERE user_id = ?1 AND week_start_date = ?2",
            params![user_id, monday],
            |row| row.get(0),
        )?;
        self.get_weekly_plan(user_id, id)
    }

    pub fn get_weekly_plan(&self, user_id: &str, plan_id: i64) -> Result<WeeklyPlan> {
        let mut plan = self
            .conn
            .query_row(
                "SELECT id, user_id, week_start_date, created_at
                 FROM weekly_plans WHERE id = ?1 AND user_id = ?2",
                params![plan_id, user_id],
                |row| {
                    Ok(WeeklyPlan {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        week_start_date: date_column(row, 2)?,
                        slots: Vec::new(),
                        created_at: row.get(3)?,
                    })
                },
            )
            .context("Weekly plan not found")?;
        plan.slots = self.get_meal_slots(plan_id)?;
        Ok(plan)
    }

    fn get_meal_slots(&self, plan_id: i64) -> Result<Vec<MealSlot>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, weekly_plan_id, day_of_week, meal_type FROM meal_slots
             WHERE weekly_plan_id = ?1
             ORDER BY day_of_week,
                CASE meal_type WHEN 'breakfast' THEN 0 WHEN 'lunch' THEN 1 ELSE 2 END",
        )?;
        let mut slots = stmt
            .query_map(params![plan_id], |row| {
                Ok(MealSlot {
                    id: row.get(0)?,
                    weekly_plan_id: row.get(1)?,
                    day_of_week: row.get(2)?,
                    meal_type: row.get(3)?,
                    recipes: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for slot in &mut slots {
            slot.recipes = self.get_slot_recipes(slot.id)?;
        }
        Ok(slots)
    }

    fn get_meal_slot(&self, slot_id: i64) -> Result<MealSlot> {
        let mut slot = self
            .conn
            .query_row(
                "SELECT id, weekly_plan_id, day_of_week, meal_type FROM meal_slots WHERE id = ?1",
                params![slot_id],
                |row| {
                    Ok(MealSlot {
                        id: row.get(0)?,
                        weekly_plan_id: row.get(1)?,
                        day_of_week: row.get(2)?,
                        meal_type: row.get(3)?,
                        recipes: Vec::new(),
                    })
                },
            )
            .context("Meal slot not found")?;
        slot.recipes = self.get_slot_recipes(slot_id)?;
        Ok(slot)
    }

    fn get_slot_recipes(&self, slot_id: i64) -> Result<Vec<MealSlotRecipe>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SLOT_RECIPE_QUERY} WHERE msr.meal_slot_id = ?1 ORDER BY msr.sort_order, msr.id"
        ))?;
        let recipes = stmt
            .query_map(params![slot_id], Self::slot_recipe_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    fn find_slot_id(&self, plan_id: i64, day_of_week: i64, meal_type: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM meal_slots
                 WHERE weekly_plan_id = ?1 AND day_of_week = ?2 AND meal_type = ?3",
                params![plan_id, day_of_week, meal_type],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn find_or_create_slot(&self, plan_id: i64, day_of_week: i64, meal_type: &str) -> Result<i64> {
        if let Some(id) = self.find_slot_id(plan_id, day_of_week, meal_type)? {
            return Ok(id);
        }
        self.conn.execute(
            "INSERT INTO meal_slots (weekly_plan_id, day_of_week, meal_type) VALUES (?1, ?2, ?3)",
            params![plan_id, day_of_week, meal_type],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Replace the recipes of a slot. An empty list removes the slot and returns `None`.
    pub fn set_meal_slot(
        &self,
        user_id: &str,
        plan_id: i64,
        day_of_week: i64,
        meal_type: &str,
        recipes: &[SlotRecipe],
    ) -> Result<Option<MealSlot>> {
        self.ensure_plan(user_id, plan_id)?;
        validate_day_of_week(day_of_week)?;
        let meal_type = validate_meal_type(meal_type)?;
        for entry in recipes {
            validate_slot_servings(entry.servings)?;
            self.ensure_recipe(user_id, entry.recipe_id)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let existing = self.find_slot_id(plan_id, day_of_week, &meal_type)?;
        if recipes.is_empty() {
            if let Some(slot_id) = existing {
                self.conn
                    .execute("DELETE FROM meal_slots WHERE id = ?1", params![slot_id])?;
            }
            tx.commit()?;
            return Ok(None);
        }

        let slot_id = match existing {
            Some(id) => {
                self.conn.execute(
                    "DELETE FROM meal_slot_recipes WHERE meal_slot_id = ?1",
                    params![id],
                )?;
                id
            }
            None => self.find_or_create_slot(plan_id, day_of_week, &meal_type)?,
        };
        for (sort_order, entry) in (0_i64..).zip(recipes) {
            self.conn.execute(
                "INSERT INTO meal_slot_recipes (meal_slot_id, recipe_id, servings, sort_order)
                 VALUES (?1, ?2, ?3, ?4)",
                params![slot_id, entry.recipe_id, entry.servings, sort_order],
            )?;
        }
        tx.commit()?;
        Ok(Some(self.get_meal_slot(slot_id)?))
    }

    /// Append a recipe after the slot's existing ones, creating the slot if needed.
    pub fn add_recipe_to_slot(
        &self,
        user_id: &str,
        plan_id: i64,
        day_of_week: i64,
        meal_type: &str,
        entry: &SlotRecipe,
    ) -> Result<MealSlotRecipe> {
        self.ensure_plan(user_id, plan_id)?;
        validate_day_of_week(day_of_week)?;
        let meal_type = validate_meal_type(meal_type)?;
        validate_slot_servings(entry.servings)?;
        self.ensure_recipe(user_id, entry.recipe_id)?;

        let tx = self.conn.unchecked_transaction()?;
        let slot_id = self.find_or_create_slot(plan_id, day_of_week, &meal_type)?;
        let next_order: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM meal_slot_recipes WHERE meal_slot_id = ?1",
            params![slot_id],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO meal_slot_recipes (meal_slot_id, recipe_id, servings, sort_order)
             VALUES (?1, ?2, ?3, ?4)",
            params![slot_id, entry.recipe_id, entry.servings, next_order],
        )?;
        let id = self.conn.last_insert_rowid();
        tx.commit()?;
        self.get_slot_recipe(id)
    }

    fn get_slot_recipe(&self, id: i64) -> Result<MealSlotRecipe> {
        self.conn
            .query_row(
                &format!("{SLOT_RECIPE_QUERY} WHERE msr.id = ?1"),
                params![id],
                Self::slot_recipe_from_row,
            )
            .context("Meal slot recipe not found")
    }

    /// Remove one recipe from its slot; the slot goes too once it is empty.
    pub fn remove_recipe_from_slot(&self, user_id: &str, slot_recipe_id: i64) -> Result<bool> {
        let slot_id: Option<i64> = self
            .conn
            .query_row(
                "SELECT msr.meal_slot_id FROM meal_slot_recipes msr
                 JOIN meal_slots ms ON msr.meal_slot_id = ms.id
                 JOIN weekly_plans wp ON ms.weekly_plan_id = wp.id
                 WHERE msr.id = ?1 AND wp.user_id = ?2",
                params![slot_recipe_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(slot_id) = slot_id else {
            return Ok(false);
        };

        let tx = self.conn.unchecked_transaction()?;
        self.conn.execute(
            "DELETE FROM meal_slot_recipes WHERE id = ?1",
            params![slot_recipe_id],
        )?;
        let remaining: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM meal_slot_recipes WHERE meal_slot_id = ?1",
            params![slot_id],
            |row| row.get(0),
        )?;
        if remaining == 0 {
            self.conn
                .execute("DELETE FROM meal_slots WHERE id = ?1", params![slot_id])?;
        }
        tx.commit()?;
        Ok(true)
    }

    pub fn update_slot_recipe_servings(
        &self,
        user_id: &str,
        slot_recipe_id: i64,
        servings: f64,
    ) -> Result<bool> {
        validate_slot_servings(servings)?;
        let rows = self.conn.execute(
            "UPDATE meal_slot_recipes SET servings = ?1
             WHERE id = ?2 AND meal_slot_id IN (
                SELECT ms.id FROM meal_slots ms
                JOIN weekly_plans wp ON ms.weekly_plan_id = wp.id
                WHERE wp.user_id = ?3
             )",
            params![servings, slot_recipe_id, user_id],
        )?;
        Ok(rows > 0)
    }

    pub fn remove_meal_slot(&self, user_id: &str, slot_id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM meal_slots WHERE id = ?1 AND weekly_plan_id IN (
                SELECT id FROM weekly_plans WHERE user_id = ?2
            )",
            params![slot_id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// Remove every slot of the plan. Custom shopping items are kept.
    pub fn clear_all_meals(&self, user_id: &str, plan_id: i64) -> Result<usize> {
        self.ensure_plan(user_id, plan_id)?;
        let rows = self.conn.execute(
            "DELETE FROM meal_slots WHERE weekly_plan_id = ?1",
            params![plan_id],
        )?;
        Ok(rows)
    }

    // --- Shopping list ---

    /// Aggregate the plan's scheduled recipes from one consistent read.
    pub fn build_shopping_list(
        &self,
        user_id: &str,
        plan_id: i64,
        system: MeasurementSystem,
        order: SortOrder,
    ) -> Result<ShoppingList> {
        let tx = self.conn.unchecked_transaction()?;
        let plan = self.get_weekly_plan(user_id, plan_id)?;

        let mut recipes: HashMap<i64, Recipe> = HashMap::new();
        for entry in plan.slots.iter().flat_map(|s| &s.recipes) {
            if let Entry::Vacant(vacant) = recipes.entry(entry.recipe_id) {
                vacant.insert(self.get_recipe(user_id, entry.recipe_id)?);
            }
        }
        let scheduled: Vec<ScheduledRecipe<'_>> = plan
            .slots
            .iter()
            .flat_map(|s| &s.recipes)
            .filter_map(|entry| {
                recipes.get(&entry.recipe_id).map(|recipe| ScheduledRecipe {
                    recipe,
                    servings: entry.servings,
                })
            })
            .collect();

        let items = aggregate(&scheduled, system, order);
        let custom_items = self.list_custom_items(user_id, plan_id)?;
        tx.commit()?;

        tracing::debug!(
            plan_id,
            scheduled = scheduled.len(),
            items = items.len(),
            "built shopping list"
        );
        Ok(ShoppingList {
            weekly_plan_id: plan.id,
            week_start_date: plan.week_start_date,
            measurement_system: system,
            items,
            custom_items,
        })
    }

    // --- Custom shopping items ---

    fn get_custom_item(&self, id: i64) -> Result<CustomShoppingItem> {
        self.conn
            .query_row(
                &format!("SELECT {CUSTOM_ITEM_COLUMNS} FROM custom_shopping_items WHERE id = ?1"),
                params![id],
                Self::custom_item_from_row,
            )
            .context("Shopping item not found")
    }

    pub fn add_custom_item(
        &self,
        user_id: &str,
        plan_id: i64,
        item: &NewFreeformItem,
    ) -> Result<CustomShoppingItem> {
        self.ensure_plan(user_id, plan_id)?;
        validate_freeform_item(item)?;
        self.conn.execute(
            "INSERT INTO custom_shopping_items (weekly_plan_id, name, quantity, unit, is_checked, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                plan_id,
                item.name.trim(),
                item.quantity,
                trimmed(item.unit.as_deref()),
                now()
            ],
        )?;
        self.get_custom_item(self.conn.last_insert_rowid())
    }

    pub fn list_custom_items(&self, user_id: &str, plan_id: i64) -> Result<Vec<CustomShoppingItem>> {
        self.ensure_plan(user_id, plan_id)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CUSTOM_ITEM_COLUMNS} FROM custom_shopping_items
             WHERE weekly_plan_id = ?1 ORDER BY name COLLATE NOCASE, id"
        ))?;
        let items = stmt
            .query_map(params![plan_id], Self::custom_item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn set_custom_item_checked(&self, user_id: &str, id: i64, checked: bool) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE custom_shopping_items SET is_checked = ?1
             WHERE id = ?2 AND weekly_plan_id IN (SELECT id FROM weekly_plans WHERE user_id = ?3)",
            params![checked, id, user_id],
        )?;
        Ok(rows > 0)
    }

    pub fn remove_custom_item(&self, user_id: &str, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM custom_shopping_items
             WHERE id = ?1 AND weekly_plan_id IN (SELECT id FROM weekly_plans WHERE user_id = ?2)",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }

    pub fn clear_custom_items(&self, user_id: &str, plan_id: i64) -> Result<usize> {
        self.ensure_plan(user_id, plan_id)?;
        let rows = self.conn.execute(
            "DELETE FROM custom_shopping_items WHERE weekly_plan_id = ?1",
            params![plan_id],
        )?;
        Ok(rows)
    }

    /// Copy saved items into the plan. Ids that are not the user's saved items are skipped.
    pub fn add_custom_items_from_saved(
        &self,
        user_id: &str,
        plan_id: i64,
        saved_ids: &[i64],
    ) -> Result<Vec<CustomShoppingItem>> {
        if saved_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_plan(user_id, plan_id)?;

        let tx = self.conn.unchecked_transaction()?;
        let created_at = now();
        let mut inserted = Vec::new();
        for saved_id in saved_ids {
            let rows = self.conn.execute(
                "INSERT INTO custom_shopping_items (weekly_plan_id, name, quantity, unit, is_checked, created_at)
                 SELECT ?1, name, quantity, unit, 0, ?2
                 FROM saved_shopping_items WHERE id = ?3 AND user_id = ?4",
                params![plan_id, created_at, saved_id, user_id],
            )?;
            if rows > 0 {
                inserted.push(self.conn.last_insert_rowid());
            }
        }
        tx.commit()?;

        inserted.into_iter().map(|id| self.get_custom_item(id)).collect()
    }

    // --- Saved items ---

    pub fn create_saved_item(&self, user_id: &str, item: &NewFreeformItem) -> Result<SavedItem> {
        validate_freeform_item(item)?;
        self.conn.execute(
            "INSERT INTO saved_shopping_items (user_id, name, quantity, unit, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                item.name.trim(),
                item.quantity,
                trimmed(item.unit.as_deref()),
                now()
            ],
        )?;
        self.get_saved_item(user_id, self.conn.last_insert_rowid())
    }

    pub fn get_saved_item(&self, user_id: &str, id: i64) -> Result<SavedItem> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {SAVED_ITEM_COLUMNS} FROM saved_shopping_items
                     WHERE id = ?1 AND user_id = ?2"
                ),
                params![id, user_id],
                Self::saved_item_from_row,
            )
            .context("Saved item not found")
    }

    pub fn list_saved_items(&self, user_id: &str) -> Result<Vec<SavedItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SAVED_ITEM_COLUMNS} FROM saved_shopping_items
             WHERE user_id = ?1 ORDER BY name COLLATE NOCASE, id"
        ))?;
        let items = stmt
            .query_map(params![user_id], Self::saved_item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn update_saved_item(
        &self,
        user_id: &str,
        id: i64,
        item: &NewFreeformItem,
    ) -> Result<SavedItem> {
        validate_freeform_item(item)?;
        let rows = self.conn.execute(
            "UPDATE saved_shopping_items SET name = ?1, quantity = ?2, unit = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![
                item.name.trim(),
                item.quantity,
                trimmed(item.unit.as_deref()),
                id,
                user_id
            ],
        )?;
        if rows == 0 {
            bail!("Saved item not found");
        }
        self.get_saved_item(user_id, id)
    }

    pub fn delete_saved_item(&self, user_id: &str, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM saved_shopping_items WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }

    // --- Preferences ---

    pub fn get_setting(&self, user_id: &str, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM user_settings WHERE user_id = ?1 AND key = ?2",
                params![user_id, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, user_id: &str, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO user_settings (user_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![user_id, key, value, now()],
        )?;
        Ok(())
    }

    pub fn get_measurement_system(&self, user_id: &str) -> Result<MeasurementSystem> {
        let Some(value) = self.get_setting(user_id, MEASUREMENT_SYSTEM_KEY)? else {
            return Ok(MeasurementSystem::default());
        };
        Ok(value.parse().unwrap_or_else(|_| {
            tracing::warn!(user_id, value = %value, "invalid stored measurement system, using default");
            MeasurementSystem::default()
        }))
    }

    pub fn set_measurement_system(&self, user_id: &str, system: MeasurementSystem) -> Result<()> {
        self.set_setting(user_id, MEASUREMENT_SYSTEM_KEY, system.as_str())
    }
}
