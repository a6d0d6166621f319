use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use mealplan_core::db::Database;
use mealplan_core::display::{round_quantity, select_display_unit};
use mealplan_core::models::{
    CustomShoppingItem, MealSlotRecipe, NewFreeformItem, NewIngredient, NewProduct, NewRecipe,
    Product, Recipe, RecipeIngredient, SavedItem, SlotRecipe, UpdateRecipe, WeeklyPlan, parse_day,
    validate_freeform_item, validate_ingredient, validate_meal_type, validate_new_recipe,
    validate_product, validate_recipe_servings, validate_slot_servings,
};
use mealplan_core::shopping::SortOrder;
use mealplan_core::units::{
    BaseUnit, MeasurementSystem, UnitDefinition, validate_custom_unit,
};

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Database>>,
    api_key: Option<String>,
    /// All requests act on behalf of this user.
    user_id: String,
}

impl AppState {
    fn db(&self) -> MutexGuard<'_, Database> {
        self.db
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct CreateUnitRequest {
    symbol: String,
    name: Option<String>,
    abbreviation: Option<String>,
    base_unit: BaseUnit,
    conversion_factor: f64,
}

#[derive(Deserialize)]
struct ConvertQuery {
    quantity: f64,
    unit: String,
    to: Option<String>,
    system: Option<MeasurementSystem>,
}

#[derive(Serialize)]
struct ConvertResponse {
    quantity: f64,
    unit: String,
    base_quantity: f64,
    base_unit: BaseUnit,
    result_quantity: f64,
    result_unit: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

#[derive(Deserialize)]
struct UpdateIngredientRequest {
    quantity: f64,
    unit: String,
}

#[derive(Deserialize)]
struct PlanQuery {
    date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct SetSlotRequest {
    recipes: Vec<SlotRecipe>,
}

#[derive(Deserialize)]
struct ServingsRequest {
    servings: f64,
}

#[derive(Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum ListFormat {
    #[default]
    Json,
    Text,
    Csv,
}

#[derive(Deserialize)]
struct ShoppingListQuery {
    system: Option<MeasurementSystem>,
    #[serde(default)]
    order: SortOrder,
    #[serde(default)]
    format: ListFormat,
}

#[derive(Deserialize)]
struct CheckRequest {
    is_checked: bool,
}

#[derive(Deserialize)]
struct FromSavedRequest {
    saved_ids: Vec<i64>,
}

#[derive(Serialize, Deserialize)]
struct Preferences {
    measurement_system: MeasurementSystem,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl ApiError {
    /// A failed lookup of the addressed resource is a 404; anything else is internal.
    fn from_lookup(err: anyhow::Error) -> Self {
        let message = err.to_string();
        if message.contains("not found") {
            Self::NotFound(message)
        } else {
            Self::Internal(err)
        }
    }

    /// A record referenced from the request body that does not exist is a 400.
    fn from_reference(err: anyhow::Error) -> Self {
        let message = err.to_string();
        if message.contains("not found") {
            Self::BadRequest(message)
        } else {
            Self::Internal(err)
        }
    }
}

fn bad_request(err: anyhow::Error) -> ApiError {
    ApiError::BadRequest(format!("{err:#}"))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

// --- Middleware ---

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(ref expected_key) = state.api_key {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected_key);

        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid or missing API key".to_string(),
                }),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Unit Handlers ---

async fn list_units(State(state): State<AppState>) -> Result<Json<Vec<UnitDefinition>>, ApiError> {
    let table = state.db().unit_table(&state.user_id)?;
    Ok(Json(table.list().into_iter().cloned().collect()))
}

async fn create_unit(
    State(state): State<AppState>,
    Json(req): Json<CreateUnitRequest>,
) -> Result<(StatusCode, Json<UnitDefinition>), ApiError> {
    let mut unit = UnitDefinition::custom(
        &req.symbol,
        req.name.as_deref().unwrap_or(&req.symbol),
        req.base_unit,
        req.conversion_factor,
    );
    if let Some(abbreviation) = req.abbreviation.filter(|a| !a.trim().is_empty()) {
        unit.abbreviation = abbreviation.trim().to_string().into();
    }
    validate_custom_unit(&unit).map_err(bad_request)?;

    let unit = state.db().add_custom_unit(&state.user_id, &unit)?;
    Ok((StatusCode::CREATED, Json(unit)))
}

async fn delete_unit(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.db().delete_custom_unit(&state.user_id, &symbol)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Custom unit '{symbol}' not found")))
    }
}

async fn convert_unit(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let db = state.db();
    let table = db.unit_table(&state.user_id)?;
    let base = table.to_base(query.quantity, &query.unit);
    let warnings = table.conversion_warnings(&query.unit, query.to.as_deref());

    let (result_quantity, result_unit) = if let Some(target) = &query.to {
        let result_unit = match table.lookup(target) {
            Some(def) if def.base_unit == base.base_unit => def.abbreviation.to_string(),
            _ => base.base_unit.to_string(),
        };
        (table.from_base(base.base_quantity, base.base_unit, target), result_unit)
    } else {
        let system = match query.system {
            Some(system) => system,
            None => db.get_measurement_system(&state.user_id)?,
        };
        let display = select_display_unit(base.base_quantity, base.base_unit, system);
        (display.display_quantity, display.display_unit.to_string())
    };

    Ok(Json(ConvertResponse {
        quantity: query.quantity,
        unit: query.unit,
        base_quantity: base.base_quantity,
        base_unit: base.base_unit,
        result_quantity: round_quantity(result_quantity),
        result_unit,
        warnings,
    }))
}

// --- Product Handlers ---

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .db()
        .list_products(&state.user_id, query.search.as_deref())?;
    Ok(Json(products))
}

async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    validate_product(&req).map_err(bad_request)?;
    let product = state.db().insert_product(Some(&state.user_id), &req)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .db()
        .get_product(&state.user_id, id)
        .map_err(|_| ApiError::NotFound(format!("Product {id} not found")))?;
    Ok(Json(product))
}

// --- Recipe Handlers ---

async fn create_recipe(
    State(state): State<AppState>,
    Json(req): Json<NewRecipe>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    validate_new_recipe(&req).map_err(bad_request)?;
    let recipe = state
        .db()
        .create_recipe(&state.user_id, &req)
        .map_err(ApiError::from_reference)?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.db().list_recipes(&state.user_id)?;
    Ok(Json(recipes))
}

async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Recipe>, ApiError> {
    let recipe = state
        .db()
        .get_recipe(&state.user_id, id)
        .map_err(|_| ApiError::NotFound(format!("Recipe {id} not found")))?;
    Ok(Json(recipe))
}

async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRecipe>,
) -> Result<Json<Recipe>, ApiError> {
    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest(
            "Recipe name must not be empty".to_string(),
        ));
    }
    if let Some(servings) = req.servings {
        validate_recipe_servings(servings).map_err(bad_request)?;
    }
    for ingredient in req.ingredients.iter().flatten() {
        validate_ingredient(ingredient).map_err(bad_request)?;
    }

    let db = state.db();
    db.get_recipe(&state.user_id, id)
        .map_err(|_| ApiError::NotFound(format!("Recipe {id} not found")))?;
    let recipe = db
        .update_recipe(&state.user_id, id, &req)
        .map_err(ApiError::from_reference)?;
    Ok(Json(recipe))
}

async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db().delete_recipe(&state.user_id, id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Recipe {id} not found")))
    }
}

async fn add_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewIngredient>,
) -> Result<(StatusCode, Json<RecipeIngredient>), ApiError> {
    validate_ingredient(&req).map_err(bad_request)?;
    let db = state.db();
    db.get_recipe(&state.user_id, id)
        .map_err(|_| ApiError::NotFound(format!("Recipe {id} not found")))?;
    let ingredient = db
        .add_recipe_ingredient(&state.user_id, id, &req)
        .map_err(ApiError::from_reference)?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

/// The ingredient must belong to the recipe in the path.
fn ensure_recipe_line(db: &Database, user_id: &str, recipe_id: i64, line_id: i64) -> Result<(), ApiError> {
    let recipe = db
        .get_recipe(user_id, recipe_id)
        .map_err(|_| ApiError::NotFound(format!("Recipe {recipe_id} not found")))?;
    if recipe.ingredients.iter().any(|i| i.id == line_id) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("Ingredient {line_id} not found")))
    }
}

async fn update_ingredient(
    State(state): State<AppState>,
    Path((recipe_id, line_id)): Path<(i64, i64)>,
    Json(req): Json<UpdateIngredientRequest>,
) -> Result<Json<RecipeIngredient>, ApiError> {
    if !req.quantity.is_finite() || req.quantity <= 0.0 {
        return Err(ApiError::BadRequest(
            "Ingredient quantity must be greater than 0".to_string(),
        ));
    }
    if req.unit.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Ingredient unit must not be empty".to_string(),
        ));
    }

    let db = state.db();
    ensure_recipe_line(&db, &state.user_id, recipe_id, line_id)?;
    let ingredient = db
        .update_recipe_ingredient(&state.user_id, line_id, req.quantity, &req.unit)
        .map_err(ApiError::from_lookup)?;
    Ok(Json(ingredient))
}

async fn delete_ingredient(
    State(state): State<AppState>,
    Path((recipe_id, line_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let db = state.db();
    ensure_recipe_line(&db, &state.user_id, recipe_id, line_id)?;
    db.delete_recipe_ingredient(&state.user_id, line_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Plan Handlers ---

async fn current_plan(
    State(state): State<AppState>,
    Query(query): Query<PlanQuery>,
) -> Result<Json<WeeklyPlan>, ApiError> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let plan = state.db().get_or_create_weekly_plan(&state.user_id, date)?;
    Ok(Json(plan))
}

async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WeeklyPlan>, ApiError> {
    let plan = state
        .db()
        .get_weekly_plan(&state.user_id, id)
        .map_err(|_| ApiError::NotFound(format!("Weekly plan {id} not found")))?;
    Ok(Json(plan))
}

async fn clear_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = state
        .db()
        .clear_all_meals(&state.user_id, id)
        .map_err(ApiError::from_lookup)?;
    Ok(Json(serde_json::json!({ "removed_slots": removed })))
}

fn slot_address(day: &str, meal: &str) -> Result<(i64, String), ApiError> {
    let day_of_week = parse_day(day).map_err(bad_request)?;
    let meal_type = validate_meal_type(meal).map_err(bad_request)?;
    Ok((day_of_week, meal_type))
}

async fn set_slot(
    State(state): State<AppState>,
    Path((plan_id, day, meal)): Path<(i64, String, String)>,
    Json(req): Json<SetSlotRequest>,
) -> Result<Response, ApiError> {
    let (day_of_week, meal_type) = slot_address(&day, &meal)?;
    for entry in &req.recipes {
        validate_slot_servings(entry.servings).map_err(bad_request)?;
    }

    let db = state.db();
    db.get_weekly_plan(&state.user_id, plan_id)
        .map_err(|_| ApiError::NotFound(format!("Weekly plan {plan_id} not found")))?;
    let slot = db
        .set_meal_slot(&state.user_id, plan_id, day_of_week, &meal_type, &req.recipes)
        .map_err(ApiError::from_reference)?;

    Ok(match slot {
        Some(slot) => Json(slot).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn add_to_slot(
    State(state): State<AppState>,
    Path((plan_id, day, meal)): Path<(i64, String, String)>,
    Json(req): Json<SlotRecipe>,
) -> Result<(StatusCode, Json<MealSlotRecipe>), ApiError> {
    let (day_of_week, meal_type) = slot_address(&day, &meal)?;
    validate_slot_servings(req.servings).map_err(bad_request)?;

    let db = state.db();
    db.get_weekly_plan(&state.user_id, plan_id)
        .map_err(|_| ApiError::NotFound(format!("Weekly plan {plan_id} not found")))?;
    let entry = db
        .add_recipe_to_slot(&state.user_id, plan_id, day_of_week, &meal_type, &req)
        .map_err(ApiError::from_reference)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn delete_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db().remove_meal_slot(&state.user_id, id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Meal slot {id} not found")))
    }
}

async fn update_slot_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ServingsRequest>,
) -> Result<StatusCode, ApiError> {
    validate_slot_servings(req.servings).map_err(bad_request)?;
    if state
        .db()
        .update_slot_recipe_servings(&state.user_id, id, req.servings)?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Meal slot recipe {id} not found")))
    }
}

async fn delete_slot_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db().remove_recipe_from_slot(&state.user_id, id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Meal slot recipe {id} not found")))
    }
}

// --- Shopping list Handlers ---

async fn shopping_list(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ShoppingListQuery>,
) -> Result<Response, ApiError> {
    let db = state.db();
    let system = match query.system {
        Some(system) => system,
        None => db.get_measurement_system(&state.user_id)?,
    };
    let list = db
        .build_shopping_list(&state.user_id, id, system, query.order)
        .map_err(ApiError::from_lookup)?;

    Ok(match query.format {
        ListFormat::Json => Json(list).into_response(),
        ListFormat::Text => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            list.to_share_text(),
        )
            .into_response(),
        ListFormat::Csv => {
            let mut buf = Vec::new();
            list.write_csv(&mut buf)?;
            ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], buf).into_response()
        }
    })
}

async fn list_custom_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CustomShoppingItem>>, ApiError> {
    let items = state
        .db()
        .list_custom_items(&state.user_id, id)
        .map_err(ApiError::from_lookup)?;
    Ok(Json(items))
}

async fn create_custom_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewFreeformItem>,
) -> Result<(StatusCode, Json<CustomShoppingItem>), ApiError> {
    validate_freeform_item(&req).map_err(bad_request)?;
    let item = state
        .db()
        .add_custom_item(&state.user_id, id, &req)
        .map_err(ApiError::from_lookup)?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn clear_custom_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = state
        .db()
        .clear_custom_items(&state.user_id, id)
        .map_err(ApiError::from_lookup)?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

async fn add_from_saved(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<FromSavedRequest>,
) -> Result<(StatusCode, Json<Vec<CustomShoppingItem>>), ApiError> {
    let items = state
        .db()
        .add_custom_items_from_saved(&state.user_id, id, &req.saved_ids)
        .map_err(ApiError::from_lookup)?;
    Ok((StatusCode::CREATED, Json(items)))
}

async fn check_custom_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CheckRequest>,
) -> Result<StatusCode, ApiError> {
    if state
        .db()
        .set_custom_item_checked(&state.user_id, id, req.is_checked)?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Shopping item {id} not found")))
    }
}

async fn delete_custom_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db().remove_custom_item(&state.user_id, id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Shopping item {id} not found")))
    }
}

// --- Saved item Handlers ---

async fn list_saved_items(State(state): State<AppState>) -> Result<Json<Vec<SavedItem>>, ApiError> {
    let items = state.db().list_saved_items(&state.user_id)?;
    Ok(Json(items))
}

async fn create_saved_item(
    State(state): State<AppState>,
    Json(req): Json<NewFreeformItem>,
) -> Result<(StatusCode, Json<SavedItem>), ApiError> {
    validate_freeform_item(&req).map_err(bad_request)?;
    let item = state.db().create_saved_item(&state.user_id, &req)?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_saved_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SavedItem>, ApiError> {
    let item = state
        .db()
        .get_saved_item(&state.user_id, id)
        .map_err(|_| ApiError::NotFound(format!("Saved item {id} not found")))?;
    Ok(Json(item))
}

async fn update_saved_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewFreeformItem>,
) -> Result<Json<SavedItem>, ApiError> {
    validate_freeform_item(&req).map_err(bad_request)?;
    let item = state
        .db()
        .update_saved_item(&state.user_id, id, &req)
        .map_err(ApiError::from_lookup)?;
    Ok(Json(item))
}

async fn delete_saved_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db().delete_saved_item(&state.user_id, id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Saved item {id} not found")))
    }
}

// --- Preferences ---

async fn get_preferences(State(state): State<AppState>) -> Result<Json<Preferences>, ApiError> {
    let measurement_system = state.db().get_measurement_system(&state.user_id)?;
    Ok(Json(Preferences { measurement_system }))
}

async fn update_preferences(
    State(state): State<AppState>,
    Json(req): Json<Preferences>,
) -> Result<Json<Preferences>, ApiError> {
    state
        .db()
        .set_measurement_system(&state.user_id, req.measurement_system)?;
    Ok(Json(req))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/units", get(list_units).post(create_unit))
        .route("/api/units/convert", get(convert_unit))
        .route("/api/units/{symbol}", delete(delete_unit))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{id}", get(get_product))
        .route("/api/recipes", post(create_recipe).get(list_recipes))
        .route(
            "/api/recipes/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/api/recipes/{id}/ingredients", post(add_ingredient))
        .route(
            "/api/recipes/{id}/ingredients/{ingredient_id}",
            put(update_ingredient).delete(delete_ingredient),
        )
        .route("/api/plans/current", get(current_plan))
        .route("/api/plans/{id}", get(get_plan))
        .route("/api/plans/{id}/meals", delete(clear_plan))
        .route("/api/plans/{id}/slots/{day}/{meal}", put(set_slot))
        .route("/api/plans/{id}/slots/{day}/{meal}/recipes", post(add_to_slot))
        .route("/api/slots/{id}", delete(delete_slot))
        .route(
            "/api/slot-recipes/{id}",
            put(update_slot_recipe).delete(delete_slot_recipe),
        )
        .route("/api/plans/{id}/shopping-list", get(shopping_list))
        .route(
            "/api/plans/{id}/items",
            get(list_custom_items)
                .post(create_custom_item)
                .delete(clear_custom_items),
        )
        .route("/api/plans/{id}/items/from-saved", post(add_from_saved))
        .route(
            "/api/items/{id}",
            put(check_custom_item).delete(delete_custom_item),
        )
        .route(
            "/api/saved-items",
            get(list_saved_items).post(create_saved_item),
        )
        .route(
            "/api/saved-items/{id}",
            get(get_saved_item)
                .put(update_saved_item)
                .delete(delete_saved_item),
        )
        .route(
            "/api/preferences",
            get(get_preferences).put(update_preferences),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(
    db: Database,
    port: u16,
    bind: &str,
    api_key: Option<String>,
    new_api_key: bool,
    user_id: String,
) -> anyhow::Result<()> {
    let state = AppState {
        db: Arc::new(Mutex::new(db)),
        api_key: api_key.clone(),
        user_id,
    };

    let app = build_router(state);

    match api_key {
        Some(ref key) if new_api_key => {
            eprintln!("Generated new API key: {key}");
            eprintln!("Include in requests: Authorization: Bearer {key}");
        }
        Some(ref key) => {
            eprintln!(
                "API key: {}...{} (see api_key file in data directory)",
                &key[..4],
                &key[key.len() - 4..],
            );
        }
        None => {
            tracing::warn!("authentication disabled (--no-auth), the API is open to anyone");
        }
    }

    if bind != "127.0.0.1" && bind != "localhost" && api_key.is_none() {
        tracing::warn!(
            bind,
            "listening with no authentication, any device on your network can access this API"
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    tracing::info!("listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const USER: &str = "local";

    fn test_state(api_key: Option<String>) -> AppState {
        AppState {
            db: Arc::new(Mutex::new(Database::open_in_memory().unwrap())),
            api_key,
            user_id: USER.to_string(),
        }
    }

    fn test_app(api_key: Option<String>) -> Router {
        build_router(test_state(api_key))
    }

    fn product_id(state: &AppState, name: &str) -> i64 {
        state
            .db()
            .find_product_by_name(USER, name)
            .unwrap()
            .unwrap()
            .id
    }

    fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: axum::http::Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    /// A two-serving pasta recipe: 200 g pasta and 2 tbsp olive oil.
    async fn create_pasta(app: &Router, state: &AppState) -> i64 {
        let body = serde_json::json!({
            "name": "Pasta al olio",
            "servings": 2,
            "ingredients": [
                { "product_id": product_id(state, "Pasta"), "quantity": 200.0, "unit": "g" },
                { "product_id": product_id(state, "Olive Oil"), "quantity": 2.0, "unit": "tbsp" }
            ]
        });
        let (status, json) = send(app, json_request("POST", "/api/recipes", &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        json["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn auth_missing_key_returns_401() {
        let app = test_app(Some("test-key-abc123".to_string()));

        let response = app
            .oneshot(
                axum::http::Request::get("/api/recipes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Invalid or missing API key");
    }

    #[tokio::test]
    async fn auth_wrong_key_returns_401() {
        let app = test_app(Some("test-key-abc123".to_string()));

        let response = app
            .oneshot(
                axum::http::Request::get("/api/recipes")
                    .header("Authorization", "Bearer wrong-key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn auth_correct_key_succeeds() {
        let app = test_app(Some("test-key-abc123".to_string()));

        let response = app
            .oneshot(
                axum::http::Request::get("/api/recipes")
                    .header("Authorization", "Bearer test-key-abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn no_auth_mode_allows_requests() {
        let app = test_app(None);
        let (status, json) = send(&app, empty_request("GET", "/api/recipes")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn security_headers_present() {
        let app = test_app(None);

        let response = app
            .oneshot(
                axum::http::Request::get("/api/units")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
        assert_eq!(
            response.headers().get("content-security-policy").unwrap(),
            "default-src 'none'"
        );
    }

    #[tokio::test]
    async fn security_headers_on_auth_failure() {
        let app = test_app(Some("secret".to_string()));

        let response = app
            .oneshot(
                axum::http::Request::get("/api/units")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn body_size_limit_rejects_oversized() {
        let app = test_app(None);

        let big_body = vec![0u8; BODY_LIMIT + 1];
        let response = app
            .oneshot(
                axum::http::Request::post("/api/recipes")
                    .header("content-type", "application/json")
                    .body(Body::from(big_body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn internal_error_does_not_leak_details() {
        let error = ApiError::Internal(anyhow::anyhow!("secret database path /home/user/mealplan.db"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
        assert!(!json["error"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn units_list_includes_custom_overrides() {
        let app = test_app(None);
        let body = serde_json::json!({
            "symbol": "clove",
            "base_unit": "g",
            "conversion_factor": 5.0
        });
        let (status, json) = send(&app, json_request("POST", "/api/units", &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["abbreviation"], "clove");

        let (_, json) = send(&app, empty_request("GET", "/api/units")).await;
        let units = json.as_array().unwrap();
        assert_eq!(units[0]["symbol"], "clove");
        assert!(units.iter().any(|u| u["symbol"] == "kg"));

        let (status, _) = send(&app, empty_request("DELETE", "/api/units/clove")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, empty_request("DELETE", "/api/units/clove")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_custom_unit_returns_400() {
        let app = test_app(None);
        let body = serde_json::json!({
            "symbol": "pinch",
            "base_unit": "g",
            "conversion_factor": 0.0
        });
        let (status, _) = send(&app, json_request("POST", "/api/units", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn convert_uses_display_policy_or_target() {
        let app = test_app(None);

        let (status, json) = send(
            &app,
            empty_request("GET", "/api/units/convert?quantity=2&unit=cup&system=metric"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["base_unit"], "ml");
        assert_eq!(json["result_unit"], "ml");
        assert!((json["result_quantity"].as_f64().unwrap() - 473.0).abs() < 1e-9);

        let (_, json) = send(
            &app,
            empty_request("GET", "/api/units/convert?quantity=1&unit=kg&to=lb"),
        )
        .await;
        assert_eq!(json["result_unit"], "lb");
        assert!((json["result_quantity"].as_f64().unwrap() - 2.2).abs() < 1e-9);
        assert!(json.get("warnings").is_none());
    }

    #[tokio::test]
    async fn convert_falls_back_instead_of_failing() {
        let app = test_app(None);

        let (status, json) = send(
            &app,
            empty_request("GET", "/api/units/convert?quantity=5&unit=fortnight"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["base_unit"], "unit");
        assert!((json["base_quantity"].as_f64().unwrap() - 5.0).abs() < 1e-9);
        assert!((json["result_quantity"].as_f64().unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(json["warnings"].as_array().unwrap().len(), 1);

        let (status, json) = send(
            &app,
            empty_request("GET", "/api/units/convert?quantity=500&unit=g&to=ml"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!((json["result_quantity"].as_f64().unwrap() - 500.0).abs() < 1e-9);
        assert_eq!(json["result_unit"], "g");
        let warning = json["warnings"][0].as_str().unwrap();
        assert!(warning.contains("cannot convert g"));

        let (status, json) = send(
            &app,
            empty_request("GET", "/api/units/convert?quantity=2&unit=kg&to=smidge"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!((json["result_quantity"].as_f64().unwrap() - 2000.0).abs() < 1e-9);
        assert_eq!(json["result_unit"], "g");
    }

    #[tokio::test]
    async fn products_search_and_create() {
        let app = test_app(None);

        let (status, json) = send(&app, empty_request("GET", "/api/products?search=basil")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().iter().any(|p| p["name"] == "Basil"));

        let body = serde_json::json!({ "name": "Gochujang", "category": "Condiments" });
        let (status, json) = send(&app, json_request("POST", "/api/products", &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["default_unit"], "unit");
        assert_eq!(json["user_id"], USER);

        let body = serde_json::json!({ "name": "  " });
        let (status, _) = send(&app, json_request("POST", "/api/products", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn recipe_crud() {
        let state = test_state(None);
        let app = build_router(state.clone());
        let id = create_pasta(&app, &state).await;

        let (status, json) = send(&app, empty_request("GET", &format!("/api/recipes/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        let ingredients = json["ingredients"].as_array().unwrap();
        assert_eq!(ingredients.len(), 2);
        let oil = ingredients.iter().find(|i| i["unit"] == "tbsp").unwrap();
        assert_eq!(oil["base_unit"], "ml");
        assert!((oil["base_quantity"].as_f64().unwrap() - 29.58).abs() < 1e-9);

        let body = serde_json::json!({ "servings": 4, "description": "Weeknight staple" });
        let (status, json) =
            send(&app, json_request("PUT", &format!("/api/recipes/{id}"), &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["servings"], 4);
        assert_eq!(json["description"], "Weeknight staple");

        let (status, _) = send(&app, empty_request("DELETE", &format!("/api/recipes/{id}"))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, empty_request("GET", &format!("/api/recipes/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn recipe_validation_returns_400() {
        let state = test_state(None);
        let app = build_router(state.clone());

        let body = serde_json::json!({ "name": "Nothing", "servings": 0 });
        let (status, _) = send(&app, json_request("POST", "/api/recipes", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = serde_json::json!({
            "name": "Ghost",
            "ingredients": [{ "product_id": 999_999, "quantity": 1.0, "unit": "g" }]
        });
        let (status, json) = send(&app, json_request("POST", "/api/recipes", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn ingredient_update_recomputes_base_quantity() {
        let state = test_state(None);
        let app = build_router(state.clone());
        let id = create_pasta(&app, &state).await;

        let (_, recipe) = send(&app, empty_request("GET", &format!("/api/recipes/{id}"))).await;
        let pasta_line = recipe["ingredients"]
            .as_array()
            .unwrap()
            .iter()
            .find(|i| i["unit"] == "g")
            .unwrap()["id"]
            .as_i64()
            .unwrap();

        let body = serde_json::json!({ "quantity": 1.0, "unit": "lb" });
        let (status, json) = send(
            &app,
            json_request("PUT", &format!("/api/recipes/{id}/ingredients/{pasta_line}"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["base_unit"], "g");
        assert!((json["base_quantity"].as_f64().unwrap() - 453.59).abs() < 1e-9);

        let (status, _) = send(
            &app,
            empty_request("DELETE", &format!("/api/recipes/{id}/ingredients/{pasta_line}")),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(
            &app,
            empty_request("DELETE", &format!("/api/recipes/{id}/ingredients/{pasta_line}")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn plan_to_shopping_list() {
        let state = test_state(None);
        let app = build_router(state.clone());
        let recipe_id = create_pasta(&app, &state).await;

        let (status, plan) =
            send(&app, empty_request("GET", "/api/plans/current?date=2026-10-15")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plan["week_start_date"], "2026-10-12");
        let plan_id = plan["id"].as_i64().unwrap();

        let body = serde_json::json!({ "recipes": [{ "recipe_id": recipe_id, "servings": 4.0 }] });
        let (status, slot) = send(
            &app,
            json_request("PUT", &format!("/api/plans/{plan_id}/slots/monday/dinner"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(slot["day_of_week"], 0);

        let body = serde_json::json!({ "recipe_id": recipe_id, "servings": 1.0 });
        let (status, _) = send(
            &app,
            json_request("POST", &format!("/api/plans/{plan_id}/slots/tue/lunch/recipes"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // 4 + 1 servings of a two-serving recipe: 500 g pasta, 5 tbsp oil.
        let (status, list) = send(
            &app,
            empty_request("GET", &format!("/api/plans/{plan_id}/shopping-list?system=metric")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let items = list["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        let pasta = items.iter().find(|i| i["product_name"] == "Pasta").unwrap();
        assert!((pasta["total_base_quantity"].as_f64().unwrap() - 500.0).abs() < 1e-9);
        assert_eq!(pasta["display_unit"], "g");
        let oil = items.iter().find(|i| i["product_name"] == "Olive Oil").unwrap();
        assert!((oil["total_base_quantity"].as_f64().unwrap() - 73.95).abs() < 1e-9);
        assert_eq!(oil["suggested_unit"], "tbsp");

        let (_, list) = send(
            &app,
            empty_request(
                "GET",
                &format!("/api/plans/{plan_id}/shopping-list?system=imperial&order=category_then_name"),
            ),
        )
        .await;
        assert_eq!(list["measurement_system"], "imperial");
        let oil = list["items"]
            .as_array()
            .unwrap()
            .iter()
            .find(|i| i["product_name"] == "Olive Oil")
            .unwrap()
            .clone();
        assert_eq!(oil["display_unit"], "fl oz");
    }

    #[tokio::test]
    async fn shopping_list_text_format() {
        let state = test_state(None);
        let app = build_router(state.clone());
        let (_, plan) =
            send(&app, empty_request("GET", "/api/plans/current?date=2026-10-15")).await;
        let plan_id = plan["id"].as_i64().unwrap();

        let body = serde_json::json!({ "name": "Coffee beans" });
        send(&app, json_request("POST", &format!("/api/plans/{plan_id}/items"), &body)).await;

        let response = app
            .oneshot(empty_request(
                "GET",
                &format!("/api/plans/{plan_id}/shopping-list?format=text"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("Shopping list for week of 2026-10-12"));
        assert!(text.contains("• Coffee beans"));
    }

    #[tokio::test]
    async fn slot_validation_and_ownership() {
        let state = test_state(None);
        let app = build_router(state.clone());
        let recipe_id = create_pasta(&app, &state).await;
        let (_, plan) = send(&app, empty_request("GET", "/api/plans/current")).await;
        let plan_id = plan["id"].as_i64().unwrap();

        let body = serde_json::json!({ "recipe_id": recipe_id });
        let (status, _) = send(
            &app,
            json_request("POST", &format!("/api/plans/{plan_id}/slots/monday/brunch/recipes"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            json_request("POST", &format!("/api/plans/{plan_id}/slots/funday/dinner/recipes"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            json_request("POST", "/api/plans/999999/slots/monday/dinner/recipes", &body),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let other_plan = state
            .db()
            .get_or_create_weekly_plan("someone-else", Local::now().date_naive())
            .unwrap();
        let (status, _) = send(
            &app,
            empty_request("GET", &format!("/api/plans/{}", other_plan.id)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn slot_recipe_servings_and_removal() {
        let state = test_state(None);
        let app = build_router(state.clone());
        let recipe_id = create_pasta(&app, &state).await;
        let (_, plan) = send(&app, empty_request("GET", "/api/plans/current")).await;
        let plan_id = plan["id"].as_i64().unwrap();

        let body = serde_json::json!({ "recipe_id": recipe_id, "servings": 2.0 });
        let (_, entry) = send(
            &app,
            json_request("POST", &format!("/api/plans/{plan_id}/slots/3/breakfast/recipes"), &body),
        )
        .await;
        let entry_id = entry["id"].as_i64().unwrap();

        let body = serde_json::json!({ "servings": -1.0 });
        let (status, _) = send(
            &app,
            json_request("PUT", &format!("/api/slot-recipes/{entry_id}"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = serde_json::json!({ "servings": 6.0 });
        let (status, _) = send(
            &app,
            json_request("PUT", &format!("/api/slot-recipes/{entry_id}"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            &app,
            empty_request("DELETE", &format!("/api/slot-recipes/{entry_id}")),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, plan) = send(&app, empty_request("GET", &format!("/api/plans/{plan_id}"))).await;
        assert!(plan["slots"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn custom_and_saved_items() {
        let app = test_app(None);
        let (_, plan) = send(&app, empty_request("GET", "/api/plans/current")).await;
        let plan_id = plan["id"].as_i64().unwrap();

        let body = serde_json::json!({ "name": "Paper towels", "quantity": 2.0, "unit": "pack" });
        let (status, saved) = send(&app, json_request("POST", "/api/saved-items", &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let saved_id = saved["id"].as_i64().unwrap();

        let body = serde_json::json!({ "saved_ids": [saved_id, 999_999] });
        let (status, added) = send(
            &app,
            json_request("POST", &format!("/api/plans/{plan_id}/items/from-saved"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let added = added.as_array().unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0]["name"], "Paper towels");
        assert_eq!(added[0]["is_checked"], false);
        let item_id = added[0]["id"].as_i64().unwrap();

        let body = serde_json::json!({ "is_checked": true });
        let (status, _) =
            send(&app, json_request("PUT", &format!("/api/items/{item_id}"), &body)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, items) =
            send(&app, empty_request("GET", &format!("/api/plans/{plan_id}/items"))).await;
        assert_eq!(items[0]["is_checked"], true);

        let (status, json) =
            send(&app, empty_request("DELETE", &format!("/api/plans/{plan_id}/items"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["removed"], 1);

        // The saved item outlives the per-week copy.
        let (status, _) =
            send(&app, empty_request("GET", &format!("/api/saved-items/{saved_id}"))).await;
        assert_eq!(status, StatusCode::OK);

        let body = serde_json::json!({ "name": "Paper towels", "quantity": 0.0 });
        let (status, _) = send(
            &app,
            json_request("PUT", &format!("/api/saved-items/{saved_id}"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, empty_request("DELETE", &format!("/api/saved-items/{saved_id}"))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn preferences_round_trip() {
        let app = test_app(None);

        let (status, json) = send(&app, empty_request("GET", "/api/preferences")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["measurement_system"], "metric");

        let body = serde_json::json!({ "measurement_system": "imperial" });
        let (status, _) = send(&app, json_request("PUT", "/api/preferences", &body)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = send(&app, empty_request("GET", "/api/preferences")).await;
        assert_eq!(json["measurement_system"], "imperial");

        let body = serde_json::json!({ "measurement_system": "cubits" });
        let (status, _) = send(&app, json_request("PUT", "/api/preferences", &body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
