mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{
    ListFormat, cmd_plan_add, cmd_plan_clear, cmd_plan_clear_slot, cmd_plan_remove,
    cmd_plan_servings, cmd_plan_set, cmd_plan_show, cmd_product_add, cmd_product_list,
    cmd_recipe_add_ingredient, cmd_recipe_create, cmd_recipe_delete, cmd_recipe_list,
    cmd_recipe_remove_ingredient, cmd_recipe_set_servings, cmd_recipe_show, cmd_saved_add,
    cmd_saved_delete, cmd_saved_list, cmd_saved_update, cmd_settings_show, cmd_settings_system,
    cmd_shop_add, cmd_shop_add_saved, cmd_shop_check, cmd_shop_clear, cmd_shop_list,
    cmd_shop_remove, cmd_unit_add, cmd_unit_convert, cmd_unit_list, cmd_unit_remove,
};
use crate::config::Config;
use mealplan_core::db::Database;
use mealplan_core::models::DEFAULT_RECIPE_SERVINGS;

#[derive(Parser)]
#[command(
    name = "mealplan",
    version,
    about = "Plan a week of meals and get the shopping list for it"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Units of measure and conversions
    Unit {
        #[command(subcommand)]
        command: UnitCommands,
    },
    /// Manage products (the global catalog plus your own)
    Product {
        #[command(subcommand)]
        command: ProductCommands,
    },
    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Plan meals for a week
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// The week's shopping list
    Shop {
        #[command(subcommand)]
        command: ShopCommands,
    },
    /// Saved items you buy often
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },
    /// Show or change preferences
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable API key authentication (for development/testing)
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
enum UnitCommands {
    /// List built-in and custom units
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Define (or redefine) a custom unit
    Add {
        /// Unit symbol (e.g. "clove")
        symbol: String,
        /// Display name (defaults to the symbol)
        #[arg(long)]
        name: Option<String>,
        /// Base unit: g, ml or unit
        #[arg(long)]
        base: String,
        /// How many base units one of this unit is
        #[arg(long)]
        factor: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a custom unit
    Remove {
        /// Unit symbol
        symbol: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a quantity (e.g. "2 cup", or "2" "cup")
    Convert {
        /// Quantity, optionally with its unit (e.g. "500g", "1.5 fl oz")
        quantity: String,
        /// Unit, when not part of the quantity
        unit: Option<String>,
        /// Target unit (default: natural unit of the measurement system)
        #[arg(long)]
        to: Option<String>,
        /// Measurement system override: metric or imperial
        #[arg(long)]
        system: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProductCommands {
    /// Add a product of your own
    Add {
        /// Product name
        name: String,
        /// Category (e.g. "Vegetables")
        #[arg(short, long)]
        category: Option<String>,
        /// Default base unit: g, ml or unit
        #[arg(long)]
        default_unit: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List products
    List {
        /// Filter by name
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Create a new recipe
    Create {
        /// Recipe name
        name: String,
        /// Number of servings the ingredient amounts make
        #[arg(short, long, default_value_t = DEFAULT_RECIPE_SERVINGS)]
        servings: i64,
        /// Short description
        #[arg(short, long)]
        description: Option<String>,
        /// Ingredient as "<product>=<quantity>" (e.g. "Pasta=400g"); repeatable
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an ingredient to a recipe
    AddIngredient {
        /// Recipe name or ID
        recipe: String,
        /// Product name
        product: String,
        /// Quantity (e.g. "400g", "2 tbsp", "3")
        quantity: String,
        /// Note (e.g. "finely chopped")
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an ingredient from a recipe
    RemoveIngredient {
        /// Recipe name or ID
        recipe: String,
        /// Product name
        product: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change how many servings a recipe makes
    SetServings {
        /// Recipe name or ID
        recipe: String,
        /// Number of servings
        servings: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe with its ingredients
    Show {
        /// Recipe name or ID
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all recipes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe (and remove it from every plan)
    Delete {
        /// Recipe name or ID
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Show the week's plan
    Show {
        /// Any date in the week (YYYY-MM-DD, today, last-week, next-week)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the recipes of a meal slot
    Set {
        /// Day (monday..sunday, mon..sun or 0-6)
        day: String,
        /// Meal: breakfast, lunch or dinner
        meal: String,
        /// Recipes as "<name or id>[:<servings>]"; none clears the slot
        recipes: Vec<String>,
        /// Any date in the week (default: this week)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a recipe to a meal slot
    Add {
        /// Day (monday..sunday, mon..sun or 0-6)
        day: String,
        /// Meal: breakfast, lunch or dinner
        meal: String,
        /// Recipe name or ID
        recipe: String,
        /// Servings to cook (default: the recipe's own servings)
        #[arg(short, long)]
        servings: Option<f64>,
        /// Any date in the week (default: this week)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a planned recipe by its ID
    Remove {
        /// Planned recipe ID (shown in `plan show`)
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the servings of a planned recipe
    Servings {
        /// Planned recipe ID (shown in `plan show`)
        id: i64,
        /// Servings to cook
        servings: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove every recipe from a meal slot
    ClearSlot {
        /// Day (monday..sunday, mon..sun or 0-6)
        day: String,
        /// Meal: breakfast, lunch or dinner
        meal: String,
        /// Any date in the week (default: this week)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove all meals from the week
    Clear {
        /// Any date in the week (default: this week)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ShopCommands {
    /// Show the aggregated shopping list
    List {
        /// Any date in the week (default: this week)
        #[arg(long)]
        date: Option<String>,
        /// Measurement system override: metric or imperial
        #[arg(long)]
        system: Option<String>,
        /// Group by category before name
        #[arg(long)]
        by_category: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an extra item to the week's list
    Add {
        /// Item name
        name: String,
        /// Quantity
        #[arg(short, long)]
        quantity: Option<f64>,
        /// Unit
        #[arg(short, long)]
        unit: Option<String>,
        /// Any date in the week (default: this week)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark an extra item as bought
    Check {
        /// Item ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark an extra item as not bought
    Uncheck {
        /// Item ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an extra item
    Remove {
        /// Item ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove every extra item from the week's list
    Clear {
        /// Any date in the week (default: this week)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy saved items onto the week's list
    AddSaved {
        /// Saved item IDs
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Any date in the week (default: this week)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SavedCommands {
    /// Save an item for reuse
    Add {
        /// Item name
        name: String,
        /// Quantity
        #[arg(short, long)]
        quantity: Option<f64>,
        /// Unit
        #[arg(short, long)]
        unit: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List saved items
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a saved item
    Update {
        /// Saved item ID
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New quantity
        #[arg(short, long)]
        quantity: Option<f64>,
        /// New unit
        #[arg(short, long)]
        unit: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved item
    Delete {
        /// Saved item ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the measurement system used for shopping lists
    System {
        /// metric or imperial
        system: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mealplan=info,mealplan_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&config.db_path)?;
    let user = config.user_id.as_str();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            no_auth,
        } => {
            let (api_key, new_api_key) = if no_auth {
                (None, false)
            } else {
                let (key, new) = config.load_or_create_api_key()?;
                (Some(key), new)
            };
            server::start_server(db, port, &bind, api_key, new_api_key, user.to_string()).await
        }
        Commands::Unit { command } => match command {
            UnitCommands::List { json } => cmd_unit_list(&db, user, json),
            UnitCommands::Add {
                symbol,
                name,
                base,
                factor,
                json,
            } => cmd_unit_add(&db, user, &symbol, name.as_deref(), &base, factor, json),
            UnitCommands::Remove { symbol, json } => cmd_unit_remove(&db, user, &symbol, json),
            UnitCommands::Convert {
                quantity,
                unit,
                to,
                system,
                json,
            } => cmd_unit_convert(
                &db,
                user,
                &quantity,
                unit.as_deref(),
                to.as_deref(),
                system.as_deref(),
                json,
            ),
        },
        Commands::Product { command } => match command {
            ProductCommands::Add {
                name,
                category,
                default_unit,
                json,
            } => cmd_product_add(&db, user, &name, category, default_unit.as_deref(), json),
            ProductCommands::List { search, json } => {
                cmd_product_list(&db, user, search.as_deref(), json)
            }
        },
        Commands::Recipe { command } => match command {
            RecipeCommands::Create {
                name,
                servings,
                description,
                ingredients,
                json,
            } => cmd_recipe_create(&db, user, &name, servings, description, &ingredients, json),
            RecipeCommands::AddIngredient {
                recipe,
                product,
                quantity,
                notes,
                json,
            } => cmd_recipe_add_ingredient(&db, user, &recipe, &product, &quantity, notes, json),
            RecipeCommands::RemoveIngredient {
                recipe,
                product,
                json,
            } => cmd_recipe_remove_ingredient(&db, user, &recipe, &product, json),
            RecipeCommands::SetServings {
                recipe,
                servings,
                json,
            } => cmd_recipe_set_servings(&db, user, &recipe, servings, json),
            RecipeCommands::Show { recipe, json } => cmd_recipe_show(&db, user, &recipe, json),
            RecipeCommands::List { json } => cmd_recipe_list(&db, user, json),
            RecipeCommands::Delete { recipe, json } => cmd_recipe_delete(&db, user, &recipe, json),
        },
        Commands::Plan { command } => match command {
            PlanCommands::Show { date, json } => cmd_plan_show(&db, user, date, json),
            PlanCommands::Set {
                day,
                meal,
                recipes,
                date,
                json,
            } => cmd_plan_set(&db, user, &day, &meal, &recipes, date, json),
            PlanCommands::Add {
                day,
                meal,
                recipe,
                servings,
                date,
                json,
            } => cmd_plan_add(&db, user, &day, &meal, &recipe, servings, date, json),
            PlanCommands::Remove { id, json } => cmd_plan_remove(&db, user, id, json),
            PlanCommands::Servings { id, servings, json } => {
                cmd_plan_servings(&db, user, id, servings, json)
            }
            PlanCommands::ClearSlot {
                day,
                meal,
                date,
                json,
            } => cmd_plan_clear_slot(&db, user, &day, &meal, date, json),
            PlanCommands::Clear { date, json } => cmd_plan_clear(&db, user, date, json),
        },
        Commands::Shop { command } => match command {
            ShopCommands::List {
                date,
                system,
                by_category,
                format,
                json,
            } => cmd_shop_list(&db, user, date, system.as_deref(), by_category, format, json),
            ShopCommands::Add {
                name,
                quantity,
                unit,
                date,
                json,
            } => cmd_shop_add(&db, user, &name, quantity, unit, date, json),
            ShopCommands::Check { id, json } => cmd_shop_check(&db, user, id, true, json),
            ShopCommands::Uncheck { id, json } => cmd_shop_check(&db, user, id, false, json),
            ShopCommands::Remove { id, json } => cmd_shop_remove(&db, user, id, json),
            ShopCommands::Clear { date, json } => cmd_shop_clear(&db, user, date, json),
            ShopCommands::AddSaved { ids, date, json } => {
                cmd_shop_add_saved(&db, user, &ids, date, json)
            }
        },
        Commands::Saved { command } => match command {
            SavedCommands::Add {
                name,
                quantity,
                unit,
                json,
            } => cmd_saved_add(&db, user, &name, quantity, unit, json),
            SavedCommands::List { json } => cmd_saved_list(&db, user, json),
            SavedCommands::Update {
                id,
                name,
                quantity,
                unit,
                json,
            } => cmd_saved_update(&db, user, id, name, quantity, unit, json),
            SavedCommands::Delete { id, json } => cmd_saved_delete(&db, user, id, json),
        },
        Commands::Settings { command } => match command {
            SettingsCommands::Show { json } => cmd_settings_show(&db, &config, json),
            SettingsCommands::System { system, json } => {
                cmd_settings_system(&db, user, &system, json)
            }
        },
    }
}
