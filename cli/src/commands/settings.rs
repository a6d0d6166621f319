use anyhow::Result;
use serde::Serialize;

use mealplan_core::db::Database;
use mealplan_core::units::MeasurementSystem;

use crate::config::Config;

#[derive(Serialize)]
struct Settings<'a> {
    user_id: &'a str,
    measurement_system: MeasurementSystem,
    data_dir: String,
    db_path: String,
}

pub(crate) fn cmd_settings_show(db: &Database, config: &Config, json: bool) -> Result<()> {
    let settings = Settings {
        user_id: &config.user_id,
        measurement_system: db.get_measurement_system(&config.user_id)?,
        data_dir: config.data_dir.display().to_string(),
        db_path: config.db_path.display().to_string(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        println!("User:               {}", settings.user_id);
        println!("Measurement system: {}", settings.measurement_system);
        println!("Data directory:     {}", settings.data_dir);
        println!("Database:           {}", settings.db_path);
    }
    Ok(())
}

pub(crate) fn cmd_settings_system(db: &Database, user_id: &str, system: &str, json: bool) -> Result<()> {
    let system: MeasurementSystem = system.parse()?;
    db.set_measurement_system(user_id, system)?;
    if json {
        println!("{}", serde_json::json!({ "measurement_system": system }));
    } else {
        println!("Measurement system set to {system}");
    }
    Ok(())
}
