//! CLI entry point for running a radius search against the core.
//!
//! # Responsibility
//! - Load optional JSON config and open the configured database.
//! - Seed a few demo places when running in memory.
//! - Run one search and print the response as JSON.
//!
//! Usage: `geosearch_cli [config.json] [request.json]`

use geosearch_core::{
    core_version, init_logging_from_config, open_db, open_db_in_memory, CoreConfig,
    GeoSearchRequest, GeoSearchService, Place, PlaceRepository, SqlitePlaceRepository,
    SqlitePlaceStore,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

const DEMO_PLACES: &[(&str, f64, f64)] = &[
    ("Battery Park", 40.7033, -74.0170),
    ("Washington Square", 40.7308, -73.9973),
    ("Central Park", 40.7829, -73.9654),
    ("Prospect Park", 40.6602, -73.9690),
];

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("geosearch_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let config = match args.first() {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    init_logging_from_config(&config.logging)?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => {
            let conn = open_db_in_memory()?;
            let repo = SqlitePlaceRepository::new(&conn);
            for (name, latitude, longitude) in DEMO_PLACES {
                repo.create_place(&Place::new(*name, *latitude, *longitude))?;
            }
            conn
        }
    };

    let request = match args.get(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => GeoSearchRequest::new(40.7128, -74.0060, 5_000),
    };

    let service =
        GeoSearchService::new(SqlitePlaceStore::new(&conn)).with_config(config.search.clone());
    let response = service.handle(&request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
