mod config;
mod db;
mod error;
mod export;
mod ledger;
mod models;
mod parse;
mod run;
mod store;
mod ui;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_env()?;
    config::init_tracing(&config)?;

    let db = db::Database::open(&config.db_path)?;
    let mut store = store::Store::load(db).context("Failed to load stored records")?;

    match args.len() {
        1 => run::as_tui(&mut store),
        2.. => run::as_cli(&args, &mut store),
        _ => {
            eprintln!("Usage: fintrack [command]");
            Ok(())
        }
    }
}
