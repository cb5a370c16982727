//! # Seed Data Generator
//!
//! Populates the database with a floor plan for development.
//!
//! ## Usage
//! ```bash
//! # 12 tables (default)
//! cargo run -p hearth-db --bin seed
//!
//! # Custom floor size
//! cargo run -p hearth-db --bin seed -- --count 30
//!
//! # Specify database path
//! cargo run -p hearth-db --bin seed -- --db ./data/hearth.db
//! ```
//!
//! ## Generated Tables
//! Tables are numbered from 1 and spread across sections in turn:
//! Main Hall (4 seats), Patio (2 seats), Family (6 seats), Bar (2 seats).

use std::env;

use hearth_core::Table;
use hearth_db::{Database, DbConfig, TableRepository};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Section name and seats per table.
const SECTIONS: &[(&str, u32)] = &[("Main Hall", 4), ("Patio", 2), ("Family", 6), ("Bar", 2)];

const DEFAULT_COUNT: u32 = 12;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut db_path = String::from("./hearth_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Hearth POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of tables to create (default: 12)");
                println!("  -d, --db <PATH>    Database file path (default: ./hearth_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, count, "Seeding floor plan");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let tables = db.tables();

    let existing = tables.list().await?;
    if !existing.is_empty() {
        warn!(
            existing = existing.len(),
            "Database already has tables, skipping seed (delete the file to regenerate)"
        );
        return Ok(());
    }

    let mut created = 0;
    for number in 1..=count {
        let (section, capacity) = SECTIONS[(number as usize - 1) % SECTIONS.len()];
        let mut table = Table::new(number, capacity, Some(section))?;

        if let Err(e) = tables.insert(&mut table).await {
            warn!(number, error = %e, "Failed to insert table");
            continue;
        }
        created += 1;
    }

    info!(created, "Seed complete");
    db.close().await;

    Ok(())
}
