//! # Seed Data Generator
//!
//! Populates the database with development data: a small catalog, a few
//! clients and suppliers, and one open payable.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p comercio-db --bin seed
//!
//! # Specify database path
//! cargo run -p comercio-db --bin seed -- --db ./data/comercio.db
//! ```

use std::env;

use comercio_core::{NewClient, NewPayable, NewProduct, NewSupplier, PayableKind};
use comercio_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// (code, name, category, price_cents, cost_cents, stock)
const PRODUCTS: &[(&str, &str, &str, i64, i64, i64)] = &[
    ("BEV-001", "Cola 500ml", "Beverages", 250, 150, 48),
    ("BEV-002", "Orange Soda 500ml", "Beverages", 250, 150, 36),
    ("BEV-003", "Still Water 1L", "Beverages", 180, 90, 60),
    ("SNK-001", "Potato Chips 150g", "Snacks", 320, 200, 30),
    ("SNK-002", "Salted Peanuts 200g", "Snacks", 280, 170, 24),
    ("GRO-001", "Rice 1kg", "Grocery", 450, 300, 40),
    ("GRO-002", "Black Beans 1kg", "Grocery", 520, 340, 35),
    ("GRO-003", "Sugar 1kg", "Grocery", 380, 250, 50),
    ("GRO-004", "Cooking Oil 900ml", "Grocery", 890, 620, 20),
    ("CLN-001", "Dish Soap 750ml", "Cleaning", 410, 260, 18),
    ("CLN-002", "Laundry Detergent 1kg", "Cleaning", 760, 500, 15),
    ("DRY-001", "Whole Milk 1L", "Dairy", 340, 230, 25),
];

/// (name, allow_credit, credit_limit_cents, default_credit_days)
const CLIENTS: &[(&str, bool, i64, i64)] = &[
    ("Maria Fernandez", true, 100_000, 30),
    ("Jorge Castillo", true, 50_000, 15),
    ("Lucia Mendez", false, 0, 0),
];

const SUPPLIERS: &[(&str, &str)] = &[
    ("Distribuidora Central", "Ana Ruiz"),
    ("Alimentos del Sur", "Pedro Gomez"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./comercio_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Comercio POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./comercio_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Comercio POS Seed Data Generator");
    println!("================================");
    println!("Database: {db_path}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {existing} products");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    for &(code, name, category, price_cents, cost_cents, stock) in PRODUCTS {
        db.products()
            .insert(&NewProduct {
                code: Some(code.to_string()),
                name: name.to_string(),
                description: None,
                stock,
                cost_cents,
                price_cents,
                category: Some(category.to_string()),
            })
            .await?;
    }
    println!("  {} products", PRODUCTS.len());

    for &(name, allow_credit, credit_limit_cents, default_credit_days) in CLIENTS {
        db.clients()
            .insert(&NewClient {
                name: name.to_string(),
                email: None,
                phone: None,
                address: None,
                credit_limit_cents,
                allow_credit,
                default_credit_days,
            })
            .await?;
    }
    println!("  {} clients", CLIENTS.len());

    let mut first_supplier_id = None;
    for &(name, contact) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .insert(&NewSupplier {
                name: name.to_string(),
                contact: Some(contact.to_string()),
                email: None,
                phone: None,
            })
            .await?;
        first_supplier_id.get_or_insert(supplier.id);
    }
    println!("  {} suppliers", SUPPLIERS.len());

    db.payables()
        .create(&NewPayable {
            supplier_id: first_supplier_id,
            payee: None,
            description: "Opening stock invoice".to_string(),
            amount_cents: 150_000,
            kind: PayableKind::Invoice,
        })
        .await?;
    println!("  1 open payable");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
