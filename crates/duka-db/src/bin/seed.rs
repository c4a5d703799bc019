//! # Seed Data Generator
//!
//! Populates the database with sample catalog and customer data for
//! development.
//!
//! ## Usage
//! ```bash
//! cargo run -p duka-db --bin seed
//!
//! # Specify database path
//! cargo run -p duka-db --bin seed -- --db ./data/duka.db
//! ```

use std::env;

use duka_core::Money;
use duka_db::repository::product::NewProduct;
use duka_db::{Database, DbConfig};

/// Sample products: (name, description, category, price_cents, stock)
const PRODUCTS: &[(&str, &str, &str, i64, i64)] = &[
    (
        "Laptop",
        "High-performance laptop for work and gaming",
        "Electronics",
        99_999,
        50,
    ),
    (
        "Wireless Mouse",
        "Ergonomic wireless mouse with long battery life",
        "Electronics",
        2_999,
        200,
    ),
    (
        "Programming Book",
        "Learn programming from scratch",
        "Literature",
        1_999,
        100,
    ),
    (
        "Headphones",
        "Noise-cancelling wireless headphones",
        "Electronics",
        14_999,
        75,
    ),
    (
        "Desk Lamp",
        "LED desk lamp with adjustable brightness",
        "Furniture",
        3_999,
        150,
    ),
];

/// Sample customers: (name, email, phone, location)
const CUSTOMERS: &[(&str, &str, &str, &str)] = &[
    (
        "Alice Johnson",
        "alice@email.com",
        "+254712345678",
        "Nairobi, Kenya",
    ),
    (
        "Bob Smith",
        "bob@email.com",
        "+254723456789",
        "Mombasa, Kenya",
    ),
    (
        "Carol Davis",
        "carol@email.com",
        "+254734567890",
        "Kisumu, Kenya",
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./duka_dev.db");

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
                println!("Duka Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./duka_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Duka Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding products...");
    for &(name, description, category, price_cents, stock) in PRODUCTS {
        db.products()
            .create(&NewProduct {
                name: name.to_string(),
                description: Some(description.to_string()),
                category: Some(category.to_string()),
                price: Money::from_cents(price_cents),
                stock_quantity: stock,
                image_url: None,
            })
            .await?;
        println!("  + {}", name);
    }

    println!();
    println!("Seeding customers...");
    for &(name, email, phone, location) in CUSTOMERS {
        db.customers()
            .create(name, Some(email), phone, Some(location))
            .await?;
        println!("  + {}", name);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
