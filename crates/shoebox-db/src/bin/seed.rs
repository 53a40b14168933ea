//! # Seed Data Generator
//!
//! Populates the database with sample stock for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 items (default)
//! cargo run -p shoebox-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p shoebox-db --bin seed -- --count 5000
//!
//! # Specify database path
//! cargo run -p shoebox-db --bin seed -- --db ./data/shoebox.db
//! ```
//!
//! ## Generated Items
//! Each model comes in a run of sizes (230-290). Every item gets:
//! - A storage location `{row}-{shelf}` (A-01 .. D-12)
//! - A purchase date within the last year, a third of them sold
//! - A deterministic EAN-style barcode per model + size
//! - A price within ₩40,000 of the model's base price

use chrono::{Duration, Local, NaiveDate};
use std::env;

use shoebox_core::{Money, NewItem};
use shoebox_db::{Database, DbConfig};

/// (model number, product name, base price in won)
const MODELS: &[(&str, &str, i64)] = &[
    ("DD1391-100", "Nike Dunk Low Retro White Black", 139_000),
    ("DZ5485-612", "Jordan 1 Retro High OG Chicago Lost and Found", 209_000),
    ("CW2288-111", "Nike Air Force 1 '07 White", 139_000),
    ("FB9658-400", "Nike Air Max 1 '86 OG Big Bubble", 199_000),
    ("HP7870", "adidas Samba OG Cloud White", 139_000),
    ("IE3437", "adidas Gazelle Indoor Blue Fusion", 149_000),
    ("ID2350", "adidas Yeezy Boost 350 V2 Bone", 329_000),
    ("M2002RDA", "New Balance 2002R Protection Pack Rain Cloud", 189_000),
    ("U9060GRY", "New Balance 9060 Rain Cloud Grey", 199_000),
    ("BB550WT1", "New Balance 550 White Green", 139_000),
    ("1201A789-020", "Asics Gel-Kayano 14 Cream Black", 179_000),
    ("1203A537-100", "Asics Gel-1130 White Pure Silver", 129_000),
    ("L47452600", "Salomon XT-6 Black Phantom", 249_000),
    ("VN0A4BV4", "Vans Old Skool Black White", 89_000),
];

const SIZES: &[&str] = &["230", "240", "250", "260", "265", "270", "275", "280", "290"];

const VENDORS: &[&str] = &["KREAM", "무신사", "SOLDOUT", "나이키 공홈", "기본구매처"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./shoebox_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
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
                println!("Shoebox Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./shoebox_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shoebox Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating items...");

    let today = Local::now().date_naive();
    let start = std::time::Instant::now();

    let items: Vec<NewItem> = (0..count).map(|seed| generate_item(seed, today)).collect();

    // One transaction per chunk keeps progress visible on large runs.
    let mut generated = 0;
    for chunk in items.chunks(250) {
        generated += db.items().bulk_create(chunk.to_vec()).await?.len();
        println!("  Generated {} items...", generated);
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} items in {:?}", generated, elapsed);
    println!(
        "  Rate: {:.0} items/second",
        generated as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );

    let stats = db.items().statistics().await?;
    println!();
    println!("  Total:     {}", stats.total_items);
    println!("  Sold:      {}", stats.sold_items);
    println!("  In stock:  {}", stats.in_stock_items);
    println!("  Avg price: {}", stats.average_price.format_won());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single item with deterministic data.
fn generate_item(seed: usize, today: NaiveDate) -> NewItem {
    let (model_name, name, base_price) = MODELS[seed % MODELS.len()];
    let size_idx = (seed / MODELS.len()) % SIZES.len();
    let size = SIZES[size_idx];

    let purchase_date = today - Duration::days(((seed * 37) % 365) as i64);
    let sale_date = (seed % 3 == 0).then(|| {
        let held = ((seed * 11) % 60) as i64;
        (purchase_date + Duration::days(held)).min(today)
    });

    // Prices move in steps of ₩1,000 around the base
    let price = base_price + ((seed * 7919) % 60) as i64 * 1_000 - 20_000;

    let row = (b'A' + (seed % 4) as u8) as char;
    let shelf = (seed / 4) % 12 + 1;

    NewItem {
        location: format!("{}-{:02}", row, shelf),
        purchase_date,
        sale_date,
        model_name: model_name.to_string(),
        name: name.to_string(),
        size: Some(size.to_string()),
        vendor: VENDORS[seed % VENDORS.len()].to_string(),
        price: Money::from_units(price),
        notes: (seed % 10 == 0).then(|| "박스 손상".to_string()),
        barcode: Some(format!("8800{:05}{:04}", seed % MODELS.len(), size_idx)),
    }
}
