//! # Seed Data Generator
//!
//! Registers the sample chicken catalog and a floor of empty tables.
//!
//! ## Usage
//! ```bash
//! # Use the configured database
//! cargo run -p kitchenpos-db --bin seed
//!
//! # Specify database path
//! cargo run -p kitchenpos-db --bin seed -- --db ./data/kitchenpos.db
//!
//! # Specify config file
//! cargo run -p kitchenpos-db --bin seed -- --config ./kitchenpos.toml
//! ```
//!
//! Seeding is skipped when the database already has products.

use kitchenpos_core::command::{
    CreateMenuGroupRequest, CreateMenuRequest, CreateOrderTableRequest, CreateProductRequest,
    MenuProductRequest,
};
use kitchenpos_core::Product;
use kitchenpos_db::{init_tracing, Database, KitchenPosConfig};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Products and their prices in won.
const PRODUCTS: &[(&str, i64)] = &[
    ("후라이드", 16000),
    ("양념치킨", 16000),
    ("반반치킨", 16000),
    ("통구이", 16000),
    ("간장치킨", 17000),
    ("순살치킨", 17000),
];

const MENU_GROUPS: &[&str] = &["두마리메뉴", "한마리메뉴", "순살파닭두마리메뉴", "신메뉴"];

/// (menu name, price, menu group, [(product, quantity)])
const MENUS: &[(&str, i64, &str, &[(&str, i64)])] = &[
    ("후라이드치킨", 16000, "한마리메뉴", &[("후라이드", 1)]),
    ("양념치킨", 16000, "한마리메뉴", &[("양념치킨", 1)]),
    ("반반치킨", 16000, "한마리메뉴", &[("반반치킨", 1)]),
    ("통구이", 16000, "한마리메뉴", &[("통구이", 1)]),
    ("간장치킨", 17000, "한마리메뉴", &[("간장치킨", 1)]),
    ("순살치킨", 17000, "한마리메뉴", &[("순살치킨", 1)]),
    ("후라이드+양념", 30000, "두마리메뉴", &[("후라이드", 1), ("양념치킨", 1)]),
    ("순살두마리", 32000, "순살파닭두마리메뉴", &[("순살치킨", 2)]),
];

const TABLE_COUNT: usize = 8;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut db_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kitchen POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -d, --db <PATH>      Database file path (overrides config)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = KitchenPosConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }
    init_tracing(&config.logging);

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!(path = ?config.database.path, "Seeding database");
    let db = Database::new(config.to_db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut products: HashMap<&str, Product> = HashMap::new();
    for (name, price) in PRODUCTS {
        let product = db
            .products()
            .create(CreateProductRequest {
                name: name.to_string(),
                price: Some(Decimal::from(*price)),
            })
            .await?;
        products.insert(*name, product);
    }
    println!("✓ {} products", products.len());

    let mut groups = HashMap::new();
    for name in MENU_GROUPS {
        let group = db
            .menu_groups()
            .create(CreateMenuGroupRequest {
                name: name.to_string(),
            })
            .await?;
        groups.insert(*name, group.id);
    }
    println!("✓ {} menu groups", groups.len());

    let mut menus = 0;
    for (name, price, group, lines) in MENUS {
        let (Some(menu_group_id), Some(menu_products)) = (
            groups.get(group),
            lines
                .iter()
                .map(|(product, quantity)| {
                    products.get(product).map(|p| MenuProductRequest {
                        product_id: p.id.clone(),
                        quantity: *quantity,
                    })
                })
                .collect::<Option<Vec<_>>>(),
        ) else {
            eprintln!("Skipping menu {}: unknown group or product", name);
            continue;
        };

        db.menus()
            .create(CreateMenuRequest {
                name: name.to_string(),
                price: Some(Decimal::from(*price)),
                menu_group_id: menu_group_id.clone(),
                menu_products,
            })
            .await?;
        menus += 1;
    }
    println!("✓ {} menus", menus);

    for _ in 0..TABLE_COUNT {
        db.order_tables()
            .create(CreateOrderTableRequest {
                number_of_guests: 0,
                empty: true,
            })
            .await?;
    }
    println!("✓ {} tables", TABLE_COUNT);

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
