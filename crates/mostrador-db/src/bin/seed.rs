//! # Seed Data Generator
//!
//! Populates the database with a small abarrotes (corner store) catalog for
//! development and demos.
//!
//! ## Usage
//! ```bash
//! # Seed ./mostrador.db with providers, clients, products and a week of sales
//! cargo run -p mostrador-db --bin seed
//!
//! # Specify database path, skip the sales history
//! cargo run -p mostrador-db --bin seed -- --db ./data/demo.db --no-sales
//! ```
//!
//! ## Generated Data
//! - One provider per brand family (Bimbo, Lala, ...)
//! - Products with `{PROVIDER}-{NN}` SKUs, some near expiry, some low on stock
//! - A few registered clients
//! - Sales for the last 7 days across every payment method

use chrono::{Days, Utc};
use mostrador_core::{
    ClientInput, LineItemRequest, PaymentMethod, PriceSource, ProductInput, ProviderInput,
    SaleDraft, SaleRequest, TaxRate,
};
use mostrador_db::{Database, DbConfig};
use std::env;

/// Providers and the products they supply: (name, price cents, shelf life days).
const CATALOG: &[(&str, &str, &[(&str, i64, Option<u64>)])] = &[
    (
        "BIM",
        "Grupo Bimbo",
        &[
            ("Pan Blanco Grande", 5200, Some(6)),
            ("Pan Integral", 5600, Some(6)),
            ("Gansito", 1800, Some(25)),
            ("Mantecadas", 3400, Some(20)),
        ],
    ),
    (
        "LAL",
        "Grupo Lala",
        &[
            ("Leche Entera 1L", 2850, Some(12)),
            ("Leche Deslactosada 1L", 3050, Some(12)),
            ("Yoghurt Natural 1kg", 4400, Some(3)),
            ("Crema 200ml", 2300, Some(15)),
        ],
    ),
    (
        "FEM",
        "Coca-Cola FEMSA",
        &[
            ("Coca-Cola 600ml", 1800, None),
            ("Coca-Cola 2L", 3600, None),
            ("Agua Ciel 1L", 1200, None),
            ("Sprite 600ml", 1700, None),
        ],
    ),
    (
        "SAB",
        "Sabritas",
        &[
            ("Papas Sabritas 45g", 1900, Some(90)),
            ("Doritos Nacho 62g", 2000, Some(90)),
            ("Ruffles Queso 50g", 2000, Some(90)),
        ],
    ),
];

/// Products without a provider (bought at the central de abasto).
const LOOSE: &[(&str, &str, i64)] = &[
    ("GRA-01", "Frijol Negro 1kg", 3800),
    ("GRA-02", "Arroz 1kg", 3100),
    ("HUE-01", "Huevo Blanco 12 pzas", 4200),
];

const CLIENTS: &[(&str, &str)] = &[
    ("María López", "LOMM800101ABC"),
    ("Fonda Doña Lupe", "FDL950612XY1"),
    ("Juan Pérez", ""),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./mostrador.db");
    let mut with_sales = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--no-sales" => with_sales = false,
            "--help" | "-h" => {
                println!("Mostrador Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./mostrador.db)");
                println!("      --no-sales     Only seed the catalog and clients");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Mostrador Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let mut product_ids = Vec::new();

    for (code, provider_name, products) in CATALOG {
        let provider = db
            .providers()
            .create(&ProviderInput {
                name: provider_name.to_string(),
                contact_name: None,
                phone: None,
                email: None,
                address: None,
            })
            .await?;

        for (idx, (name, price_cents, shelf_life)) in products.iter().enumerate() {
            let input = ProductInput {
                sku: format!("{}-{:02}", code, idx + 1),
                name: name.to_string(),
                description: None,
                provider_id: Some(provider.id),
                price_cents: *price_cents,
                cost_cents: Some(price_cents * 70 / 100),
                stock: 10 + (idx as i64 * 7) % 30,
                min_stock: 5,
                expiration_date: shelf_life.and_then(|days| today.checked_add_days(Days::new(days))),
                is_active: true,
            };
            product_ids.push((db.products().create(&input).await?.id, *price_cents));
        }
    }

    for (sku, name, price_cents) in LOOSE {
        let input = ProductInput {
            sku: sku.to_string(),
            name: name.to_string(),
            description: None,
            provider_id: None,
            price_cents: *price_cents,
            cost_cents: None,
            stock: 3,
            min_stock: 5,
            expiration_date: None,
            is_active: true,
        };
        product_ids.push((db.products().create(&input).await?.id, *price_cents));
    }

    println!("✓ {} products from {} providers", product_ids.len(), CATALOG.len());

    let mut client_ids = Vec::new();
    for (name, tax_id) in CLIENTS {
        let client = db
            .clients()
            .create(&ClientInput {
                name: name.to_string(),
                phone: None,
                email: None,
                address: None,
                tax_id: Some(tax_id.to_string()),
            })
            .await?;
        client_ids.push(client.id);
    }

    println!("✓ {} clients", client_ids.len());

    if with_sales {
        let mut registered = 0;
        for days_ago in (0..7u64).rev() {
            let Some(date) = today.checked_sub_days(Days::new(days_ago)) else {
                continue;
            };

            for n in 0..3usize {
                let seed = days_ago as usize * 3 + n;
                let method = PaymentMethod::ALL[seed % PaymentMethod::ALL.len()];
                let line_items = (0..2)
                    .map(|k| {
                        let (product_id, unit_price_cents) = product_ids[(seed * 5 + k * 3) % product_ids.len()];
                        LineItemRequest {
                            product_id,
                            quantity: 1 + (k as i64),
                            unit_price_cents,
                        }
                    })
                    .collect();

                let request = SaleRequest {
                    client_id: (n == 0).then(|| client_ids[seed % client_ids.len()]),
                    payment_method: Some(method.to_string()),
                    line_items,
                };

                let draft = SaleDraft::from_request(request, TaxRate::default())?;
                match db.sales().register(&draft, PriceSource::Request, date).await {
                    Ok(_) => registered += 1,
                    Err(e) => eprintln!("Skipped a sale on {}: {}", date, e),
                }
            }
        }

        println!("✓ {} sales over the last 7 days", registered);
    }

    let low = db.reports().low_stock(None).await?;
    println!();
    println!("Low stock alerts: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    db.drain(std::time::Duration::from_secs(5)).await;
    Ok(())
}
