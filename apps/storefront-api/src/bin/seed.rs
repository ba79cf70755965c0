//! # Demo Catalog Seeder
//!
//! Loads the storefront's sample catalog and, optionally, an admin account.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p storefront-api --bin seed
//!
//! # Specify database path
//! cargo run -p storefront-api --bin seed -- --db ./data/storefront.db
//!
//! # Also create (or promote) an admin account
//! cargo run -p storefront-api --bin seed -- \
//!     --admin-email owner@example.com --admin-password changeme123
//! ```
//!
//! The catalog is skipped when the database already has products, so the
//! seeder can be re-run safely to add an admin later.

use std::env;

use storefront_api::auth::hash_password;
use storefront_core::validation::{validate_email, validate_password};
use storefront_core::{Category, Role};
use storefront_db::{Database, DbConfig, NewProduct, NewUser};

/// (name, description, price in rupees, image key, category, stock)
const CATALOG: &[(&str, &str, i64, &str, Category, i64)] = &[
    (
        "Elegant Evening Dress",
        "Beautiful floor-length evening gown perfect for special occasions",
        3499,
        "pr1",
        Category::Kurta,
        8,
    ),
    (
        "Summer Floral Dress",
        "Light and comfortable floral print dress for summer",
        1999,
        "pr2",
        Category::Kurta,
        15,
    ),
    (
        "Casual Day Dress",
        "Perfect for everyday wear with comfortable fabric",
        1599,
        "pr3",
        Category::Kurta,
        12,
    ),
    (
        "Party Wear Gown",
        "Stylish party gown with elegant design",
        4299,
        "pr4",
        Category::Kurta,
        5,
    ),
    (
        "Designer Saree",
        "Traditional silk saree with modern touch",
        4599,
        "pr5",
        Category::Saree,
        6,
    ),
    (
        "Lehenga Choli",
        "Traditional lehenga for festivals and weddings",
        6999,
        "pr6",
        Category::Saree,
        4,
    ),
    (
        "Diamond Necklace",
        "Beautiful diamond necklace for special occasions",
        5999,
        "pr7",
        Category::Jewelry,
        7,
    ),
    (
        "Gold Earrings",
        "Elegant gold earrings with precious stones",
        2999,
        "pr8",
        Category::Jewelry,
        12,
    ),
    (
        "Sports Shoes",
        "Comfortable running shoes for daily wear",
        2499,
        "pr9",
        Category::Footwear,
        25,
    ),
    (
        "Designer Kurti",
        "Traditional kurti with modern design",
        1299,
        "pr10",
        Category::Kurta,
        20,
    ),
    (
        "Embroidered Kurta",
        "Hand-embroidered kurta with intricate patterns",
        1899,
        "pr11",
        Category::Kurta,
        10,
    ),
    (
        "Silk Dupatta",
        "Lightweight silk dupatta with zari border",
        899,
        "pr12",
        Category::Accessory,
        18,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./storefront.db");
    let mut admin_email: Option<String> = None;
    let mut admin_password: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-email" => {
                if i + 1 < args.len() {
                    admin_email = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--admin-password" => {
                if i + 1 < args.len() {
                    admin_password = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>              Database file path (default: ./storefront.db)");
                println!("      --admin-email <EMAIL>    Create or promote this admin account");
                println!("      --admin-password <PASS>  Password for a newly created admin");
                println!("  -h, --help                   Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("🌱 Storefront Demo Seeder");
    println!("========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    seed_catalog(&db).await?;

    if let Some(email) = admin_email {
        seed_admin(&db, &email, admin_password.as_deref()).await?;
    }

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

async fn seed_catalog(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalog to avoid duplicates.");
        return Ok(());
    }

    for &(name, description, rupees, image, category, stock) in CATALOG {
        let product = db
            .products()
            .insert(NewProduct {
                name: name.to_string(),
                description: description.to_string(),
                price_cents: rupees * 100,
                image: image.to_string(),
                category,
                stock,
            })
            .await?;

        println!("  + {} ({}) - {}", product.name, product.price(), product.category);
    }

    println!("✓ Added {} products", CATALOG.len());
    Ok(())
}

/// Promotes an existing account, or creates one when a password is given.
async fn seed_admin(
    db: &Database,
    email: &str,
    password: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = validate_email(email)?;

    if let Some(user) = db.users().get_by_email(&email).await? {
        db.users().update_role(&user.id, Role::Admin).await?;
        println!("✓ Promoted {} to admin", email);
        return Ok(());
    }

    let Some(password) = password else {
        return Err(format!("{email} does not exist; pass --admin-password to create it").into());
    };
    validate_password(password)?;

    let password_hash = hash_password(password).map_err(|e| e.message)?;

    db.users()
        .insert(NewUser {
            name: "Store Admin".to_string(),
            email: email.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await?;

    println!("✓ Created admin account {}", email);
    Ok(())
}
