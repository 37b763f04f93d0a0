//! # Seed Data Generator
//!
//! Populates an empty database with sample medicines, customers and sales
//! for development.
//!
//! ## Usage
//! ```bash
//! # Default counts, database from PHARMACIE_DB_PATH (or ./pharmacie.db)
//! cargo run -p pharma-db --bin seed
//!
//! # Custom amounts and database path
//! cargo run -p pharma-db --bin seed -- --medicines 200 --customers 50 --db ./data/dev.db
//! ```
//!
//! Logging follows `RUST_LOG` (default `info,pharma=debug,sqlx=warn`).

use std::env;
use std::time::Instant;

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pharma_core::{Money, NewCustomer, NewMedicine, NewSale, UNKNOWN_PHARMACIST};
use pharma_db::{Database, DbConfig};

const DEFAULT_MEDICINES: usize = 40;
const DEFAULT_CUSTOMERS: usize = 15;

/// Molecule, galenic form, base price in cents.
const MEDICINES: &[(&str, &str, i64)] = &[
    ("Paracetamol", "comprimé", 215),
    ("Ibuprofène", "comprimé", 290),
    ("Amoxicilline", "gélule", 480),
    ("Oméprazole", "gélule", 375),
    ("Loratadine", "comprimé", 520),
    ("Cétirizine", "comprimé", 455),
    ("Metformine", "comprimé", 310),
    ("Amlodipine", "comprimé", 395),
    ("Salbutamol", "aérosol", 610),
    ("Lévothyroxine", "comprimé", 280),
    ("Diclofénac", "gel", 540),
    ("Smecta", "sachet", 365),
    ("Spasfon", "comprimé", 420),
    ("Dexeryl", "crème", 705),
];

const STRENGTHS: &[(&str, i64)] = &[("100 mg", 0), ("250 mg", 60), ("500 mg", 110), ("1 g", 190)];

const LAST_NAMES: &[&str] = &[
    "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand", "Leroy",
    "Moreau", "Simon", "Laurent",
];

const FIRST_NAMES: &[&str] = &[
    "Claire", "Lucas", "Emma", "Hugo", "Léa", "Louis", "Chloé", "Jules", "Manon", "Arthur",
];

const PHARMACISTS: &[&str] = &["Dr. Lambert", "Dr. Fontaine", UNKNOWN_PHARMACIST];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pharma=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_help() {
    println!("Pharmacie Seed Data Generator");
    println!();
    println!("Usage: seed [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -m, --medicines <N>  Number of medicines to generate (default: {DEFAULT_MEDICINES})");
    println!("  -c, --customers <N>  Number of customers to generate (default: {DEFAULT_CUSTOMERS})");
    println!("  -d, --db <PATH>      Database file path (default: $PHARMACIE_DB_PATH or ./pharmacie.db)");
    println!("  -h, --help           Show this help message");
}

fn generate_medicine(index: usize, today: NaiveDate) -> NewMedicine {
    let (molecule, form, base_cents) = MEDICINES[index % MEDICINES.len()];
    let (strength, addon_cents) = STRENGTHS[(index / MEDICINES.len()) % STRENGTHS.len()];
    let batch = index / (MEDICINES.len() * STRENGTHS.len());

    let name = if batch == 0 {
        format!("{molecule} {strength}")
    } else {
        format!("{molecule} {strength} (lot {})", batch + 1)
    };

    NewMedicine {
        name,
        // CIP-13 style code, unique per index
        barcode: Some(format!("34009{:08}", 1_000 + index)),
        description: format!("{molecule}, {form} {strength}"),
        quantity: ((index * 37) % 120) as i64,
        price: Money::from_cents(base_cents + addon_cents + (index % 7) as i64 * 15),
        expiration_date: Some(today + Duration::days(90 + ((index * 53) % 900) as i64)),
    }
}

fn generate_customer(index: usize) -> Option<NewCustomer> {
    let birth_date = NaiveDate::from_ymd_opt(
        1940 + ((index * 7) % 65) as i32,
        1 + (index % 12) as u32,
        1 + ((index * 11) % 28) as u32,
    )?;

    Some(NewCustomer {
        last_name: LAST_NAMES[index % LAST_NAMES.len()].to_string(),
        first_name: FIRST_NAMES[(index / 2) % FIRST_NAMES.len()].to_string(),
        birth_date,
        phone: (index % 3 != 0).then(|| format!("06{:08}", 12_345_678 + index * 101)),
        insurance_number: (index % 4 != 0)
            .then(|| format!("{}{:011}", 1 + index % 2, 85_040_751_234u64 + index as u64)),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut config = DbConfig::from_env();
    let mut medicine_count = DEFAULT_MEDICINES;
    let mut customer_count = DEFAULT_CUSTOMERS;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--medicines" | "-m" => {
                if i + 1 < args.len() {
                    medicine_count = args[i + 1].parse().unwrap_or(DEFAULT_MEDICINES);
                    i += 1;
                }
            }
            "--customers" | "-c" => {
                if i + 1 < args.len() {
                    customer_count = args[i + 1].parse().unwrap_or(DEFAULT_CUSTOMERS);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    println!("Pharmacie Seed Data Generator");
    println!("=============================");
    println!("Database:  {}", config.database_path.display());
    println!("Medicines: {}", medicine_count);
    println!("Customers: {}", customer_count);
    println!();

    let db = Database::new(config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.medicines().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} medicines", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    let start = Instant::now();
    let today = chrono::Local::now().date_naive();

    let mut medicine_ids = Vec::with_capacity(medicine_count);
    for index in 0..medicine_count {
        let medicine = generate_medicine(index, today);
        match db.medicines().insert(&medicine).await {
            Ok(stored) => medicine_ids.push(stored.id),
            Err(e) => eprintln!("Failed to insert {}: {}", medicine.name, e),
        }
    }
    println!("✓ Generated {} medicines", medicine_ids.len());

    let mut customer_ids = Vec::with_capacity(customer_count);
    for index in 0..customer_count {
        let Some(customer) = generate_customer(index) else {
            continue;
        };
        match db.customers().insert(&customer).await {
            Ok(stored) => customer_ids.push(stored.id),
            Err(e) => eprintln!("Failed to insert {}: {}", customer.last_name, e),
        }
    }
    println!("✓ Generated {} customers", customer_ids.len());

    // A few sales over the first medicines; out-of-stock or unpriced ones are skipped
    let mut sold = 0;
    if !customer_ids.is_empty() {
        for (n, medicine_id) in medicine_ids.iter().take(10).enumerate() {
            let sale = NewSale {
                medicine_id: *medicine_id,
                customer_id: customer_ids[n % customer_ids.len()],
                quantity: 1 + (n % 3) as i64,
                pharmacist: PHARMACISTS[n % PHARMACISTS.len()].to_string(),
            };
            match db.sales().insert(&sale).await {
                Ok(_) => sold += 1,
                Err(e) => info!(medicine_id = *medicine_id, error = %e, "Skipped sample sale"),
            }
        }
    }
    println!("✓ Recorded {} sales", sold);

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    db.close().await;
    Ok(())
}
