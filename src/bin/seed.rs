//! Demo Data Seeder
//!
//! Run with: cargo run --bin seed
//!
//! Clears the selected store and populates five demo consumers, each with
//! three months of bill history ending at the current month, at the
//! default rate.

use chrono::{Datelike, Utc};
use rand::Rng;
use sqlx::postgres::PgPoolOptions;

use powerbill::domain::{billing, Bill, Consumer, DEFAULT_COST_PER_UNIT};
use powerbill::store::{FileStore, PgStore, Store};
use powerbill::{db, Config, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let store = match config.backend {
        StoreBackend::File => {
            println!("Seeding file store at {}", config.data_path.display());
            Store::File(FileStore::new(config.data_path.clone()))
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required"))?;
            println!("Seeding database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            if !db::check_schema(&pool).await? {
                anyhow::bail!("Database schema incomplete. Please run migrations.");
            }
            Store::Postgres(PgStore::new(pool))
        }
    };

    // Clear existing data: deleting each consumer cascades to its bills.
    let existing = store.state().await?;
    for consumer in &existing.consumers {
        store.delete_consumer(consumer.consumer_id).await?;
    }
    store.set_cost_per_unit(DEFAULT_COST_PER_UNIT).await?;

    let consumers = vec![
        Consumer {
            consumer_id: 1001,
            name: "Rajesh Kumar".to_string(),
            address: "MG Road, Bangalore".to_string(),
            mobile_no: "9876543210".to_string(),
        },
        Consumer {
            consumer_id: 1002,
            name: "Priya Sharma".to_string(),
            address: "Park Street, Kolkata".to_string(),
            mobile_no: "9876543211".to_string(),
        },
        Consumer {
            consumer_id: 1003,
            name: "Amit Patel".to_string(),
            address: "Marine Drive, Mumbai".to_string(),
            mobile_no: "9876543212".to_string(),
        },
        Consumer {
            consumer_id: 1004,
            name: "Sneha Reddy".to_string(),
            address: "Banjara Hills, Hyderabad".to_string(),
            mobile_no: "9876543213".to_string(),
        },
        Consumer {
            consumer_id: 1005,
            name: "Vijay Singh".to_string(),
            address: "Connaught Place, Delhi".to_string(),
            mobile_no: "9876543214".to_string(),
        },
    ];

    let now = Utc::now();
    let current_year = now.year();
    let current_month = now.month() as i32;

    let mut rng = rand::thread_rng();
    let mut bill_count = 0u32;

    for consumer in &consumers {
        store.insert_consumer(consumer.clone()).await?;

        // Three months of history ending at the current month.
        for i in (0..3).rev() {
            let mut month = current_month - i;
            let mut year = current_year;
            if month <= 0 {
                month += 12;
                year -= 1;
            }

            let units = rng.gen_range(100..=400) as f64;
            let amt = billing::calculate_amount(units, DEFAULT_COST_PER_UNIT);

            store
                .insert_bill(Bill {
                    consumer_id: consumer.consumer_id,
                    month,
                    year,
                    units_consumed: units,
                    amt,
                })
                .await?;
            bill_count += 1;
        }
    }

    println!("Seeded successfully!");
    println!("   - {} consumers created", consumers.len());
    println!("   - {} bills created", bill_count);
    println!("   - Default cost per unit: {}", billing::format_inr(DEFAULT_COST_PER_UNIT));

    Ok(())
}
