//! Database seeder for Ledgerd development and testing.
//!
//! Seeds a handful of wallets with transactions through the repositories,
//! so the seeded data obeys the same rules as API traffic (unique txids,
//! fixed-point amounts).
//!
//! Usage: cargo run --bin seeder

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use ledgerd_db::repositories::transaction::CreateTransactionInput;
use ledgerd_db::{TransactionRepository, WalletRepository};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding wallets...");
    seed_wallets(&db).await;

    println!("Seeding complete!");
}

async fn seed_wallets(db: &DatabaseConnection) {
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());

    let samples: [(&str, &[Decimal]); 3] = [
        ("checking", &[dec!(1250.00), dec!(-320.45), dec!(18.999)]),
        ("savings", &[dec!(10.000000000000000001)]),
        ("empty", &[]),
    ];

    for (label, amounts) in samples {
        let wallet = wallets
            .create_wallet(label.to_string())
            .await
            .expect("Failed to create wallet");

        for amount in amounts {
            transactions
                .create_transaction(CreateTransactionInput {
                    wallet_id: wallet.id,
                    txid: Uuid::new_v4().to_string(),
                    amount: Some(*amount),
                })
                .await
                .expect("Failed to create transaction");
        }

        let balance = wallets
            .balance(wallet.id)
            .await
            .expect("Failed to read balance");
        println!("  wallet '{label}' (id {}) balance {balance}", wallet.id);
    }
}
