//! Integration tests for the transaction repository.
//!
//! These tests run against a live PostgreSQL instance; set DATABASE_URL to
//! point at one. When DATABASE_URL is unset the tests are skipped so the
//! suite stays green on machines without a database.

use std::env;

use rust_decimal_macros::dec;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use ledgerd_db::migration::{Migrator, MigratorTrait};
use ledgerd_db::repositories::transaction::{
    CreateTransactionInput, TransactionError, TransactionFilter, UpdateTransactionInput,
};
use ledgerd_db::{TransactionRepository, WalletRepository};
use ledgerd_shared::types::PageRequest;

/// An id no IDENTITY sequence will plausibly reach.
const MISSING_ID: i64 = i64::MAX - 1;

/// Tests run in parallel; apply migrations exactly once per binary.
static MIGRATED: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();

async fn test_db() -> Option<DatabaseConnection> {
    let Ok(url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");
    MIGRATED
        .get_or_init(|| async {
            Migrator::up(&db, None)
                .await
                .expect("Failed to run migrations");
        })
        .await;
    Some(db)
}

fn unique_label(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

fn unique_txid() -> String {
    Uuid::new_v4().to_string()
}

#[tokio::test]
async fn test_create_transaction_renders_fixed_scale() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("wallet"))
        .await
        .expect("create wallet should succeed");

    let transaction = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: unique_txid(),
            amount: Some(dec!(10)),
        })
        .await
        .expect("create should succeed");

    assert_eq!(transaction.wallet_id, wallet.id);
    assert_eq!(transaction.amount.to_string(), "10.000000000000000000");
}

#[tokio::test]
async fn test_create_transaction_amount_defaults_to_zero() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("wallet"))
        .await
        .expect("create wallet should succeed");

    let transaction = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: unique_txid(),
            amount: None,
        })
        .await
        .expect("create should succeed");

    assert_eq!(transaction.amount, dec!(0));
    assert_eq!(transaction.amount.to_string(), "0.000000000000000000");

    // An explicit zero row sums at full scale, unlike the empty fallback.
    let balance = wallets.balance(wallet.id).await.expect("balance should read");
    assert_eq!(balance.to_string(), "0.000000000000000000");
}

#[tokio::test]
async fn test_create_transaction_wallet_not_found() {
    let Some(db) = test_db().await else { return };
    let transactions = TransactionRepository::new(db);

    let result = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: MISSING_ID,
            txid: unique_txid(),
            amount: None,
        })
        .await;

    assert!(matches!(result, Err(TransactionError::WalletNotFound(id)) if id == MISSING_ID));
}

#[tokio::test]
async fn test_create_transaction_duplicate_txid_leaves_original_unmodified() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("wallet"))
        .await
        .expect("create wallet should succeed");

    let txid = unique_txid();
    let original = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: txid.clone(),
            amount: Some(dec!(10)),
        })
        .await
        .expect("create should succeed");

    let result = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: txid.clone(),
            amount: Some(dec!(99)),
        })
        .await;

    let err = result.expect_err("duplicate txid must be rejected");
    assert!(matches!(&err, TransactionError::DuplicateTxid(t) if *t == txid));
    assert_eq!(
        err.to_string(),
        "transaction with this txid already exists."
    );

    let unchanged = transactions
        .find_transaction(original.id)
        .await
        .expect("find should succeed")
        .expect("original should still exist");
    assert_eq!(unchanged.amount, original.amount);
    assert_eq!(unchanged.wallet_id, original.wallet_id);
}

#[tokio::test]
async fn test_create_transaction_rejects_excess_precision() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("wallet"))
        .await
        .expect("create wallet should succeed");

    let result = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: unique_txid(),
            amount: Some(dec!(0.0000000000000000001)),
        })
        .await;

    assert!(matches!(result, Err(TransactionError::InvalidAmount(_))));
}

#[tokio::test]
async fn test_transaction_amount_precision_round_trip() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("wallet"))
        .await
        .expect("create wallet should succeed");

    let created = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: unique_txid(),
            amount: Some(dec!(10.000000000000000001)),
        })
        .await
        .expect("create should succeed");

    let fetched = transactions
        .find_transaction(created.id)
        .await
        .expect("find should succeed")
        .expect("transaction should exist");
    assert_eq!(fetched.amount.to_string(), "10.000000000000000001");
}

#[tokio::test]
async fn test_update_transaction_partial_fields() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("wallet"))
        .await
        .expect("create wallet should succeed");

    let transaction = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: unique_txid(),
            amount: Some(dec!(10)),
        })
        .await
        .expect("create should succeed");

    // Amount only; txid and wallet stay put.
    let updated = transactions
        .update_transaction(
            transaction.id,
            UpdateTransactionInput {
                amount: Some(dec!(20)),
                ..Default::default()
            },
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.amount.to_string(), "20.000000000000000000");
    assert_eq!(updated.txid, transaction.txid);
    assert_eq!(updated.wallet_id, wallet.id);

    // Re-submitting the transaction's own txid is not a collision.
    let updated = transactions
        .update_transaction(
            transaction.id,
            UpdateTransactionInput {
                txid: Some(transaction.txid.clone()),
                ..Default::default()
            },
        )
        .await
        .expect("update with own txid should succeed");
    assert_eq!(updated.txid, transaction.txid);
}

#[tokio::test]
async fn test_update_transaction_not_found() {
    let Some(db) = test_db().await else { return };
    let transactions = TransactionRepository::new(db);

    let result = transactions
        .update_transaction(
            MISSING_ID,
            UpdateTransactionInput {
                amount: Some(dec!(1)),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(TransactionError::NotFound(id)) if id == MISSING_ID));
}

#[tokio::test]
async fn test_update_transaction_wallet_not_found() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("wallet"))
        .await
        .expect("create wallet should succeed");

    let transaction = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: unique_txid(),
            amount: None,
        })
        .await
        .expect("create should succeed");

    let result = transactions
        .update_transaction(
            transaction.id,
            UpdateTransactionInput {
                wallet_id: Some(MISSING_ID),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(TransactionError::WalletNotFound(id)) if id == MISSING_ID));
}

#[tokio::test]
async fn test_update_transaction_duplicate_txid() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("wallet"))
        .await
        .expect("create wallet should succeed");

    let first_txid = unique_txid();
    transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: first_txid.clone(),
            amount: None,
        })
        .await
        .expect("create should succeed");

    let second = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: unique_txid(),
            amount: None,
        })
        .await
        .expect("create should succeed");

    let result = transactions
        .update_transaction(
            second.id,
            UpdateTransactionInput {
                txid: Some(first_txid.clone()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(TransactionError::DuplicateTxid(t)) if t == first_txid));
}

#[tokio::test]
async fn test_repoint_wallet_moves_balance_exactly() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let source = wallets
        .create_wallet(unique_label("source"))
        .await
        .expect("create wallet should succeed");
    let target = wallets
        .create_wallet(unique_label("target"))
        .await
        .expect("create wallet should succeed");

    let transaction = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: source.id,
            txid: unique_txid(),
            amount: Some(dec!(10)),
        })
        .await
        .expect("create should succeed");

    assert_eq!(
        wallets.balance(source.id).await.expect("balance").to_string(),
        "10.000000000000000000"
    );

    let updated = transactions
        .update_transaction(
            transaction.id,
            UpdateTransactionInput {
                wallet_id: Some(target.id),
                ..Default::default()
            },
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.wallet_id, target.id);

    // The amount counts toward exactly one wallet after the move.
    assert_eq!(
        wallets.balance(source.id).await.expect("balance").to_string(),
        "0.0"
    );
    assert_eq!(
        wallets.balance(target.id).await.expect("balance").to_string(),
        "10.000000000000000000"
    );
}

#[tokio::test]
async fn test_delete_transaction_reduces_balance() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("wallet"))
        .await
        .expect("create wallet should succeed");

    let transaction = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: unique_txid(),
            amount: Some(dec!(10)),
        })
        .await
        .expect("create should succeed");

    transactions
        .delete_transaction(transaction.id)
        .await
        .expect("delete should succeed");

    assert_eq!(
        wallets.balance(wallet.id).await.expect("balance").to_string(),
        "0.0"
    );

    let result = transactions.delete_transaction(transaction.id).await;
    assert!(matches!(result, Err(TransactionError::NotFound(_))));
}

#[tokio::test]
async fn test_list_transactions_exact_match_filters() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("wallet"))
        .await
        .expect("create wallet should succeed");
    let other = wallets
        .create_wallet(unique_label("other"))
        .await
        .expect("create wallet should succeed");

    let txid = unique_txid();
    let transaction = transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: wallet.id,
            txid: txid.clone(),
            amount: Some(dec!(10)),
        })
        .await
        .expect("create should succeed");
    transactions
        .create_transaction(CreateTransactionInput {
            wallet_id: other.id,
            txid: unique_txid(),
            amount: Some(dec!(10)),
        })
        .await
        .expect("create should succeed");

    let (rows, total) = transactions
        .list_transactions(
            TransactionFilter {
                txid: Some(txid),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .expect("list should succeed");
    assert_eq!(total, 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, transaction.id);

    let (rows, total) = transactions
        .list_transactions(
            TransactionFilter {
                wallet_id: Some(wallet.id),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .expect("list should succeed");
    assert_eq!(total, 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].wallet_id, wallet.id);
}

#[tokio::test]
async fn test_list_transactions_pagination_slices_in_creation_order() {
    let Some(db) = test_db().await else { return };
    let wallets = WalletRepository::new(db.clone());
    let transactions = TransactionRepository::new(db);

    let wallet = wallets
        .create_wallet(unique_label("paged"))
        .await
        .expect("create wallet should succeed");

    let mut txids = Vec::new();
    for i in 1..=10 {
        let txid = format!("batch-{i}-{}", Uuid::new_v4());
        transactions
            .create_transaction(CreateTransactionInput {
                wallet_id: wallet.id,
                txid: txid.clone(),
                amount: Some(dec!(10) * rust_decimal::Decimal::from(i)),
            })
            .await
            .expect("create should succeed");
        txids.push(txid);
    }

    let filter = TransactionFilter {
        wallet_id: Some(wallet.id),
        ..Default::default()
    };

    let (rows, total) = transactions
        .list_transactions(filter.clone(), PageRequest::from_params(Some(1), Some(5)))
        .await
        .expect("list should succeed");
    assert_eq!(total, 10);
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].txid, txids[0]);
    assert_eq!(rows[4].txid, txids[4]);
    assert_eq!(rows[4].amount.to_string(), "50.000000000000000000");

    let (rows, total) = transactions
        .list_transactions(filter.clone(), PageRequest::from_params(Some(2), Some(5)))
        .await
        .expect("list should succeed");
    assert_eq!(total, 10);
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].txid, txids[5]);
    assert_eq!(rows[4].txid, txids[9]);
    assert_eq!(rows[4].amount.to_string(), "100.000000000000000000");

    let (rows, total) = transactions
        .list_transactions(filter, PageRequest::from_params(Some(3), Some(5)))
        .await
        .expect("list should succeed");
    assert_eq!(total, 10);
    assert!(rows.is_empty(), "a page past the end is an empty slice");
}
