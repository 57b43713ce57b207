//! Transaction repository for ledger transaction database operations.
//!
//! Every write runs inside a single store transaction so balance reads,
//! which aggregate live over this table, never observe a partially applied
//! mutation.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use ledgerd_core::ledger::{AmountError, normalize_amount};
use ledgerd_shared::types::PageRequest;

use crate::entities::{transactions, wallets};

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(i64),

    /// Referenced wallet not found.
    #[error("Wallet not found: {0}")]
    WalletNotFound(i64),

    /// A transaction with this txid already exists.
    #[error("transaction with this txid already exists.")]
    DuplicateTxid(String),

    /// Amount outside the fixed-point representation.
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Owning wallet id.
    pub wallet_id: i64,
    /// Globally unique transaction identifier.
    pub txid: String,
    /// Signed amount; defaults to zero when omitted.
    pub amount: Option<Decimal>,
}

/// Input for updating a transaction. Any subset of fields may change in one
/// call; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    /// Re-point the transaction at a different wallet.
    pub wallet_id: Option<i64>,
    /// Replace the txid.
    pub txid: Option<String>,
    /// Replace the amount.
    pub amount: Option<Decimal>,
}

/// Filter options for listing transactions. Filters combine with logical
/// AND.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Exact-match filter on transaction id.
    pub id: Option<i64>,
    /// Exact-match filter on the referenced wallet id.
    pub wallet_id: Option<i64>,
    /// Exact-match filter on txid.
    pub txid: Option<String>,
}

/// Transaction repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new transaction against an existing wallet.
    ///
    /// The wallet lookup, the txid uniqueness check, and the insert share
    /// one store transaction. The unique constraint on txid backstops
    /// concurrent creates that race past the check.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet does not exist, the txid is already
    /// taken, the amount does not fit the fixed-point representation, or
    /// the database operation fails.
    pub async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        let amount = normalize_amount(input.amount.unwrap_or(Decimal::ZERO))?;

        let txn = self.db.begin().await?;

        wallets::Entity::find_by_id(input.wallet_id)
            .one(&txn)
            .await?
            .ok_or(TransactionError::WalletNotFound(input.wallet_id))?;

        let taken = transactions::Entity::find()
            .filter(transactions::Column::Txid.eq(input.txid.as_str()))
            .count(&txn)
            .await?;
        if taken > 0 {
            return Err(TransactionError::DuplicateTxid(input.txid));
        }

        let transaction = transactions::ActiveModel {
            wallet_id: Set(input.wallet_id),
            txid: Set(input.txid.clone()),
            amount: Set(amount),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let inserted = transaction
            .insert(&txn)
            .await
            .map_err(|e| map_unique_violation(e, &input.txid))?;

        txn.commit().await?;
        Ok(inserted)
    }

    /// Finds a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_transaction(
        &self,
        id: i64,
    ) -> Result<Option<transactions::Model>, TransactionError> {
        Ok(transactions::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Updates any subset of a transaction's fields.
    ///
    /// Re-pointing `wallet_id` is a single-row UPDATE inside the store
    /// transaction, so the amount's contribution moves between the two
    /// wallet balances atomically: no concurrent read sees it counted
    /// toward neither or both.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction or a replacement wallet does not
    /// exist, a replacement txid collides with a different transaction, the
    /// amount does not fit the fixed-point representation, or the database
    /// operation fails.
    pub async fn update_transaction(
        &self,
        id: i64,
        input: UpdateTransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        let amount = input.amount.map(normalize_amount).transpose()?;

        let txn = self.db.begin().await?;

        let transaction = transactions::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound(id))?;

        if let Some(wallet_id) = input.wallet_id {
            wallets::Entity::find_by_id(wallet_id)
                .one(&txn)
                .await?
                .ok_or(TransactionError::WalletNotFound(wallet_id))?;
        }

        if let Some(txid) = &input.txid {
            let clash = transactions::Entity::find()
                .filter(transactions::Column::Txid.eq(txid.as_str()))
                .filter(transactions::Column::Id.ne(id))
                .count(&txn)
                .await?;
            if clash > 0 {
                return Err(TransactionError::DuplicateTxid(txid.clone()));
            }
        }

        let mut active: transactions::ActiveModel = transaction.into();
        if let Some(wallet_id) = input.wallet_id {
            active.wallet_id = Set(wallet_id);
        }
        if let Some(txid) = input.txid.clone() {
            active.txid = Set(txid);
        }
        if let Some(amount) = amount {
            active.amount = Set(amount);
        }

        let updated = active.update(&txn).await.map_err(|e| match &input.txid {
            Some(txid) => map_unique_violation(e, txid),
            None => TransactionError::Database(e),
        })?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a transaction. The owning wallet's balance reflects the
    /// removal on the next read.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction does not exist or the database
    /// operation fails.
    pub async fn delete_transaction(&self, id: i64) -> Result<(), TransactionError> {
        let result = transactions::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(TransactionError::NotFound(id));
        }
        Ok(())
    }

    /// Lists transactions with filters and pagination, in creation order
    /// (ascending id).
    ///
    /// The returned count is the post-filter, pre-pagination total; a page
    /// past the end yields an empty slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<(Vec<transactions::Model>, u64), TransactionError> {
        let mut query = transactions::Entity::find();

        if let Some(id) = filter.id {
            query = query.filter(transactions::Column::Id.eq(id));
        }
        if let Some(wallet_id) = filter.wallet_id {
            query = query.filter(transactions::Column::WalletId.eq(wallet_id));
        }
        if let Some(txid) = filter.txid {
            query = query.filter(transactions::Column::Txid.eq(txid));
        }

        let total = query.clone().count(&self.db).await?;

        let rows = query
            .order_by_asc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }
}

/// Maps a unique-constraint violation from the store onto the duplicate
/// txid error; txid is the only unique column on the table.
fn map_unique_violation(err: DbErr, txid: &str) -> TransactionError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            TransactionError::DuplicateTxid(txid.to_string())
        }
        _ => TransactionError::Database(err),
    }
}
