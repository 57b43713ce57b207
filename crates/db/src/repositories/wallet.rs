//! Wallet repository for wallet database operations.
//!
//! Wallet balances are never stored: every balance read is a live SUM over
//! the referencing transactions, so a write committed elsewhere is visible
//! on the very next read.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use ledgerd_core::ledger::{balance_from_aggregate, zero_balance};
use ledgerd_shared::types::{PageRequest, SortDirection};

use crate::entities::{transactions, wallets};

/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Wallet not found.
    #[error("Wallet not found: {0}")]
    NotFound(i64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Wallet with its live-aggregated balance.
#[derive(Debug, Clone)]
pub struct WalletWithBalance {
    /// The wallet record.
    pub wallet: wallets::Model,
    /// Sum of referencing transaction amounts (the `0.0` fallback when none
    /// exist).
    pub balance: Decimal,
}

/// Filter options for listing wallets. Filters combine with logical AND.
#[derive(Debug, Clone, Default)]
pub struct WalletFilter {
    /// Exact-match filter on wallet id.
    pub id: Option<i64>,
    /// Exact-match filter on label.
    pub label: Option<String>,
}

/// Sort options for listing wallets.
///
/// Without an explicit sort, wallets list in creation order (ascending id).
#[derive(Debug, Clone, Copy, Default)]
pub struct WalletSort {
    /// Sort by label in the given direction.
    pub label: Option<SortDirection>,
}

/// Wallet repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new wallet. Labels carry no constraints, so this always
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_wallet(&self, label: String) -> Result<wallets::Model, WalletError> {
        let wallet = wallets::ActiveModel {
            label: Set(label),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        Ok(wallet.insert(&self.db).await?)
    }

    /// Finds a wallet by id together with its live balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_wallet(&self, id: i64) -> Result<Option<WalletWithBalance>, WalletError> {
        let Some(wallet) = wallets::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let balance = self.balance(id).await?;
        Ok(Some(WalletWithBalance { wallet, balance }))
    }

    /// Computes a wallet's balance as the SUM over its transaction amounts.
    ///
    /// The aggregate is evaluated by the store on every call; nothing is
    /// cached. A wallet with no transactions yields the `0.0` fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn balance(&self, wallet_id: i64) -> Result<Decimal, WalletError> {
        #[derive(FromQueryResult)]
        struct SumRow {
            total: Option<Decimal>,
        }

        let row = transactions::Entity::find()
            .select_only()
            .column_as(transactions::Column::Amount.sum(), "total")
            .filter(transactions::Column::WalletId.eq(wallet_id))
            .into_model::<SumRow>()
            .one(&self.db)
            .await?;

        Ok(balance_from_aggregate(row.and_then(|r| r.total)))
    }

    /// Replaces a wallet's label.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet does not exist or the database
    /// operation fails.
    pub async fn update_wallet(
        &self,
        id: i64,
        label: String,
    ) -> Result<wallets::Model, WalletError> {
        let wallet = wallets::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(WalletError::NotFound(id))?;

        let mut active: wallets::ActiveModel = wallet.into();
        active.label = Set(label);

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a wallet and every transaction referencing it.
    ///
    /// Both deletes run in one store transaction: a concurrent reader never
    /// observes the wallet gone while its transactions remain, or vice
    /// versa.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet does not exist or the database
    /// operation fails.
    pub async fn delete_wallet(&self, id: i64) -> Result<(), WalletError> {
        let txn = self.db.begin().await?;

        let wallet = wallets::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(WalletError::NotFound(id))?;

        transactions::Entity::delete_many()
            .filter(transactions::Column::WalletId.eq(wallet.id))
            .exec(&txn)
            .await?;

        wallets::Entity::delete_by_id(wallet.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Lists wallets with filters, sorting, and pagination.
    ///
    /// Composition order is filter, then sort, then paginate. The returned
    /// count is the post-filter, pre-pagination total; a page past the end
    /// yields an empty slice. Label sorting uses ascending id as tiebreak so
    /// the ordering is total.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_wallets(
        &self,
        filter: WalletFilter,
        sort: WalletSort,
        page: PageRequest,
    ) -> Result<(Vec<WalletWithBalance>, u64), WalletError> {
        let mut query = wallets::Entity::find();

        if let Some(id) = filter.id {
            query = query.filter(wallets::Column::Id.eq(id));
        }
        if let Some(label) = filter.label {
            query = query.filter(wallets::Column::Label.eq(label));
        }

        let total = query.clone().count(&self.db).await?;

        query = match sort.label {
            Some(SortDirection::Asc) => query
                .order_by_asc(wallets::Column::Label)
                .order_by_asc(wallets::Column::Id),
            Some(SortDirection::Desc) => query
                .order_by_desc(wallets::Column::Label)
                .order_by_asc(wallets::Column::Id),
            None => query.order_by_asc(wallets::Column::Id),
        };

        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let balances = self
            .balances_for(rows.iter().map(|w| w.id).collect())
            .await?;

        let data = rows
            .into_iter()
            .map(|wallet| {
                let balance = balances
                    .get(&wallet.id)
                    .copied()
                    .unwrap_or_else(zero_balance);
                WalletWithBalance { wallet, balance }
            })
            .collect();

        Ok((data, total))
    }

    /// Aggregates balances for a page of wallets in one grouped query.
    async fn balances_for(
        &self,
        wallet_ids: Vec<i64>,
    ) -> Result<HashMap<i64, Decimal>, WalletError> {
        if wallet_ids.is_empty() {
            return Ok(HashMap::new());
        }

        #[derive(FromQueryResult)]
        struct BalanceRow {
            wallet_id: i64,
            total: Option<Decimal>,
        }

        let rows = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::WalletId)
            .column_as(transactions::Column::Amount.sum(), "total")
            .filter(transactions::Column::WalletId.is_in(wallet_ids))
            .group_by(transactions::Column::WalletId)
            .into_model::<BalanceRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.wallet_id, balance_from_aggregate(r.total)))
            .collect())
    }
}
