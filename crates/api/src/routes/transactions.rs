//! Transaction management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use ledgerd_db::entities::transactions;
use ledgerd_db::repositories::transaction::{
    CreateTransactionInput, TransactionError, TransactionFilter, TransactionRepository,
    UpdateTransactionInput,
};
use ledgerd_shared::types::{PageRequest, PageResponse};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/{transaction_id}", get(get_transaction))
        .route("/transactions/{transaction_id}", put(update_transaction))
        .route("/transactions/{transaction_id}", delete(delete_transaction))
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Exact-match filter on transaction id.
    pub id: Option<i64>,
    /// Exact-match filter on the referenced wallet id.
    pub wallet: Option<i64>,
    /// Exact-match filter on txid.
    pub txid: Option<String>,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Items per page (default: 20).
    pub per_page: Option<u32>,
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Owning wallet id.
    pub wallet: i64,
    /// Globally unique transaction identifier.
    pub txid: String,
    /// Signed decimal amount as a string; defaults to zero when omitted.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
}

/// Request body for updating a transaction. Any subset of fields may be
/// present.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    /// Re-point the transaction at a different wallet.
    pub wallet: Option<i64>,
    /// Replace the txid.
    pub txid: Option<String>,
    /// Replace the amount.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: i64,
    /// Referenced wallet id.
    pub wallet: i64,
    /// Globally unique transaction identifier.
    pub txid: String,
    /// Amount rendered as a fixed-point decimal string.
    pub amount: String,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(t: transactions::Model) -> Self {
        Self {
            id: t.id,
            wallet: t.wallet_id,
            txid: t.txid,
            amount: t.amount.to_string(),
        }
    }
}

/// GET `/transactions` - List transactions with filters and pagination.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let page = PageRequest::from_params(query.page, query.per_page);
    let filter = TransactionFilter {
        id: query.id,
        wallet_id: query.wallet,
        txid: query.txid,
    };

    let repo = TransactionRepository::new((*state.db).clone());

    match repo.list_transactions(filter, page).await {
        Ok((rows, total)) => {
            let data: Vec<TransactionResponse> = rows.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(PageResponse::new(data, page, total))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list transactions");
            internal_error()
        }
    }
}

/// POST `/transactions` - Create a transaction.
async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    let input = CreateTransactionInput {
        wallet_id: payload.wallet,
        txid: payload.txid,
        amount: payload.amount,
    };

    match repo.create_transaction(input).await {
        Ok(transaction) => {
            info!(
                transaction_id = %transaction.id,
                wallet_id = %transaction.wallet_id,
                "Transaction created"
            );

            (
                StatusCode::CREATED,
                Json(TransactionResponse::from(transaction)),
            )
                .into_response()
        }
        Err(e) => transaction_error_response(e, "Failed to create transaction"),
    }
}

/// GET `/transactions/{transaction_id}` - Get transaction detail.
async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.find_transaction(transaction_id).await {
        Ok(Some(transaction)) => (
            StatusCode::OK,
            Json(TransactionResponse::from(transaction)),
        )
            .into_response(),
        Ok(None) => transaction_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to get transaction");
            internal_error()
        }
    }
}

/// PUT `/transactions/{transaction_id}` - Update any subset of a
/// transaction's fields.
async fn update_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    let input = UpdateTransactionInput {
        wallet_id: payload.wallet,
        txid: payload.txid,
        amount: payload.amount,
    };

    match repo.update_transaction(transaction_id, input).await {
        Ok(transaction) => {
            info!(transaction_id = %transaction_id, "Transaction updated");

            (StatusCode::OK, Json(TransactionResponse::from(transaction))).into_response()
        }
        Err(e) => transaction_error_response(e, "Failed to update transaction"),
    }
}

/// DELETE `/transactions/{transaction_id}` - Delete a transaction.
async fn delete_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.delete_transaction(transaction_id).await {
        Ok(()) => {
            info!(transaction_id = %transaction_id, "Transaction deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => transaction_error_response(e, "Failed to delete transaction"),
    }
}

// Helper functions

fn transaction_error_response(err: TransactionError, context: &'static str) -> Response {
    match err {
        TransactionError::NotFound(_) => transaction_not_found(),
        TransactionError::WalletNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Wallet not found"
            })),
        )
            .into_response(),
        TransactionError::DuplicateTxid(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "duplicate_txid",
                "message": "transaction with this txid already exists."
            })),
        )
            .into_response(),
        TransactionError::InvalidAmount(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": e.to_string()
            })),
        )
            .into_response(),
        TransactionError::Database(e) => {
            error!(error = %e, "{context}");
            internal_error()
        }
    }
}

fn transaction_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Transaction not found"
        })),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
