//! Wallet management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use ledgerd_db::repositories::wallet::{
    WalletError, WalletFilter, WalletRepository, WalletSort, WalletWithBalance,
};
use ledgerd_shared::types::{PageRequest, PageResponse, SortKey};

/// Creates the wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallets", get(list_wallets))
        .route("/wallets", post(create_wallet))
        .route("/wallets/{wallet_id}", get(get_wallet))
        .route("/wallets/{wallet_id}", put(update_wallet))
        .route("/wallets/{wallet_id}", delete(delete_wallet))
}

/// Query parameters for listing wallets.
#[derive(Debug, Deserialize)]
pub struct ListWalletsQuery {
    /// Exact-match filter on wallet id.
    pub id: Option<i64>,
    /// Exact-match filter on label.
    pub label: Option<String>,
    /// Sort key: `label` ascending, `-label` descending.
    pub sort: Option<String>,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Items per page (default: 20).
    pub per_page: Option<u32>,
}

/// Request body for creating a wallet.
#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    /// Wallet label (free text, no constraints).
    pub label: String,
}

/// Request body for updating a wallet.
#[derive(Debug, Deserialize)]
pub struct UpdateWalletRequest {
    /// Replacement label.
    pub label: String,
}

/// Response for a wallet.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    /// Wallet ID.
    pub id: i64,
    /// Wallet label.
    pub label: String,
    /// Live-aggregated balance, rendered as a decimal string.
    pub balance: String,
}

impl From<WalletWithBalance> for WalletResponse {
    fn from(w: WalletWithBalance) -> Self {
        Self {
            id: w.wallet.id,
            label: w.wallet.label,
            balance: w.balance.to_string(),
        }
    }
}

/// GET `/wallets` - List wallets with filters, sorting, and pagination.
async fn list_wallets(
    State(state): State<AppState>,
    Query(query): Query<ListWalletsQuery>,
) -> impl IntoResponse {
    let sort = match parse_wallet_sort(query.sort.as_deref()) {
        Ok(sort) => sort,
        Err(response) => return response,
    };

    let page = PageRequest::from_params(query.page, query.per_page);
    let filter = WalletFilter {
        id: query.id,
        label: query.label,
    };

    let repo = WalletRepository::new((*state.db).clone());

    match repo.list_wallets(filter, sort, page).await {
        Ok((wallets, total)) => {
            let data: Vec<WalletResponse> = wallets.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(PageResponse::new(data, page, total))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list wallets");
            internal_error()
        }
    }
}

/// POST `/wallets` - Create a wallet.
async fn create_wallet(
    State(state): State<AppState>,
    Json(payload): Json<CreateWalletRequest>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    let wallet = match repo.create_wallet(payload.label).await {
        Ok(wallet) => wallet,
        Err(e) => {
            error!(error = %e, "Failed to create wallet");
            return internal_error();
        }
    };

    info!(wallet_id = %wallet.id, "Wallet created");

    match repo.balance(wallet.id).await {
        Ok(balance) => (
            StatusCode::CREATED,
            Json(WalletResponse {
                id: wallet.id,
                label: wallet.label,
                balance: balance.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read wallet balance");
            internal_error()
        }
    }
}

/// GET `/wallets/{wallet_id}` - Get wallet detail with its live balance.
async fn get_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<i64>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    match repo.find_wallet(wallet_id).await {
        Ok(Some(wallet)) => {
            (StatusCode::OK, Json(WalletResponse::from(wallet))).into_response()
        }
        Ok(None) => wallet_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to get wallet");
            internal_error()
        }
    }
}

/// PUT `/wallets/{wallet_id}` - Replace a wallet's label.
async fn update_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<i64>,
    Json(payload): Json<UpdateWalletRequest>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    let wallet = match repo.update_wallet(wallet_id, payload.label).await {
        Ok(wallet) => wallet,
        Err(WalletError::NotFound(_)) => return wallet_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to update wallet");
            return internal_error();
        }
    };

    info!(wallet_id = %wallet_id, "Wallet updated");

    match repo.balance(wallet.id).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(WalletResponse {
                id: wallet.id,
                label: wallet.label,
                balance: balance.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read wallet balance");
            internal_error()
        }
    }
}

/// DELETE `/wallets/{wallet_id}` - Delete a wallet and all its transactions.
async fn delete_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<i64>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    match repo.delete_wallet(wallet_id).await {
        Ok(()) => {
            info!(wallet_id = %wallet_id, "Wallet deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(WalletError::NotFound(_)) => wallet_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to delete wallet");
            internal_error()
        }
    }
}

// Helper functions

fn parse_wallet_sort(raw: Option<&str>) -> Result<WalletSort, Response> {
    let Some(raw) = raw else {
        return Ok(WalletSort::default());
    };

    match SortKey::parse(raw) {
        Some(key) if key.field == "label" => Ok(WalletSort {
            label: Some(key.direction),
        }),
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_sort",
                "message": format!("Cannot sort wallets by '{raw}'. Supported: label, -label")
            })),
        )
            .into_response()),
    }
}

fn wallet_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Wallet not found"
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
