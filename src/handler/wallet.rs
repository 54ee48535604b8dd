use std::sync::Arc;

use axum::{
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::{
        walletdtos::{AmountDto, TransactionDto, TransactionQueryDto, WalletSummaryDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    utils::currency::rupees_to_paise,
    AppState,
};

pub fn wallet_handler() -> Router {
    Router::new()
        .route("/", get(get_wallet))
        .route("/transactions", get(get_transaction_history))
        .route("/deposit", post(deposit_funds))
        .route("/withdraw", post(withdraw_funds))
}

pub async fn get_wallet(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let summary = app_state.wallet_service.summary(auth.user.id).await?;

    Ok(Json(ApiResponse::success(
        "Wallet retrieved successfully",
        WalletSummaryDto::from(summary),
    )))
}

pub async fn get_transaction_history(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(params): Query<TransactionQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let transactions = app_state
        .wallet_service
        .list_transactions(auth.user.id, params.tab.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(
        "Transactions retrieved successfully",
        TransactionDto::from_transactions(&transactions),
    )))
}

pub async fn deposit_funds(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<AmountDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let transaction = app_state
        .wallet_service
        .deposit(auth.user.id, rupees_to_paise(body.amount))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Deposit successful",
            TransactionDto::from_transaction(&transaction),
        )),
    ))
}

pub async fn withdraw_funds(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<AmountDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let transaction = app_state
        .wallet_service
        .withdraw(auth.user.id, rupees_to_paise(body.amount))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Withdrawal requested, it will be processed shortly",
            TransactionDto::from_transaction(&transaction),
        )),
    ))
}
