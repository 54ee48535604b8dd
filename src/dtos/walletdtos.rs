use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::walletmodels::{Transaction, TransactionStatus, TransactionType};
use crate::service::wallet_service::WalletSummary;
use crate::utils::currency::paise_to_rupees;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AmountDto {
    /// Rupees
    #[validate(range(min = 1.0, max = 1000000.0, message = "Amount must be between ₹1 and ₹10,00,000"))]
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionQueryDto {
    pub tab: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub status: TransactionStatus,
    pub job_id: Option<Uuid>,
    pub job_title: Option<String>,
    pub reference: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl TransactionDto {
    pub fn from_transaction(transaction: &Transaction) -> Self {
        TransactionDto {
            id: transaction.id,
            transaction_type: transaction.transaction_type,
            amount: paise_to_rupees(transaction.amount),
            status: transaction.status,
            job_id: transaction.job_id,
            job_title: transaction.job_title.clone(),
            reference: transaction.reference.clone(),
            created_at: transaction.created_at,
        }
    }

    pub fn from_transactions(transactions: &[Transaction]) -> Vec<TransactionDto> {
        transactions.iter().map(TransactionDto::from_transaction).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletSummaryDto {
    pub balance: f64,
    pub pending_withdrawals: f64,
    pub pending_withdrawal_count: usize,
    pub pending_payments: f64,
    pub pending_payment_count: usize,
}

impl From<WalletSummary> for WalletSummaryDto {
    fn from(summary: WalletSummary) -> Self {
        WalletSummaryDto {
            balance: paise_to_rupees(summary.balance),
            pending_withdrawals: paise_to_rupees(summary.pending_withdrawals),
            pending_withdrawal_count: summary.pending_withdrawal_count,
            pending_payments: paise_to_rupees(summary.pending_payments),
            pending_payment_count: summary.pending_payment_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResultDto {
    pub job: super::jobdtos::JobDto,
    pub transactions: Vec<TransactionDto>,
}
